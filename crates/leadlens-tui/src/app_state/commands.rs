use super::session::DispatchOutcome;

/// Commands consumed by the state manager. Everything that mutates
/// [`super::AppState`] flows through this channel, which is what makes the
/// session single-writer.
#[derive(Debug)]
pub enum StateCommand {
    /// Overwrite the query store with the presenter's current input.
    UpdateQuery { text: String },
    /// Submission action: snapshot the query store and arm the session.
    SubmitQuery,
    /// A dispatch worker reporting its final outcome for `key`.
    DispatchSettled {
        key: String,
        outcome: DispatchOutcome,
    },
}

impl StateCommand {
    pub fn discriminant(&self) -> &'static str {
        use StateCommand::*;
        match self {
            UpdateQuery { .. } => "UpdateQuery",
            SubmitQuery => "SubmitQuery",
            DispatchSettled { .. } => "DispatchSettled",
        }
    }
}
