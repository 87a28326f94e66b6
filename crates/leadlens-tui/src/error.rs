use tracing::{error, warn};

/// Severity levels for error events
#[derive(Debug, Clone, Copy)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Fatal,
}

/// Extension trait for ergonomic error logging at call sites that keep the
/// `Result` moving.
pub trait ResultExt<T> {
    fn emit_event(self, severity: ErrorSeverity) -> Self;

    fn emit_warning(self) -> Self;

    fn emit_error(self) -> Self;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn emit_event(self, severity: ErrorSeverity) -> Self {
        if let Err(err) = self.as_ref() {
            match severity {
                ErrorSeverity::Warning => warn!(target: "leadlens_tui::error", "{err}"),
                ErrorSeverity::Error | ErrorSeverity::Fatal => {
                    error!(target: "leadlens_tui::error", "{err}")
                }
            }
        }
        self
    }

    fn emit_warning(self) -> Self {
        self.emit_event(ErrorSeverity::Warning)
    }

    fn emit_error(self) -> Self {
        self.emit_event(ErrorSeverity::Error)
    }
}
