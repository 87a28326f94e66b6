use tokio::sync::RwLock;

use super::session::LeadSession;

/// Shared application state. The state manager task is the single writer;
/// the presenter only reads.
#[derive(Debug, Default)]
pub struct AppState {
    pub query: QueryState,
    pub session: SessionState,
}

/// The query store: the current raw query string, overwritten on every
/// keystroke. The orchestrator reads it exactly once per submission, as a
/// snapshot.
#[derive(Debug, Default)]
pub struct QueryState(pub RwLock<String>);

impl std::ops::Deref for QueryState {
    type Target = RwLock<String>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct SessionState(pub RwLock<LeadSession>);

impl std::ops::Deref for SessionState {
    type Target = RwLock<LeadSession>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
