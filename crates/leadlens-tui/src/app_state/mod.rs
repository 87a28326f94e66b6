// Internal modules for the query/session state
mod core;
pub mod commands;
mod dispatcher;
mod session;

// Public re-exports to keep the external API stable
pub use commands::StateCommand;
pub use core::{AppState, QueryState, SessionState};
pub use dispatcher::state_manager;
pub use session::{DispatchOutcome, DispatchPhase, LeadSession};
