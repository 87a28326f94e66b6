use std::sync::Arc;

use tokio::sync::mpsc;

use super::commands::StateCommand;
use super::core::AppState;
use super::session::DispatchOutcome;
use crate::dispatch::{self, Dispatcher};
use crate::error::ErrorSeverity;
use crate::event_bus::EventBus;
use crate::AppEvent;

/// Single-writer loop over the application state.
///
/// Owns every transition of the session state machine: arming on submission,
/// handing armed keys to the dispatcher, and disarming on settlement. The
/// dispatch workers it spawns report back through `cmd_tx`; they never touch
/// the state themselves.
pub async fn state_manager(
    state: Arc<AppState>,
    mut cmd_rx: mpsc::Receiver<StateCommand>,
    cmd_tx: mpsc::Sender<StateCommand>,
    event_bus: Arc<EventBus>,
    dispatcher: Dispatcher,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        tracing::trace!(cmd = %cmd.discriminant(), "processing");

        match cmd {
            StateCommand::UpdateQuery { text } => {
                *state.query.write().await = text;
            }
            StateCommand::SubmitQuery => {
                // Snapshot at submission time; later keystrokes must not
                // leak into this lifecycle.
                let snapshot = state.query.read().await.clone();
                let mut session = state.session.write().await;
                if session.submit(&snapshot).is_none() {
                    tracing::debug!("ignoring blank submission");
                    continue;
                }
                // Armed together with a non-empty key: dispatch. This is the
                // only place a network call is issued.
                if let Some(key) = session.begin_dispatch() {
                    tracing::info!(%key, "dispatching lead query");
                    dispatcher.spawn(key.clone(), cmd_tx.clone());
                    drop(session);
                    event_bus.send(AppEvent::Dispatch(dispatch::Event::Started { key }));
                }
            }
            StateCommand::DispatchSettled { key, outcome } => {
                if let DispatchOutcome::Failure(msg) = &outcome {
                    event_bus.send_error(msg.clone(), ErrorSeverity::Warning);
                }
                state.session.write().await.settle(&key, outcome);
                event_bus.send(AppEvent::Dispatch(dispatch::Event::Settled { key }));
            }
        }
    }
}
