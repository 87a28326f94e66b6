use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::instrument;

use crate::error::ErrorSeverity;
use crate::AppEvent;

#[derive(Clone, Copy, Debug)]
pub enum EventPriority {
    Realtime,
    Background,
}

#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub message: String,
    pub severity: ErrorSeverity,
}

/// Broadcast bus with two lanes: realtime events feed the draw loop and must
/// stay lean, background events are diagnostics.
#[derive(Debug)]
pub struct EventBus {
    pub realtime_tx: broadcast::Sender<AppEvent>,
    pub background_tx: broadcast::Sender<AppEvent>,
}

/// Convenience struct to help with the initialization of EventBus
#[derive(Clone, Copy)]
pub struct EventBusCaps {
    realtime_cap: usize,
    background_cap: usize,
}

impl Default for EventBusCaps {
    fn default() -> Self {
        Self {
            realtime_cap: 100,
            background_cap: 1000,
        }
    }
}

impl EventBus {
    pub fn new(b: EventBusCaps) -> Self {
        Self {
            realtime_tx: broadcast::channel(b.realtime_cap).0,
            background_tx: broadcast::channel(b.background_cap).0,
        }
    }

    #[instrument]
    pub fn send(&self, event: AppEvent) {
        let tx = match event.priority() {
            EventPriority::Realtime => &self.realtime_tx,
            EventPriority::Background => &self.background_tx,
        };
        let _ = tx.send(event); // Ignore receiver count
    }

    pub fn send_error(&self, message: String, severity: ErrorSeverity) {
        self.send(AppEvent::Error(ErrorEvent { message, severity }));
    }

    pub fn subscribe(&self, priority: EventPriority) -> broadcast::Receiver<AppEvent> {
        match priority {
            EventPriority::Realtime => self.realtime_tx.subscribe(),
            EventPriority::Background => self.background_tx.subscribe(),
        }
    }
}

/// Drain the background lane into the log file so error events are never
/// silently dropped when no other subscriber exists.
pub async fn run_error_log(event_bus: Arc<EventBus>) {
    use broadcast::error::RecvError;
    let mut bg_rx = event_bus.subscribe(EventPriority::Background);
    loop {
        match bg_rx.recv().await {
            Ok(AppEvent::Error(event)) => match event.severity {
                ErrorSeverity::Warning => tracing::warn!(message = %event.message, "app warning"),
                ErrorSeverity::Error | ErrorSeverity::Fatal => {
                    tracing::error!(message = %event.message, "app error")
                }
            },
            Ok(_) => {}
            Err(RecvError::Closed) => break,
            Err(RecvError::Lagged(lag)) => {
                tracing::trace!(lag, "background event channel lagging")
            }
        }
    }
}
