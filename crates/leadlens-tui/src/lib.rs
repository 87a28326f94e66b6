pub mod app;
pub mod app_state;
pub mod dispatch;
pub mod error;
pub mod event_bus;
pub mod tracing_setup;
pub mod user_config;
pub use event_bus::*;

use std::sync::Arc;

use app::App;
use app_state::{state_manager, AppState, StateCommand};
use color_eyre::Result;
use dispatch::Dispatcher;
use tokio::sync::mpsc;

#[derive(Clone, Debug)]
pub enum AppEvent {
    Dispatch(dispatch::Event),
    Error(ErrorEvent),
}

impl AppEvent {
    pub fn priority(&self) -> EventPriority {
        match self {
            // Lifecycle progress drives the draw loop directly.
            AppEvent::Dispatch(_) => EventPriority::Realtime,
            AppEvent::Error(_) => EventPriority::Background,
        }
    }
}

pub async fn try_main() -> Result<()> {
    let config = config::Config::builder()
        .add_source(
            config::File::with_name(
                &user_config::Config::default_config_path().to_string_lossy(),
            )
            .required(false),
        )
        .add_source(config::Environment::with_prefix("LEADLENS"))
        .build()?
        .try_deserialize::<user_config::Config>()
        .unwrap_or_default();
    tracing::debug!(?config, "resolved configuration");

    let event_bus = Arc::new(EventBus::new(EventBusCaps::default()));
    let state = Arc::new(AppState::default());

    // Command channel with backpressure
    let (cmd_tx, cmd_rx) = mpsc::channel::<StateCommand>(256);

    let dispatcher = Dispatcher::new(&config)?;

    // Spawn the single-writer state manager; workers it launches report back
    // through the same command channel.
    tokio::spawn(state_manager(
        state.clone(),
        cmd_rx,
        cmd_tx.clone(),
        event_bus.clone(),
        dispatcher,
    ));
    tokio::spawn(run_error_log(Arc::clone(&event_bus)));

    let terminal = ratatui::init();
    let app = App::new(state, cmd_tx, &event_bus);
    let result = app.run(terminal).await;
    ratatui::restore();
    result
}
