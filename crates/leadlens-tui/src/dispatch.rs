//! Per-request dispatch workers.
//!
//! The state manager hands an armed query key to [`Dispatcher::spawn`]; the
//! worker performs the single HTTP call and reports the settled outcome back
//! over the command channel. Workers never mutate state directly, and a
//! failure is terminal for its lifecycle: there are no retries.

use std::time::Duration;

use leadlens_client::fetch_lead;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::instrument;

use crate::app_state::{DispatchOutcome, StateCommand};
use crate::error::ResultExt;
use crate::user_config::Config;

/// Events broadcast on the bus as lifecycles progress, so the presenter can
/// redraw without polling.
#[derive(Clone, Debug)]
pub enum Event {
    Started { key: String },
    Settled { key: String },
}

#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: Client,
    endpoint: String,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Launch one worker for an armed key. Always issues a fresh call, even
    /// for a key that already has a settled outcome.
    pub fn spawn(&self, key: String, cmd_tx: mpsc::Sender<StateCommand>) {
        tokio::spawn(process_dispatch(
            self.client.clone(),
            self.endpoint.clone(),
            key,
            cmd_tx,
        ));
    }
}

#[instrument(skip(client, cmd_tx))]
async fn process_dispatch(
    client: Client,
    endpoint: String,
    key: String,
    cmd_tx: mpsc::Sender<StateCommand>,
) {
    // Transport, status, and decode failures all flatten to a message here;
    // the state machine does not distinguish among them.
    let outcome = match fetch_lead(&client, &endpoint, &key).await.emit_warning() {
        Ok(bundle) => DispatchOutcome::Success(bundle),
        Err(e) => DispatchOutcome::Failure(e.to_string()),
    };

    if cmd_tx
        .send(StateCommand::DispatchSettled { key, outcome })
        .await
        .is_err()
    {
        tracing::error!("failed to report dispatch settlement: channel closed");
    }
}
