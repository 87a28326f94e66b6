//! End-to-end orchestration flows: real state manager, real dispatch workers,
//! mock scoring service.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use leadlens_tui::app_state::{state_manager, AppState, DispatchOutcome, StateCommand};
use leadlens_tui::dispatch::{self, Dispatcher};
use leadlens_tui::user_config::Config;
use leadlens_tui::{AppEvent, EventBus, EventBusCaps, EventPriority};
use tokio::sync::{broadcast, mpsc};

const SAMPLE_BODY: &str = r#"{
    "top_lead": {"score": 0.87, "lead_text": "Acme Plumbing"},
    "lead_score": "8/10 — high intent",
    "prospect_email": "Hi Acme,..."
}"#;

struct Harness {
    state: Arc<AppState>,
    cmd_tx: mpsc::Sender<StateCommand>,
    event_rx: broadcast::Receiver<AppEvent>,
}

fn spawn_harness(endpoint: String) -> Harness {
    let state = Arc::new(AppState::default());
    let event_bus = Arc::new(EventBus::new(EventBusCaps::default()));
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let dispatcher = Dispatcher::new(&Config {
        endpoint,
        request_timeout_secs: 5,
    })
    .expect("client build");
    let event_rx = event_bus.subscribe(EventPriority::Realtime);

    tokio::spawn(state_manager(
        state.clone(),
        cmd_rx,
        cmd_tx.clone(),
        event_bus,
        dispatcher,
    ));

    Harness {
        state,
        cmd_tx,
        event_rx,
    }
}

impl Harness {
    async fn submit(&self, query: &str) {
        self.cmd_tx
            .send(StateCommand::UpdateQuery {
                text: query.to_string(),
            })
            .await
            .unwrap();
        self.cmd_tx.send(StateCommand::SubmitQuery).await.unwrap();
    }

    /// Wait until a settlement event has been seen for every listed key.
    async fn wait_settled(&mut self, keys: &[&str]) {
        let mut remaining: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !remaining.is_empty() {
                match self.event_rx.recv().await {
                    Ok(AppEvent::Dispatch(dispatch::Event::Settled { key })) => {
                        remaining.retain(|k| *k != key);
                    }
                    Ok(_) => {}
                    Err(e) => panic!("event bus closed: {e}"),
                }
            }
        })
        .await
        .expect("timed out waiting for settlement");
    }
}

#[tokio::test]
async fn scenario_a_success_populates_all_three_fields() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body(serde_json::json!({"query": "plumbing leads in Denver"}));
            then.status(200).body(SAMPLE_BODY);
        })
        .await;

    let mut h = spawn_harness(server.url("/query"));
    h.submit("plumbing leads in Denver").await;
    h.wait_settled(&["plumbing leads in Denver"]).await;

    mock.assert_async().await;
    let session = h.state.session.read().await;
    assert!(session.is_idle());
    assert!(!session.armed());
    let bundle = session.data().expect("success data");
    assert_eq!(bundle.top_lead.score, 0.87);
    assert_eq!(bundle.top_lead.lead_text, "Acme Plumbing");
    assert_eq!(bundle.lead_score, "8/10 — high intent");
    assert_eq!(bundle.prospect_email, "Hi Acme,...");
}

#[tokio::test]
async fn scenario_b_whitespace_query_sends_nothing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).body(SAMPLE_BODY);
        })
        .await;

    let h = spawn_harness(server.url("/query"));
    h.submit("   ").await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(mock.hits_async().await, 0);
    let session = h.state.session.read().await;
    assert!(session.is_idle());
    assert!(!session.armed());
    assert_eq!(session.latest_key(), None);
}

#[tokio::test]
async fn scenario_c_http_500_fails_once_without_retry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(500).body("boom");
        })
        .await;

    let mut h = spawn_harness(server.url("/query"));
    h.submit("plumbing leads in Denver").await;
    h.wait_settled(&["plumbing leads in Denver"]).await;
    // Give any (incorrect) retry a chance to fire before counting.
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(mock.hits_async().await, 1);
    let session = h.state.session.read().await;
    assert_eq!(session.error(), Some("API response was not ok"));
    assert!(session.is_idle());
}

#[tokio::test]
async fn resubmitting_the_same_query_issues_a_fresh_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(200).body(SAMPLE_BODY);
        })
        .await;

    let mut h = spawn_harness(server.url("/query"));
    h.submit("plumbing leads in Denver").await;
    h.wait_settled(&["plumbing leads in Denver"]).await;
    h.submit("plumbing leads in Denver").await;
    h.wait_settled(&["plumbing leads in Denver"]).await;

    assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn request_body_uses_the_snapshot_taken_at_arming_time() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body(serde_json::json!({"query": "x"}));
            then.status(200).body(SAMPLE_BODY);
        })
        .await;

    let mut h = spawn_harness(server.url("/query"));
    h.submit("x").await;
    // Keystrokes after submission must not leak into the in-flight request.
    h.cmd_tx
        .send(StateCommand::UpdateQuery {
            text: "x plus later edits".to_string(),
        })
        .await
        .unwrap();
    h.wait_settled(&["x"]).await;

    mock.assert_async().await;
}

#[tokio::test]
async fn scenario_d_latest_submission_wins_regardless_of_response_order() {
    let server = MockServer::start_async().await;
    let slow = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body(serde_json::json!({"query": "x"}));
            then.status(200)
                .delay(Duration::from_millis(500))
                .body(
                    r#"{"top_lead": {"score": 0.10, "lead_text": "stale"},
                        "lead_score": "1/10", "prospect_email": "old"}"#,
                );
        })
        .await;
    let fast = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body(serde_json::json!({"query": "y"}));
            then.status(200).body(
                r#"{"top_lead": {"score": 0.90, "lead_text": "fresh"},
                    "lead_score": "9/10", "prospect_email": "new"}"#,
            );
        })
        .await;

    let mut h = spawn_harness(server.url("/query"));
    h.submit("x").await;
    h.submit("y").await;
    h.wait_settled(&["x", "y"]).await;

    // Both dispatches ran to completion; neither was cancelled.
    assert_eq!(slow.hits_async().await, 1);
    assert_eq!(fast.hits_async().await, 1);

    let session = h.state.session.read().await;
    assert_eq!(session.latest_key(), Some("y"));
    assert_eq!(session.data().unwrap().top_lead.lead_text, "fresh");
    // The slow response landed in its own entry without clobbering the view.
    assert!(matches!(
        session.outcome("x"),
        Some(DispatchOutcome::Success(b)) if b.top_lead.lead_text == "stale"
    ));
    assert!(session.is_idle());
}
