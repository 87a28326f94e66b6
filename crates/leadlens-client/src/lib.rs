//! Wire contract and HTTP call for the lead scoring service.
//!
//! One request shape, one response shape, one call. Retry policy is the
//! caller's concern and is deliberately absent here.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

/// Request body for the scoring service. The raw query string is sent as-is;
/// blank-input filtering happens before a request is ever built.
#[derive(Serialize, Debug)]
pub struct LeadRequest<'a> {
    pub query: &'a str,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TopLead {
    pub score: f64,
    pub lead_text: String,
}

/// The three-part payload of a successful dispatch: the top-ranked lead, a
/// score justification, and a generated outreach email. Replaced wholesale by
/// the next successful call; never patched in place.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LeadBundle {
    pub top_lead: TopLead,
    pub lead_score: String,
    pub prospect_email: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    // Display text is part of the UI contract, keep it stable.
    #[error("API response was not ok")]
    Status { status: reqwest::StatusCode },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode lead response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Perform exactly one POST against the scoring endpoint and decode the body.
///
/// Any 2xx status counts as success; every other status collapses into
/// [`FetchError::Status`] regardless of its body. Callers must guarantee a
/// non-empty `query`.
#[instrument(skip(client), fields(query_len = query.len()))]
pub async fn fetch_lead(
    client: &Client,
    endpoint: &str,
    query: &str,
) -> Result<LeadBundle, FetchError> {
    let response = client
        .post(endpoint)
        .json(&LeadRequest { query })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, "lead query rejected by service");
        return Err(FetchError::Status { status });
    }

    let body = response.text().await?;
    let bundle = serde_json::from_str::<LeadBundle>(&body)?;
    tracing::debug!(score = bundle.top_lead.score, "lead query succeeded");
    Ok(bundle)
}
