//! Remote search suggestions.
//!
//! [`SuggestClient`] talks to a Google-suggest-style endpoint and normalizes
//! its payload. [`SuggestSession`] sits between the composer and the client:
//! it debounces keystrokes and guarantees that only the latest query's
//! results are ever reported, no matter in which order responses arrive.

use thiserror::Error;

mod session;

pub use session::SUGGEST_DEBOUNCE;
pub use session::SuggestReporter;
pub use session::SuggestSession;

/// Endpoint used when nothing else is configured.
pub const DEFAULT_SUGGEST_URL: &str = "https://suggestqueries.google.com/complete/search";

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("suggestion request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The endpoint answered, but not with the `[query, [candidates]]`
    /// payload shape.
    #[error("unexpected suggestion payload")]
    MalformedPayload,
}

/// Thin client over the suggestion endpoint.
#[derive(Debug, Clone)]
pub struct SuggestClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for SuggestClient {
    fn default() -> Self {
        Self::new(DEFAULT_SUGGEST_URL)
    }
}

impl SuggestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch ranked candidates for a query. The payload is a JSON array whose
    /// second element is an array of strings; duplicates are dropped
    /// preserving first-seen order.
    pub async fn fetch(&self, query: &str) -> Result<Vec<String>, SuggestError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("client", "firefox"), ("q", query)])
            .send()
            .await?
            .error_for_status()?;
        let payload: serde_json::Value = response.json().await?;
        parse_candidates(&payload).ok_or(SuggestError::MalformedPayload)
    }
}

fn parse_candidates(payload: &serde_json::Value) -> Option<Vec<String>> {
    let candidates = payload.as_array()?.get(1)?.as_array()?;
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for candidate in candidates {
        let text = candidate.as_str()?;
        if seen.insert(text.to_string()) {
            out.push(text.to_string());
        }
    }
    Some(out)
}
