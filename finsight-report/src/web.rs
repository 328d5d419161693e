//! Web-search collaborator seam.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ReportError;

/// Default number of web results requested per search.
pub const DEFAULT_NUM_RESULTS: usize = 10;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// A live web search provider.
///
/// Results are returned as-is; this pipeline neither ranks nor
/// deduplicates them.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web. Single attempt, fail-fast.
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<Value>, ReportError>;
}

/// A [`WebSearch`] backed by the Tavily search API.
///
/// The credential is checked at call time: a missing key fails the call
/// (and hence only the web step of a report), not construction.
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: String,
}

impl TavilyClient {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), api_key: api_key.into() }
    }

    /// Create a client from `TAVILY_API_KEY`. An absent variable still
    /// constructs; the error surfaces when a search is attempted.
    pub fn from_env() -> Self {
        Self::new(std::env::var("TAVILY_API_KEY").unwrap_or_default())
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<Value>, ReportError> {
        if self.api_key.is_empty() {
            return Err(ReportError::ConfigError("TAVILY_API_KEY is not set".into()));
        }

        let response = self
            .http
            .post(TAVILY_SEARCH_URL)
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": num_results,
            }))
            .send()
            .await
            .map_err(|e| ReportError::WebSearchError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ReportError::WebSearchError(format!(
                "search returned {status}: {detail}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ReportError::WebSearchError(format!("failed to parse response: {e}")))?;

        debug!(results = parsed.results.len(), "web search completed");
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credential_fails_the_call_not_construction() {
        let client = TavilyClient::new("");
        let err = client.search("anything", DEFAULT_NUM_RESULTS).await.unwrap_err();
        assert!(matches!(err, ReportError::ConfigError(_)));
        assert!(err.to_string().contains("TAVILY_API_KEY"));
    }
}
