//! Financial-metrics collaborator seam.
//!
//! The warehouse itself is outside this pipeline; it appears here only
//! as the [`FinancialStore`] trait plus a thin REST adapter. Any
//! returned row-set, empty included, is a successful outcome; deciding
//! whether "no rows" is interesting belongs to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ReportError;

/// One metric row, as a generic field mapping.
pub type Row = serde_json::Map<String, Value>;

/// What the financial collaborator returns for one year/quarter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QuarterlySnapshot {
    /// Metric rows for the period; may be empty.
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Chart image rendered by the collaborator, passed through
    /// untouched. Base64 on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub chart_png: Option<Vec<u8>>,
}

/// A queryable store of quarterly financial metrics.
#[async_trait]
pub trait FinancialStore: Send + Sync {
    /// Fetch metrics for one fiscal period. Single attempt, fail-fast;
    /// an empty row-set is success, not an error.
    async fn quarterly(&self, year: i32, quarter: u8) -> Result<QuarterlySnapshot, ReportError>;
}

/// A [`FinancialStore`] posting period queries to a REST endpoint that
/// fronts the warehouse.
pub struct RestFinancialStore {
    http: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl RestFinancialStore {
    /// Create a store client for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ReportError> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(ReportError::ConfigError(
                "financial store endpoint must not be empty".into(),
            ));
        }
        Ok(Self { http: reqwest::Client::new(), endpoint, api_token: None })
    }

    /// Create a client from `FINANCIAL_STORE_URL`, with
    /// `FINANCIAL_STORE_TOKEN` as an optional credential.
    pub fn from_env() -> Result<Self, ReportError> {
        let endpoint = std::env::var("FINANCIAL_STORE_URL").map_err(|_| {
            ReportError::ConfigError("FINANCIAL_STORE_URL environment variable not set".into())
        })?;
        let mut store = Self::new(endpoint)?;
        store.api_token = std::env::var("FINANCIAL_STORE_TOKEN").ok();
        Ok(store)
    }

    /// Set a bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

#[async_trait]
impl FinancialStore for RestFinancialStore {
    async fn quarterly(&self, year: i32, quarter: u8) -> Result<QuarterlySnapshot, ReportError> {
        let mut request = self.http.post(&self.endpoint).json(&json!({
            "year": year,
            "quarter": quarter,
        }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReportError::FinancialError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ReportError::FinancialError(format!("store returned {status}: {detail}")));
        }

        let snapshot: QuarterlySnapshot = response
            .json()
            .await
            .map_err(|e| ReportError::FinancialError(format!("failed to parse response: {e}")))?;

        debug!(year, quarter, rows = snapshot.rows.len(), "fetched quarterly metrics");
        Ok(snapshot)
    }
}

/// Base64 (de)serialization for optional raw bytes.
pub(crate) mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded.map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom)).transpose()
    }
}
