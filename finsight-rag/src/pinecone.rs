//! Pinecone vector index backend.
//!
//! Provides [`PineconeIndex`], a [`VectorIndex`] over the Pinecone data
//! plane REST API (`/vectors/upsert`, `/query`, `/describe_index_stats`)
//! for a single named index.
//!
//! # Example
//!
//! ```rust,ignore
//! use finsight_rag::PineconeIndex;
//!
//! let index = PineconeIndex::new("my-index-abc123.svc.us-east-1.pinecone.io", "pc-…")?;
//! index.upsert(&records).await?;
//! let matches = index.query(&query_vector, 100, None).await?;
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::record::{EmbeddingRecord, IndexStats, Metadata, MetadataFilter, ScoredMatch};

/// A [`VectorIndex`] backed by one Pinecone index.
///
/// The client is scoped to the index named by its data-plane host; the
/// index itself is provisioned out of band.
pub struct PineconeIndex {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PineconeIndex {
    /// Create a client for the index at `host` (with or without the
    /// `https://` prefix).
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("Pinecone API key must not be empty".into()));
        }
        let host = host.into();
        if host.is_empty() {
            return Err(RagError::ConfigError("Pinecone index host must not be empty".into()));
        }
        let base_url = if host.starts_with("http") { host } else { format!("https://{host}") };

        Ok(Self { http: reqwest::Client::new(), base_url, api_key })
    }

    /// Create a client from `PINECONE_INDEX_HOST` and `PINECONE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("PINECONE_INDEX_HOST").map_err(|_| {
            RagError::ConfigError("PINECONE_INDEX_HOST environment variable not set".into())
        })?;
        let api_key = std::env::var("PINECONE_API_KEY").map_err(|_| {
            RagError::ConfigError("PINECONE_API_KEY environment variable not set".into())
        })?;
        Self::new(host, api_key)
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::map_err(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Self::map_err(format!("API returned {status}: {detail}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Self::map_err(format!("failed to parse response: {e}")))
    }

    fn map_err(message: String) -> RagError {
        RagError::IndexError { backend: "pinecone".to_string(), message }
    }
}

// ── Pinecone wire types ────────────────────────────────────────────

#[derive(Serialize)]
struct WireVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a Metadata,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: usize,
}

/// Translate an equality filter into Pinecone's `$eq` filter object.
fn wire_filter(filter: &MetadataFilter) -> Value {
    let clauses: BTreeMap<&str, Value> =
        filter.0.iter().map(|(field, value)| (field.as_str(), json!({"$eq": value}))).collect();
    json!(clauses)
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let vectors: Vec<WireVector<'_>> = records
            .iter()
            .map(|r| WireVector { id: &r.id, values: &r.values, metadata: &r.metadata })
            .collect();

        let _: Value = self.post("/vectors/upsert", &json!({"vectors": vectors})).await?;
        debug!(count = records.len(), "upserted records to pinecone");
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>> {
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            body["filter"] = wire_filter(filter);
        }

        let response: QueryResponse = self.post("/query", &body).await?;
        debug!(matches = response.matches.len(), top_k, "pinecone query completed");

        Ok(response
            .matches
            .into_iter()
            .map(|m| ScoredMatch { id: m.id, score: m.score, text: None, metadata: m.metadata })
            .collect())
    }

    async fn describe(&self) -> Result<IndexStats> {
        let response: StatsResponse = self.post("/describe_index_stats", &json!({})).await?;
        Ok(IndexStats { total_vector_count: response.total_vector_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_translates_to_eq_clauses() {
        let filter = MetadataFilter::new().with("year", 2024).with("quarter", 1);
        assert_eq!(
            wire_filter(&filter),
            json!({"quarter": {"$eq": 1}, "year": {"$eq": 2024}})
        );
    }

    #[test]
    fn constructor_rejects_empty_credentials() {
        assert!(PineconeIndex::new("", "key").is_err());
        assert!(PineconeIndex::new("host.pinecone.io", "").is_err());
        assert!(PineconeIndex::new("host.pinecone.io", "key").is_ok());
    }
}
