//! Data types for embedding records, query matches, and index statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form metadata attached to a record. Values are JSON scalars
/// (strings, numbers) plus whatever tags the caller wants carried along.
pub type Metadata = BTreeMap<String, Value>;

/// A single vector with identity and metadata, as stored in the index.
///
/// `id` uniquely determines the record: upserting an existing id replaces
/// the stored record, which is what makes re-ingestion idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    /// Globally unique record identity, `"{source}-{chunk_index}"` for
    /// ingested chunks.
    pub id: String,
    /// The embedding vector.
    pub values: Vec<f32>,
    /// Metadata stored alongside the vector. Ingested chunks always carry
    /// `source`, `chunk_index`, and `text`.
    pub metadata: Metadata,
}

/// A query hit: record identity, similarity score, and stored metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// The matched record's id.
    pub id: String,
    /// Similarity score (higher is more relevant).
    pub score: f32,
    /// Chunk text, for backends that return it at the top level rather
    /// than inside `metadata`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// The matched record's metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl ScoredMatch {
    /// The chunk text for this match: the `text` metadata field, falling
    /// back to the top-level field. Empty strings count as absent.
    pub fn chunk_text(&self) -> Option<&str> {
        match self.metadata.get("text") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => self.text.as_deref().filter(|s| !s.is_empty()),
        }
    }
}

/// Point-in-time size of the index.
///
/// Advisory only: concurrent ingestion can change the count between this
/// read and any query that uses it, so callers bound with it but never
/// assume it is exact.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStats {
    /// How many vectors the index held at read time.
    pub total_vector_count: usize,
}

/// Equality filter over metadata fields, e.g. `year = 2024, quarter = 1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataFilter(pub BTreeMap<String, Value>);

impl MetadataFilter {
    /// An empty filter (matches every record).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition on `field`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Whether the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `metadata` satisfies every condition.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.0.iter().all(|(field, expected)| metadata.get(field) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_text_prefers_metadata_field() {
        let m = ScoredMatch {
            id: "doc-0".into(),
            score: 0.9,
            text: Some("top level".into()),
            metadata: Metadata::from([("text".into(), json!("from metadata"))]),
        };
        assert_eq!(m.chunk_text(), Some("from metadata"));
    }

    #[test]
    fn chunk_text_falls_back_past_empty_metadata() {
        let m = ScoredMatch {
            id: "doc-0".into(),
            score: 0.9,
            text: Some("top level".into()),
            metadata: Metadata::from([("text".into(), json!(""))]),
        };
        assert_eq!(m.chunk_text(), Some("top level"));

        let none = ScoredMatch { id: "doc-1".into(), score: 0.1, text: None, metadata: Metadata::new() };
        assert_eq!(none.chunk_text(), None);
    }

    #[test]
    fn filter_requires_every_condition() {
        let filter = MetadataFilter::new().with("year", 2024).with("quarter", 1);
        let mut metadata = Metadata::from([("year".into(), json!(2024))]);
        assert!(!filter.matches(&metadata));
        metadata.insert("quarter".into(), json!(1));
        assert!(filter.matches(&metadata));
        metadata.insert("quarter".into(), json!(2));
        assert!(!filter.matches(&metadata));
    }
}
