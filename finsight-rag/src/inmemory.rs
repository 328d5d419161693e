//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryIndex`] keeps records in a `HashMap` behind a
//! `tokio::sync::RwLock`. It is suitable for development, tests, and
//! small corpora; its statistics are exact, unlike remote backends whose
//! counts lag concurrent writes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::index::VectorIndex;
use crate::record::{EmbeddingRecord, IndexStats, MetadataFilter, ScoredMatch};

/// An in-memory [`VectorIndex`] scoring by cosine similarity.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    records: RwLock<HashMap<String, EmbeddingRecord>>,
}

impl InMemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine similarity of two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<()> {
        let mut store = self.records.write().await;
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>> {
        let store = self.records.read().await;
        let mut scored: Vec<ScoredMatch> = store
            .values()
            .filter(|record| filter.is_none_or(|f| f.matches(&record.metadata)))
            .map(|record| ScoredMatch {
                id: record.id.clone(),
                score: cosine_similarity(&record.values, vector),
                text: None,
                metadata: record.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn describe(&self) -> Result<IndexStats> {
        let store = self.records.read().await;
        Ok(IndexStats { total_vector_count: store.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, values: Vec<f32>, year: i64) -> EmbeddingRecord {
        EmbeddingRecord {
            id: id.to_string(),
            values,
            metadata: crate::record::Metadata::from([
                ("year".to_string(), json!(year)),
                ("text".to_string(), json!(format!("text of {id}"))),
            ]),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = InMemoryIndex::new();
        index.upsert(&[record("a-0", vec![1.0, 0.0], 2023)]).await.unwrap();
        index.upsert(&[record("a-0", vec![0.0, 1.0], 2024)]).await.unwrap();

        let stats = index.describe().await.unwrap();
        assert_eq!(stats.total_vector_count, 1);

        let matches = index.query(&[0.0, 1.0], 10, None).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].metadata.get("year"), Some(&json!(2024)));
    }

    #[tokio::test]
    async fn query_applies_metadata_filter() {
        let index = InMemoryIndex::new();
        index
            .upsert(&[
                record("a-0", vec![1.0, 0.0], 2023),
                record("b-0", vec![1.0, 0.1], 2024),
            ])
            .await
            .unwrap();

        let filter = MetadataFilter::new().with("year", 2024);
        let matches = index.query(&[1.0, 0.0], 10, Some(&filter)).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "b-0");
    }

    #[tokio::test]
    async fn zero_top_k_yields_empty_match_set() {
        let index = InMemoryIndex::new();
        index.upsert(&[record("a-0", vec![1.0, 0.0], 2023)]).await.unwrap();
        let matches = index.query(&[1.0, 0.0], 0, None).await.unwrap();
        assert!(matches.is_empty());
    }
}
