//! Vector index trait for storing and searching embeddings.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::{EmbeddingRecord, IndexStats, MetadataFilter, ScoredMatch};

/// A storage backend for one named vector index.
///
/// Implementations store [`EmbeddingRecord`]s keyed by id and support
/// similarity queries with optional metadata filtering. Backends are
/// interchangeable behind this trait; operational policy (batching,
/// retry, query degradation) lives in [`IndexClient`](crate::IndexClient).
///
/// # Example
///
/// ```rust,ignore
/// use finsight_rag::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new();
/// index.upsert(&records).await?;
/// let matches = index.query(&query_vector, 10, None).await?;
/// let stats = index.describe().await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace records by id.
    async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<()>;

    /// Return the `top_k` most similar records, ordered by descending
    /// score, optionally restricted to records matching `filter`.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredMatch>>;

    /// Read a point-in-time snapshot of the index size.
    async fn describe(&self) -> Result<IndexStats>;
}
