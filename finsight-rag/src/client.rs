//! Batched, retrying client over a vector index backend.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::Result;
use crate::index::VectorIndex;
use crate::record::{EmbeddingRecord, IndexStats, MetadataFilter, ScoredMatch};
use crate::retry::RetryPolicy;

/// Default number of records per upsert call, sized to provider payload
/// limits.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Result of one batched upsert.
///
/// Ingestion is best-effort per batch: a batch that exhausts its retries
/// is skipped and recorded here, while the remaining batches still go in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Records handed to the client.
    pub attempted: usize,
    /// Records actually upserted.
    pub upserted: usize,
    /// Zero-based indices of batches that failed every attempt.
    pub failed_batches: Vec<usize>,
}

/// Operational wrapper around a [`VectorIndex`] backend.
///
/// Adds the policy the raw trait leaves out: fixed-size upsert batching
/// with bounded retry, and degradation of query failures to an empty
/// match set (retrieval is advisory to downstream synthesis, so a failed
/// query must not take the whole report step down).
#[derive(Clone)]
pub struct IndexClient {
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
    retry: RetryPolicy,
}

impl IndexClient {
    /// Wrap `index` with the default batch size and retry policy.
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index, batch_size: DEFAULT_BATCH_SIZE, retry: RetryPolicy::default() }
    }

    /// Override the records-per-batch limit (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Override the per-batch retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Upsert `records` in fixed-size batches, retrying each batch under
    /// the configured policy. Batches are sequential with respect to each
    /// other within one call.
    pub async fn upsert_batched(&self, records: &[EmbeddingRecord]) -> BatchResult {
        let mut result = BatchResult { attempted: records.len(), ..Default::default() };

        for (batch_index, batch) in records.chunks(self.batch_size).enumerate() {
            match self.retry.run(|| self.index.upsert(batch)).await {
                Ok(()) => {
                    debug!(batch_index, size = batch.len(), "upserted batch");
                    result.upserted += batch.len();
                }
                Err(err) => {
                    error!(batch_index, error = %err, "batch failed all attempts, skipping");
                    result.failed_batches.push(batch_index);
                }
            }
        }

        result
    }

    /// Query the index; failures degrade to an empty match set.
    pub async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Vec<ScoredMatch> {
        match self.index.query(vector, top_k, filter).await {
            Ok(matches) => matches,
            Err(err) => {
                warn!(error = %err, "index query failed, returning no matches");
                Vec::new()
            }
        }
    }

    /// Read current index statistics. Unlike queries, a stats failure
    /// propagates: callers use the count to bound work and must decide
    /// for themselves what a missing count means.
    pub async fn describe(&self) -> Result<IndexStats> {
        self.index.describe().await
    }
}
