//! Document ingestion: chunk, embed, and upsert.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::chunker::Chunker;
use crate::client::{BatchResult, IndexClient};
use crate::embedder::Embedder;
use crate::record::{EmbeddingRecord, Metadata};

/// Summary of one ingestion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Chunks the caller handed in.
    pub attempted: usize,
    /// Records that made it into the index.
    pub upserted: usize,
    /// Zero-based indices of upsert batches that failed every attempt.
    pub failed_batches: Vec<usize>,
}

/// Turns a document's chunks into embedding records and drives the index
/// client with them.
///
/// Chunk identity is deterministic (`"{document_id}-{index}"`), so
/// re-ingesting the same document overwrites its previous records instead
/// of duplicating them.
pub struct ChunkIngestor {
    embedder: Arc<dyn Embedder>,
    client: IndexClient,
    chunker: Chunker,
}

impl ChunkIngestor {
    /// Create an ingestor with the default chunker.
    pub fn new(embedder: Arc<dyn Embedder>, client: IndexClient) -> Self {
        Self { embedder, client, chunker: Chunker::default() }
    }

    /// Override the chunker used by [`ingest_document`](Self::ingest_document).
    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest pre-chunked text.
    ///
    /// Each chunk is embedded individually; a chunk whose embedding fails
    /// is skipped on its own and the rest of its batch still goes in. The
    /// `template` metadata is copied onto every record, then `source`,
    /// `chunk_index`, and `text` are stamped over it.
    pub async fn ingest(
        &self,
        document_id: &str,
        chunks: &[String],
        template: &Metadata,
    ) -> IngestSummary {
        let mut records = Vec::with_capacity(chunks.len());

        for (index, text) in chunks.iter().enumerate() {
            match self.embedder.embed(text).await {
                Ok(values) => {
                    let mut metadata = template.clone();
                    metadata.insert("source".to_string(), json!(document_id));
                    metadata.insert("chunk_index".to_string(), json!(index));
                    metadata.insert("text".to_string(), json!(text));
                    records.push(EmbeddingRecord {
                        id: format!("{document_id}-{index}"),
                        values,
                        metadata,
                    });
                }
                Err(err) => {
                    warn!(
                        document_id,
                        chunk_index = index,
                        error = %err,
                        "embedding failed, skipping chunk"
                    );
                }
            }
        }

        let BatchResult { upserted, failed_batches, .. } =
            self.client.upsert_batched(&records).await;

        info!(
            document_id,
            attempted = chunks.len(),
            upserted,
            failed = failed_batches.len(),
            "ingestion finished"
        );

        IngestSummary { attempted: chunks.len(), upserted, failed_batches }
    }

    /// Chunk a raw document and ingest the result.
    pub async fn ingest_document(
        &self,
        document_id: &str,
        text: &str,
        template: &Metadata,
    ) -> IngestSummary {
        let chunks = self.chunker.split(text);
        self.ingest(document_id, &chunks, template).await
    }
}
