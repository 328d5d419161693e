//! # finsight-rag
//!
//! The ingestion and retrieval half of the finsight research pipeline.
//!
//! Raw document text is split into chunks, embedded by a fixed sentence
//! model, and upserted into a vector index in retry-safe batches; at
//! query time the [`RetrievalAgent`] bounds the retrieval width against
//! the live index size, gathers matching chunk text, and hands it to an
//! answer synthesizer.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use finsight_rag::{ChunkIngestor, IndexClient, InMemoryIndex, RetrievalAgent};
//!
//! let index = Arc::new(InMemoryIndex::new());
//! let client = IndexClient::new(index.clone());
//! let ingestor = ChunkIngestor::new(embedder.clone(), client.clone());
//! let summary = ingestor.ingest_document("10k-2024", &filing_text, &Default::default()).await;
//!
//! let agent = RetrievalAgent::new(IndexClient::new(index), embedder, synthesizer);
//! let outcome = agent.retrieve_and_answer("How did margins move?", 500, None).await?;
//! ```

pub mod chunker;
pub mod client;
pub mod embedder;
pub mod error;
pub mod index;
pub mod ingest;
pub mod inmemory;
pub mod pinecone;
pub mod record;
pub mod retrieval;
pub mod retry;

pub use chunker::Chunker;
pub use client::{BatchResult, IndexClient};
pub use embedder::{Embedder, HttpEmbedder};
pub use error::{RagError, Result};
pub use index::VectorIndex;
pub use ingest::{ChunkIngestor, IngestSummary};
pub use inmemory::InMemoryIndex;
pub use pinecone::PineconeIndex;
pub use record::{EmbeddingRecord, IndexStats, Metadata, MetadataFilter, ScoredMatch};
pub use retrieval::{Retrieved, RetrievalAgent, TOP_K_HARD_CAP, effective_top_k};
pub use retry::RetryPolicy;
