//! Error types for the `finsight-rag` crate.

use thiserror::Error;

/// Errors that can occur in ingestion and retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Index error ({backend}): {message}")]
    IndexError {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for ingestion and retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
