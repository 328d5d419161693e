//! Error types for the `finsight-model` crate.

use thiserror::Error;

/// Errors that can occur while synthesizing an answer.
///
/// These never escape [`Synthesizer::synthesize`](crate::Synthesizer::synthesize):
/// the synthesizer converts them into degraded results. They are public so
/// lower-level helpers can be used directly.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A credential or endpoint needed for the chosen provider is missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The provider call itself failed (network, HTTP status, rate limit).
    #[error("Provider error ({provider}): {message}")]
    ProviderError {
        /// The provider key the request was routed to.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider responded but the answer text could not be extracted.
    #[error("Response parse error ({provider}): {message}")]
    ParseError {
        /// The provider key the response came from.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The byte-pair tokenizer could not be constructed.
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
