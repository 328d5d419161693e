//! Error types for the `finsight-report` crate.

use thiserror::Error;

/// Errors produced by report collaborators.
///
/// These stop at the orchestrator boundary: a step that fails is recorded
/// as a failed outcome in the report, never raised to the caller.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A credential or endpoint a collaborator needs is missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The financial store call failed.
    #[error("Financial store error: {0}")]
    FinancialError(String),

    /// The web search call failed.
    #[error("Web search error: {0}")]
    WebSearchError(String),
}
