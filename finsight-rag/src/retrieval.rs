//! Retrieval-augmented answering over the vector index.

use std::sync::Arc;

use tracing::{debug, info};

use finsight_model::{SynthesisRequest, SynthesisResult, Synthesizer};

use crate::client::IndexClient;
use crate::embedder::Embedder;
use crate::error::Result;
use crate::record::MetadataFilter;

/// System-wide ceiling on retrieval width, bounding synthesis context
/// size and cost regardless of what callers request.
pub const TOP_K_HARD_CAP: usize = 500;

/// Separator joining matched chunk texts into one context string.
const CONTEXT_SEPARATOR: &str = " ";

/// The retrieval width actually used for a query:
/// `min(requested, total_vector_count, hard_cap)`.
pub fn effective_top_k(requested: usize, total_vector_count: usize, hard_cap: usize) -> usize {
    requested.min(total_vector_count).min(hard_cap)
}

/// What a retrieval pass produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieved {
    /// Context was found and an answer synthesized from it.
    Answer(SynthesisResult),
    /// Nothing relevant in the index; synthesis was skipped so no tokens
    /// were spent on empty context.
    NoContent,
}

impl Retrieved {
    /// The fixed answer text reported when retrieval finds nothing.
    pub const NO_CONTENT_ANSWER: &'static str = "No relevant content found in the index.";

    /// Collapse into a synthesis result, substituting the fixed
    /// no-content answer (at zero tokens and cost) when nothing was
    /// retrieved.
    pub fn into_result(self) -> SynthesisResult {
        match self {
            Retrieved::Answer(result) => result,
            Retrieved::NoContent => SynthesisResult {
                answer: Self::NO_CONTENT_ANSWER.to_string(),
                token_count: 0,
                estimated_cost: 0.0,
            },
        }
    }
}

/// Answers a question from index content: bound the retrieval width
/// against the live index size, gather matching chunk text, synthesize.
pub struct RetrievalAgent {
    client: IndexClient,
    embedder: Arc<dyn Embedder>,
    synthesizer: Arc<dyn Synthesizer>,
    /// Provider key this agent always synthesizes with.
    provider: String,
    hard_cap: usize,
}

impl RetrievalAgent {
    /// Create an agent with the default provider (`gpt-4o`) and hard cap.
    pub fn new(
        client: IndexClient,
        embedder: Arc<dyn Embedder>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            client,
            embedder,
            synthesizer,
            provider: "gpt-4o".to_string(),
            hard_cap: TOP_K_HARD_CAP,
        }
    }

    /// Override the fixed provider choice for this agent.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Override the retrieval-width ceiling.
    pub fn with_hard_cap(mut self, hard_cap: usize) -> Self {
        self.hard_cap = hard_cap;
        self
    }

    /// Retrieve context for `question` and synthesize an answer from it.
    ///
    /// Index statistics are read fresh on every call: ingestion may be
    /// running concurrently, so the count is never cached. An index
    /// holding nothing (or nothing matching) yields
    /// [`Retrieved::NoContent`] without invoking the synthesizer.
    ///
    /// # Errors
    ///
    /// Propagates stats-read and question-embedding failures; query
    /// failures have already degraded to an empty match set inside the
    /// client.
    pub async fn retrieve_and_answer(
        &self,
        question: &str,
        requested_top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Retrieved> {
        let stats = self.client.describe().await?;
        let top_k = effective_top_k(requested_top_k, stats.total_vector_count, self.hard_cap);
        debug!(
            requested_top_k,
            total_vector_count = stats.total_vector_count,
            top_k,
            "clamped retrieval width"
        );

        let matches = if top_k == 0 {
            // An empty index is an empty match set, not an error; skip
            // the backend round-trip (some reject top_k = 0 outright).
            Vec::new()
        } else {
            let vector = self.embedder.embed(question).await?;
            self.client.query(&vector, top_k, filter).await
        };

        let context = matches
            .iter()
            .filter_map(|m| m.chunk_text())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        if context.is_empty() {
            info!(top_k, "no content retrieved, skipping synthesis");
            return Ok(Retrieved::NoContent);
        }

        let result = self
            .synthesizer
            .synthesize(&SynthesisRequest {
                context,
                question: question.to_string(),
                provider: self.provider.clone(),
            })
            .await;

        Ok(Retrieved::Answer(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_tracks_index_size_below_request() {
        for total in 0..=10 {
            assert_eq!(effective_top_k(10, total, 500), total);
        }
    }

    #[test]
    fn clamp_enforces_hard_cap() {
        assert_eq!(effective_top_k(1000, 900, 500), 500);
        assert_eq!(effective_top_k(500, 500, 500), 500);
    }

    #[test]
    fn clamp_respects_request_when_smallest() {
        assert_eq!(effective_top_k(7, 37, 500), 7);
        assert_eq!(effective_top_k(1000, 37, 500), 37);
    }

    #[test]
    fn no_content_collapses_to_fixed_answer() {
        let result = Retrieved::NoContent.into_result();
        assert_eq!(result.answer, Retrieved::NO_CONTENT_ANSWER);
        assert_eq!(result.token_count, 0);
        assert_eq!(result.estimated_cost, 0.0);
    }
}
