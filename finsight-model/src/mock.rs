//! Scripted synthesizer for tests and local development.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::synthesizer::{SynthesisRequest, SynthesisResult, Synthesizer};

/// A [`Synthesizer`] that returns a scripted answer and counts calls.
///
/// The token estimate is the whitespace count of the prompt parts it was
/// handed, so tests can assert that context actually reached the
/// synthesizer.
pub struct MockSynthesizer {
    answer: String,
    calls: AtomicUsize,
}

impl MockSynthesizer {
    /// Create a mock that always answers with `answer`.
    pub fn new(answer: impl Into<String>) -> Self {
        Self { answer: answer.into(), calls: AtomicUsize::new(0) }
    }

    /// How many times `synthesize` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> SynthesisResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let token_count = request.context.split_whitespace().count()
            + request.question.split_whitespace().count();
        SynthesisResult { answer: self.answer.clone(), token_count, estimated_cost: 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_counts_calls_and_tokens() {
        let mock = MockSynthesizer::new("scripted");
        assert_eq!(mock.call_count(), 0);

        let result = mock
            .synthesize(&SynthesisRequest {
                context: "two words".into(),
                question: "one".into(),
                provider: "gpt-4o".into(),
            })
            .await;

        assert_eq!(mock.call_count(), 1);
        assert_eq!(result.answer, "scripted");
        assert_eq!(result.token_count, 3);
    }
}
