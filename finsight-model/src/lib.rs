//! # finsight-model
//!
//! Answer synthesis over a closed set of language-model backends.
//!
//! ## Overview
//!
//! Given retrieved document context and a question, the [`Synthesizer`]
//! produces one normalized [`SynthesisResult`]: answer text, a token
//! estimate, and a cost estimate. Backends are selected by a string key
//! and dispatched through the [`Provider`] variant set; each variant
//! owns one request shape and one response-normalization rule.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use finsight_model::{ProviderKeys, ProviderSynthesizer, SynthesisRequest, Synthesizer};
//!
//! let synth = ProviderSynthesizer::new(ProviderKeys::from_env())?;
//! let result = synth
//!     .synthesize(&SynthesisRequest {
//!         context: "…retrieved chunks…".into(),
//!         question: "Summarize the quarter.".into(),
//!         provider: "gpt-4o".into(),
//!     })
//!     .await;
//! println!("{} ({} tokens, ${:.6})", result.answer, result.token_count, result.estimated_cost);
//! ```
//!
//! ## Supported Providers
//!
//! | Key | Backend model | Tokenizer |
//! |-----|---------------|-----------|
//! | `gpt-4o` | `gpt-4o-mini-2024-07-18` | cl100k BPE |
//! | `gemini flash free` | `gemini-1.5-pro-latest` | whitespace |
//! | `deepseek`, `deepseek chat` | `deepseek-chat` | cl100k BPE |
//! | `claude`, `claude-3`, `claude-3.5 haiku` | `claude-3-5-haiku-20241022` | whitespace |
//!
//! Unknown keys never fail loudly: they produce the fixed
//! unrecognized-provider answer at zero cost. Provider call failures are
//! likewise converted into a degraded result that keeps the token and
//! cost accounting computed before the call.

pub mod error;
pub mod mock;
pub mod provider;
pub mod synthesizer;
pub mod tokens;

pub use error::{ModelError, Result};
pub use mock::MockSynthesizer;
pub use provider::{Provider, TokenizerFamily};
pub use synthesizer::{
    ProviderKeys, ProviderSynthesizer, SynthesisRequest, SynthesisResult, Synthesizer,
    UNRECOGNIZED_PROVIDER_ANSWER,
};
pub use tokens::TokenCounter;
