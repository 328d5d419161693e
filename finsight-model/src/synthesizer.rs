//! Answer synthesis over the closed provider set.
//!
//! [`ProviderSynthesizer`] routes a [`SynthesisRequest`] to one backend,
//! normalizes that backend's response shape to plain answer text, and
//! attaches a token/cost estimate computed *before* the call, so a failed
//! call never loses the accounting that was already done.

use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use crate::error::{ModelError, Result};
use crate::provider::{Provider, TokenizerFamily};
use crate::tokens::TokenCounter;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEEPSEEK_CHAT_URL: &str = "https://api.deepseek.com/v1/chat/completions";
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The fixed answer returned for a provider key outside the closed set.
pub const UNRECOGNIZED_PROVIDER_ANSWER: &str = "LLM choice not recognized.";

/// Retrieved context plus the user's question, routed to the backend
/// named by `provider`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesisRequest {
    /// Document context the answer must be grounded in.
    pub context: String,
    /// The user's question.
    pub question: String,
    /// User-facing provider key, e.g. `"gpt-4o"`. Unknown keys degrade
    /// to the fixed unrecognized-provider answer.
    pub provider: String,
}

/// The normalized result every backend response reduces to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesisResult {
    /// Answer text, or an error description when the call failed.
    pub answer: String,
    /// Prompt tokens, counted under the provider's tokenizer family.
    pub token_count: usize,
    /// `token_count` times the provider's per-token price. Directional.
    pub estimated_cost: f64,
}

/// Produces an answer from context and a question.
///
/// Implementations never fail: provider errors come back as a result
/// whose answer carries the error description and whose token/cost
/// fields keep the pre-call estimate.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize an answer for the given request.
    async fn synthesize(&self, request: &SynthesisRequest) -> SynthesisResult;
}

/// Credentials for the provider backends, injected at construction.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub google: Option<String>,
    pub deepseek: Option<String>,
    pub anthropic: Option<String>,
}

impl ProviderKeys {
    /// Read every backend credential from the environment. Absent
    /// variables stay `None`; the error surfaces only when that backend
    /// is actually chosen.
    pub fn from_env() -> Self {
        Self {
            openai: env::var("OPENAI_API_KEY").ok(),
            google: env::var("GOOGLE_API_KEY").ok(),
            deepseek: env::var("DEEPSEEK_API_KEY").ok(),
            anthropic: env::var("CLAUDE_API_KEY").ok(),
        }
    }

    fn for_provider(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Gpt4oMini => &self.openai,
            Provider::GeminiFlash => &self.google,
            Provider::DeepseekChat => &self.deepseek,
            Provider::ClaudeHaiku => &self.anthropic,
        };
        key.as_deref().filter(|k| !k.is_empty())
    }
}

/// A [`Synthesizer`] dispatching to the real provider backends.
pub struct ProviderSynthesizer {
    http: reqwest::Client,
    keys: ProviderKeys,
    counter: TokenCounter,
    /// Upper bound on the generated answer, for backends that require one.
    max_answer_tokens: u32,
}

impl ProviderSynthesizer {
    /// Create a synthesizer with the given credentials.
    pub fn new(keys: ProviderKeys) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            keys,
            counter: TokenCounter::new()?,
            max_answer_tokens: 1024,
        })
    }

    /// Override the answer-length bound sent to backends that take one.
    pub fn with_max_answer_tokens(mut self, max: u32) -> Self {
        self.max_answer_tokens = max;
        self
    }

    /// One request builder per provider variant. The shapes differ per
    /// backend; everything downstream sees only the normalized text.
    fn request(&self, provider: Provider, api_key: &str, prompt: &str) -> reqwest::RequestBuilder {
        match provider {
            Provider::Gpt4oMini => self.http.post(OPENAI_CHAT_URL).bearer_auth(api_key).json(
                &json!({
                    "model": provider.model_id(),
                    "messages": [{"role": "user", "content": prompt}],
                }),
            ),
            Provider::DeepseekChat => self.http.post(DEEPSEEK_CHAT_URL).bearer_auth(api_key).json(
                &json!({
                    "model": provider.model_id(),
                    "messages": [
                        {"role": "system", "content": "You are a helpful assistant"},
                        {"role": "user", "content": prompt},
                    ],
                    "stream": false,
                }),
            ),
            Provider::GeminiFlash => self
                .http
                .post(format!(
                    "{GEMINI_BASE_URL}/{}:generateContent?key={api_key}",
                    provider.model_id()
                ))
                .json(&json!({
                    "contents": [{"parts": [{"text": prompt}]}],
                })),
            Provider::ClaudeHaiku => self
                .http
                .post(ANTHROPIC_MESSAGES_URL)
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&json!({
                    "model": provider.model_id(),
                    "max_tokens": self.max_answer_tokens,
                    "messages": [{"role": "user", "content": prompt}],
                })),
        }
    }

    /// Call the backend and normalize its response to answer text.
    async fn complete(&self, provider: Provider, prompt: &str) -> Result<String> {
        let api_key = self.keys.for_provider(provider).ok_or_else(|| {
            ModelError::ConfigError(format!("{} is not set", provider.api_key_var()))
        })?;

        let response =
            self.request(provider, api_key, prompt).send().await.map_err(|e| {
                ModelError::ProviderError {
                    provider: provider.to_string(),
                    message: format!("request failed: {e}"),
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ModelError::ProviderError {
                provider: provider.to_string(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| ModelError::ParseError {
            provider: provider.to_string(),
            message: format!("invalid response body: {e}"),
        })?;

        normalize(provider, &value).ok_or_else(|| ModelError::ParseError {
            provider: provider.to_string(),
            message: "missing answer text in response".into(),
        })
    }
}

#[async_trait]
impl Synthesizer for ProviderSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> SynthesisResult {
        let prompt = build_prompt(&request.context, &request.question);
        let provider = Provider::parse(&request.provider);

        // Token and cost accounting happens before any network call so a
        // failed call still reports the estimate that was already made.
        let family = provider.map(|p| p.tokenizer()).unwrap_or(TokenizerFamily::Whitespace);
        let token_count = self.counter.count(&prompt, family);
        let estimated_cost =
            token_count as f64 * provider.map(|p| p.price_per_token()).unwrap_or(0.0);

        let Some(provider) = provider else {
            warn!(key = %request.provider, "unrecognized provider key");
            return SynthesisResult {
                answer: UNRECOGNIZED_PROVIDER_ANSWER.to_string(),
                token_count,
                estimated_cost,
            };
        };

        match self.complete(provider, &prompt).await {
            Ok(answer) => {
                debug!(provider = %provider, token_count, "synthesis completed");
                SynthesisResult { answer, token_count, estimated_cost }
            }
            Err(e) => {
                error!(provider = %provider, error = %e, "synthesis call failed");
                SynthesisResult { answer: format!("Error: {e}"), token_count, estimated_cost }
            }
        }
    }
}

/// The fixed instruction template wrapping context and question.
fn build_prompt(context: &str, question: &str) -> String {
    let context = if context.is_empty() { "No document content available." } else { context };
    format!(
        "You are a helpful assistant. Use the following document content to answer the question.\n\
         \n\
         Document Content:\n\
         {context}\n\
         \n\
         User Question:\n\
         {question}\n\
         \n\
         Answer the question based solely on the document above."
    )
}

/// Apply the provider's response-normalization rule.
fn normalize(provider: Provider, value: &Value) -> Option<String> {
    match provider {
        Provider::Gpt4oMini | Provider::DeepseekChat => text_from_choices(value),
        Provider::GeminiFlash => text_from_candidates(value),
        Provider::ClaudeHaiku => text_from_blocks(value),
    }
}

/// Choice-array shape: `choices[0].message.content` as a flat string.
fn text_from_choices(value: &Value) -> Option<String> {
    value
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

/// Nested candidate shape: first text part of the first candidate.
fn text_from_candidates(value: &Value) -> Option<String> {
    value
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .iter()
        .find_map(|part| part.get("text").and_then(Value::as_str))
        .map(str::to_string)
}

/// List-of-blocks shape: first text block of the content list.
fn text_from_blocks(value: &Value) -> Option<String> {
    value
        .get("content")?
        .as_array()?
        .iter()
        .find_map(|block| block.get("text").and_then(Value::as_str))
        .map(str::to_string)
}
