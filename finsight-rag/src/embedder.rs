//! Embedding provider trait and HTTP implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};

/// Default sentence-embedding model served by the embedding endpoint.
const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Dimensionality of `all-MiniLM-L6-v2` embeddings.
const DEFAULT_DIMENSIONS: usize = 384;

/// A provider that turns text into fixed-dimension embedding vectors.
///
/// The whole pipeline runs against one fixed sentence-embedding model:
/// ingestion and query embeddings must come from the same space for
/// similarity scores to mean anything.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. The default implementation embeds
    /// sequentially; providers with native batching should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimensionality of the vectors this provider produces.
    fn dimensions(&self) -> usize;
}

/// An [`Embedder`] calling an OpenAI-compatible `/v1/embeddings`
/// endpoint, as served by text-embeddings-inference and similar hosts.
///
/// # Example
///
/// ```rust,ignore
/// use finsight_rag::HttpEmbedder;
///
/// let embedder = HttpEmbedder::new("http://localhost:8080")?;
/// let vector = embedder.embed("quarterly revenue commentary").await?;
/// assert_eq!(vector.len(), embedder.dimensions());
/// ```
pub struct HttpEmbedder {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
}

impl HttpEmbedder {
    /// Create a provider against `base_url`, using the default sentence
    /// model (`all-MiniLM-L6-v2`, 384 dimensions).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(RagError::ConfigError("embedding endpoint must not be empty".into()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/v1/embeddings", base_url.trim_end_matches('/')),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a provider from the `EMBEDDING_ENDPOINT` environment
    /// variable, with `EMBEDDING_API_KEY` as an optional credential.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("EMBEDDING_ENDPOINT").map_err(|_| {
            RagError::ConfigError("EMBEDDING_ENDPOINT environment variable not set".into())
        })?;
        let mut embedder = Self::new(base_url)?;
        embedder.api_key = std::env::var("EMBEDDING_API_KEY").ok();
        Ok(embedder)
    }

    /// Set a bearer credential for hosts that require one.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the model name and its dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

// ── Embeddings API request/response types ──────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingError {
            provider: self.model.clone(),
            message: "endpoint returned an empty embedding list".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model, batch_size = texts.len(), "embedding batch");

        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&EmbeddingRequest { model: &self.model, input: texts.to_vec() });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(model = %self.model, error = %e, "embedding request failed");
            RagError::EmbeddingError {
                provider: self.model.clone(),
                message: format!("request failed: {e}"),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|body| {
                    serde_json::from_str::<serde_json::Value>(&body)
                        .ok()
                        .and_then(|v| {
                            v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string)
                        })
                        .or(Some(body))
                })
                .unwrap_or_default();
            error!(model = %self.model, %status, "embedding endpoint error");
            return Err(RagError::EmbeddingError {
                provider: self.model.clone(),
                message: format!("endpoint returned {status}: {detail}"),
            });
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            RagError::EmbeddingError {
                provider: self.model.clone(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
