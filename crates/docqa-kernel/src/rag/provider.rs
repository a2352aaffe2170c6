//! Embedding and language model contracts
//!
//! The pipeline only sees these traits; provider adapters live in
//! docqa-foundation and test fakes implement them directly.

use crate::error::RagResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Maps text to a fixed-dimension vector.
///
/// Implementations must be deterministic for a given model and text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>>;

    /// Embed several texts, preserving input order.
    ///
    /// The default implementation issues one `embed` call per text.
    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;
}

/// A single-shot completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.1,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Maps a prompt to a generated completion.
///
/// No streaming and no function calling; one request yields one text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> RagResult<String>;

    /// Model identifier, used for logging.
    fn model_name(&self) -> &str;
}
