//! Application settings for the DocQA service

use super::{ConfigError, ConfigResult};
use crate::rag::{SimilarityMetric, TOP_K};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level settings. Every field has a default so a bare environment works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocQaConfig {
    pub server: ServerSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub index: IndexSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub ingest: IngestSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Embedding provider (any OpenAI-compatible `/embeddings` endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// `None` targets api.openai.com
    pub base_url: Option<String>,
    /// Falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    pub model: String,
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            dimensions: 768,
        }
    }
}

impl EmbeddingSettings {
    pub fn resolved_api_key(&self) -> String {
        resolve_key(self.api_key.as_deref(), "OPENAI_API_KEY")
    }
}

/// Chat model used for answer generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: Option<String>,
    /// Falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: None,
        }
    }
}

impl LlmSettings {
    pub fn resolved_api_key(&self) -> String {
        resolve_key(self.api_key.as_deref(), "OPENAI_API_KEY")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Pinecone,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub backend: IndexBackend,
    /// Pinecone index host, e.g. `https://docs-abc123.svc.us-east-1.pinecone.io`.
    /// Looked up from `name` when unset.
    pub host: Option<String>,
    /// Pinecone index name; `docqa ingest` creates the index when missing
    pub name: Option<String>,
    /// Falls back to `PINECONE_API_KEY`
    pub api_key: Option<String>,
    pub namespace: Option<String>,
    pub metric: SimilarityMetric,
    /// Serverless placement used when the index is created
    pub cloud: String,
    pub region: String,
    /// Control-plane endpoint, `None` targets api.pinecone.io
    pub control_url: Option<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            host: None,
            name: None,
            api_key: None,
            namespace: None,
            metric: SimilarityMetric::default(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            control_url: None,
        }
    }
}

impl IndexSettings {
    pub fn resolved_api_key(&self) -> String {
        resolve_key(self.api_key.as_deref(), "PINECONE_API_KEY")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: TOP_K }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Subject area the assistant is restricted to
    pub domain: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            domain: "Agentic AI".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub docs_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("./docs"),
            chunk_size: 512,
            chunk_overlap: 51,
            batch_size: 64,
        }
    }
}

impl DocQaConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.retrieval.top_k != TOP_K {
            return Err(ConfigError::Invalid(format!(
                "retrieval.top_k is fixed at {TOP_K}, got {}",
                self.retrieval.top_k
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(ConfigError::Invalid(
                "embedding.dimensions must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        if self.ingest.chunk_size == 0 || self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }
        if self.ingest.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "ingest.batch_size must be greater than 0".to_string(),
            ));
        }
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        if self.index.backend == IndexBackend::Pinecone
            && blank(&self.index.host)
            && blank(&self.index.name)
        {
            return Err(ConfigError::Invalid(
                "index.host or index.name is required for the pinecone backend".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_key(explicit: Option<&str>, env_var: &str) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .unwrap_or_default()
}
