//! Pinecone vector index over the data-plane REST API
//!
//! Talks to an existing index host (`https://<index>-<project>.svc.<region>.pinecone.io`).
//! Chunk text is stored in and read back from the `text` metadata key. Use
//! [`PineconeControlPlane`](super::pinecone_control::PineconeControlPlane)
//! to look up or create the index and obtain its host.

use async_trait::async_trait;
use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::{DocumentChunk, RetrievedChunk, SimilarityMetric, VectorIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Metadata key holding the chunk text.
pub const TEXT_METADATA_KEY: &str = "text";

pub(crate) const API_VERSION: &str = "2024-07";

/// Pinecone index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    /// Index host URL
    pub host: String,
    pub api_key: String,
    /// Namespace to query and upsert into; `None` uses the default namespace
    pub namespace: Option<String>,
    /// Metric the index was created with (reported only, scoring is server-side)
    pub metric: SimilarityMetric,
    /// Vectors per upsert request
    pub upsert_batch_size: usize,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl PineconeConfig {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            namespace: None,
            metric: SimilarityMetric::Cosine,
            upsert_batch_size: 100,
            timeout_secs: 30,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_upsert_batch_size(mut self, size: usize) -> Self {
        self.upsert_batch_size = size.max(1);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredVector>,
}

#[derive(Debug, Deserialize)]
struct ScoredVector {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
    #[serde(default)]
    total_vector_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: usize,
}

/// [`VectorIndex`] backed by a Pinecone serverless or pod index.
pub struct PineconeIndex {
    client: reqwest::Client,
    config: PineconeConfig,
}

impl PineconeIndex {
    pub fn new(config: PineconeConfig) -> RagResult<Self> {
        if config.host.trim().is_empty() {
            return Err(RagError::ConfigError("pinecone host is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::VectorIndex(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PineconeConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        let host = self.config.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}{path}")
        } else {
            format!("https://{host}{path}")
        }
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RagResult<String> {
        let resp = self
            .client
            .post(self.url(path))
            .header("Api-Key", &self.config.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(map_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(map_error)?;
        if !status.is_success() {
            return Err(RagError::VectorIndex(format!(
                "pinecone {path} returned {}: {text}",
                status.as_u16()
            )));
        }
        Ok(text)
    }
}

pub(crate) fn map_error(err: reqwest::Error) -> RagError {
    if err.is_timeout() {
        RagError::VectorIndex(format!("request timed out: {err}"))
    } else {
        RagError::VectorIndex(err.to_string())
    }
}

fn parse<T: serde::de::DeserializeOwned>(text: &str) -> RagResult<T> {
    serde_json::from_str(text)
        .map_err(|e| RagError::VectorIndex(format!("unexpected pinecone response: {e}")))
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> RagResult<Vec<RetrievedChunk>> {
        let body = QueryRequest {
            vector: query_embedding,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.config.namespace.as_deref(),
        };
        let response: QueryResponse = parse(&self.post("/query", &body).await?)?;

        let mut chunks = Vec::with_capacity(response.matches.len());
        for hit in response.matches {
            match hit.metadata.get(TEXT_METADATA_KEY).and_then(|v| v.as_str()) {
                Some(text) => chunks.push(RetrievedChunk::new(text, hit.score)),
                None => warn!(id = %hit.id, "match has no text metadata, skipping"),
            }
        }
        chunks.truncate(top_k);
        debug!(matches = chunks.len(), top_k, "pinecone query completed");
        Ok(chunks)
    }

    async fn upsert_batch(&self, chunks: Vec<DocumentChunk>) -> RagResult<()> {
        for batch in chunks.chunks(self.config.upsert_batch_size.max(1)) {
            let body = UpsertRequest {
                vectors: batch
                    .iter()
                    .map(|c| UpsertVector {
                        id: &c.id,
                        values: &c.embedding,
                        metadata: &c.metadata,
                    })
                    .collect(),
                namespace: self.config.namespace.as_deref(),
            };
            self.post("/vectors/upsert", &body).await?;
            debug!(vectors = batch.len(), "pinecone upsert completed");
        }
        Ok(())
    }

    async fn count(&self) -> RagResult<usize> {
        let stats: IndexStats =
            parse(&self.post("/describe_index_stats", &serde_json::json!({})).await?)?;
        Ok(match &self.config.namespace {
            Some(ns) => stats.namespaces.get(ns).map_or(0, |s| s.vector_count),
            None => stats.total_vector_count,
        })
    }

    fn similarity_metric(&self) -> SimilarityMetric {
        self.config.metric
    }
}
