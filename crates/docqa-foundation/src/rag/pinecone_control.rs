//! Pinecone control plane: look up or create an index by name
//!
//! [`PineconeIndex`](super::pinecone::PineconeIndex) needs the index host.
//! [`PineconeControlPlane::ensure_index`] resolves it from the index name,
//! creating a serverless index on first use.

use super::pinecone::{API_VERSION, map_error};
use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::SimilarityMetric;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Public control-plane endpoint.
pub const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";

/// The index to look up or create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    /// Must equal the embedder's output size
    pub dimension: usize,
    pub metric: SimilarityMetric,
    pub cloud: String,
    pub region: String,
}

impl IndexSpec {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric: SimilarityMetric::Cosine,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_serverless(mut self, cloud: impl Into<String>, region: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self.region = region.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct ControlPlaneConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Delay between readiness checks after creating an index
    pub poll_interval: Duration,
    /// Readiness checks before giving up
    pub max_polls: usize,
}

impl ControlPlaneConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_CONTROL_URL.to_string(),
            timeout_secs: 30,
            poll_interval: Duration::from_secs(2),
            max_polls: 60,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: usize) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }
}

/// Index description returned by the control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    #[serde(default)]
    pub metric: Option<String>,
    /// Data-plane host, without scheme
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'static str,
    spec: IndexDeployment<'a>,
    deletion_protection: &'static str,
}

#[derive(Debug, Serialize)]
struct IndexDeployment<'a> {
    serverless: ServerlessDeployment<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessDeployment<'a> {
    cloud: &'a str,
    region: &'a str,
}

fn metric_name(metric: SimilarityMetric) -> &'static str {
    match metric {
        SimilarityMetric::Cosine => "cosine",
        SimilarityMetric::Euclidean => "euclidean",
        SimilarityMetric::DotProduct => "dotproduct",
    }
}

fn parse_description(text: &str) -> RagResult<IndexDescription> {
    serde_json::from_str(text)
        .map_err(|e| RagError::VectorIndex(format!("unexpected pinecone index description: {e}")))
}

/// Client for the project-level `/indexes` API.
pub struct PineconeControlPlane {
    client: reqwest::Client,
    config: ControlPlaneConfig,
}

impl PineconeControlPlane {
    pub fn new(config: ControlPlaneConfig) -> RagResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::VectorIndex(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        self.client
            .request(method, url)
            .header("Api-Key", &self.config.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    /// Describe `name`, or `None` when the project has no such index.
    pub async fn describe_index(&self, name: &str) -> RagResult<Option<IndexDescription>> {
        let resp = self
            .request(Method::GET, &format!("/indexes/{name}"))
            .send()
            .await
            .map_err(map_error)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = resp.text().await.map_err(map_error)?;
        if !status.is_success() {
            return Err(RagError::VectorIndex(format!(
                "pinecone describe index returned {}: {text}",
                status.as_u16()
            )));
        }
        parse_description(&text).map(Some)
    }

    /// Create a serverless index. The returned description may not be ready yet.
    pub async fn create_index(&self, spec: &IndexSpec) -> RagResult<IndexDescription> {
        let body = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: metric_name(spec.metric),
            spec: IndexDeployment {
                serverless: ServerlessDeployment {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
            deletion_protection: "disabled",
        };
        let resp = self
            .request(Method::POST, "/indexes")
            .json(&body)
            .send()
            .await
            .map_err(map_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(map_error)?;
        if !status.is_success() {
            return Err(RagError::VectorIndex(format!(
                "pinecone create index returned {}: {text}",
                status.as_u16()
            )));
        }
        parse_description(&text)
    }

    /// Return the ready index named by `spec`, creating it when missing.
    ///
    /// An existing index with another dimension is rejected: its vectors can
    /// never be compared with the embedder's.
    pub async fn ensure_index(&self, spec: &IndexSpec) -> RagResult<IndexDescription> {
        let description = match self.describe_index(&spec.name).await? {
            Some(existing) => {
                if existing.dimension != spec.dimension {
                    return Err(RagError::ConfigError(format!(
                        "pinecone index {} has dimension {}, embedder produces {}",
                        spec.name, existing.dimension, spec.dimension
                    )));
                }
                if existing.metric.as_deref() != Some(metric_name(spec.metric)) {
                    warn!(
                        index = %spec.name,
                        metric = ?existing.metric,
                        "existing index uses a different metric"
                    );
                }
                debug!(index = %spec.name, host = %existing.host, "pinecone index exists");
                existing
            }
            None => {
                info!(
                    index = %spec.name,
                    dimension = spec.dimension,
                    metric = metric_name(spec.metric),
                    cloud = %spec.cloud,
                    region = %spec.region,
                    "creating pinecone index"
                );
                self.create_index(spec).await?
            }
        };
        self.wait_until_ready(description).await
    }

    async fn wait_until_ready(
        &self,
        mut description: IndexDescription,
    ) -> RagResult<IndexDescription> {
        let mut polls = 0;
        while !description.status.ready {
            if polls >= self.config.max_polls {
                return Err(RagError::VectorIndex(format!(
                    "pinecone index {} not ready after {polls} checks (state: {})",
                    description.name, description.status.state
                )));
            }
            polls += 1;
            tokio::time::sleep(self.config.poll_interval).await;
            let name = description.name.clone();
            description = self.describe_index(&name).await?.ok_or_else(|| {
                RagError::VectorIndex(format!("pinecone index {name} vanished while initializing"))
            })?;
        }
        info!(index = %description.name, host = %description.host, "pinecone index ready");
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn control_for(server: &MockServer) -> PineconeControlPlane {
        PineconeControlPlane::new(
            ControlPlaneConfig::new("pc-test")
                .with_base_url(server.uri())
                .with_polling(Duration::ZERO, 3),
        )
        .unwrap()
    }

    fn description(dimension: usize, ready: bool) -> serde_json::Value {
        let state = if ready { "Ready" } else { "Initializing" };
        json!({
            "name": "agentic-docs",
            "dimension": dimension,
            "metric": "cosine",
            "host": "agentic-docs-abc123.svc.aped-4627-b74a.pinecone.io",
            "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}},
            "status": {"ready": ready, "state": state},
            "deletion_protection": "disabled"
        })
    }

    #[tokio::test]
    async fn existing_index_is_reused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/agentic-docs"))
            .and(header("Api-Key", "pc-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(description(768, true)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let index = control_for(&server)
            .ensure_index(&IndexSpec::new("agentic-docs", 768))
            .await
            .unwrap();
        assert_eq!(index.host, "agentic-docs-abc123.svc.aped-4627-b74a.pinecone.io");
    }

    #[tokio::test]
    async fn missing_index_is_created_and_awaited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/agentic-docs"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "NOT_FOUND", "message": "Resource agentic-docs not found"},
                "status": 404
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .and(body_partial_json(json!({
                "name": "agentic-docs",
                "dimension": 768,
                "metric": "cosine",
                "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(description(768, false)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/indexes/agentic-docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(description(768, true)))
            .mount(&server)
            .await;

        let index = control_for(&server)
            .ensure_index(&IndexSpec::new("agentic-docs", 768))
            .await
            .unwrap();
        assert!(index.status.ready);
        assert!(!index.host.is_empty());
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/agentic-docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(description(1536, true)))
            .mount(&server)
            .await;

        let err = control_for(&server)
            .ensure_index(&IndexSpec::new("agentic-docs", 768))
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
        assert!(err.to_string().contains("1536"));
    }

    #[tokio::test]
    async fn index_that_never_becomes_ready_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/agentic-docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(description(768, false)))
            .mount(&server)
            .await;

        let err = control_for(&server)
            .ensure_index(&IndexSpec::new("agentic-docs", 768))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not ready"));
    }

    #[test]
    fn create_request_uses_pinecone_metric_names() {
        assert_eq!(metric_name(SimilarityMetric::DotProduct), "dotproduct");
        let spec = IndexSpec::new("docs", 768)
            .with_metric(SimilarityMetric::Euclidean)
            .with_serverless("gcp", "us-central1");
        assert_eq!(metric_name(spec.metric), "euclidean");
        assert_eq!(spec.cloud, "gcp");
    }
}
