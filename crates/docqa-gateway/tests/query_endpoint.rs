//! HTTP contract tests driven through `tower::ServiceExt::oneshot`.

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use docqa_foundation::rag::RagPipeline;
use docqa_gateway::server::{QueryServer, QueryServerConfig};
use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::{
    CompletionRequest, DocumentChunk, Embedder, LanguageModel, RetrievedChunk, SimilarityMetric,
    VectorIndex,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

struct StubEmbedder;

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
        Ok(vec![0.1, 0.2, 0.3])
    }

    fn dimensions(&self) -> usize {
        3
    }
}

struct StubIndex {
    result: Result<Vec<RetrievedChunk>, String>,
    calls: AtomicUsize,
}

#[async_trait]
impl VectorIndex for StubIndex {
    async fn search(&self, _q: &[f32], _top_k: usize) -> RagResult<Vec<RetrievedChunk>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(RagError::VectorIndex)
    }

    async fn upsert_batch(&self, _chunks: Vec<DocumentChunk>) -> RagResult<()> {
        Ok(())
    }

    async fn count(&self) -> RagResult<usize> {
        Ok(0)
    }

    fn similarity_metric(&self) -> SimilarityMetric {
        SimilarityMetric::Cosine
    }
}

struct StubModel {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, request: &CompletionRequest) -> RagResult<String> {
        self.prompts.lock().push(request.prompt.clone());
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

struct Fixture {
    app: axum::Router,
    index: Arc<StubIndex>,
    model: Arc<StubModel>,
}

fn fixture(result: Result<Vec<RetrievedChunk>, String>, reply: &str) -> Fixture {
    let index = Arc::new(StubIndex {
        result,
        calls: AtomicUsize::new(0),
    });
    let model = Arc::new(StubModel {
        reply: reply.to_string(),
        prompts: Mutex::new(Vec::new()),
    });
    let pipeline = RagPipeline::from_providers(Arc::new(StubEmbedder), index.clone(), model.clone());
    let app = QueryServer::new(QueryServerConfig::default(), pipeline).build_app();
    Fixture { app, index, model }
}

fn agentic_hits() -> Result<Vec<RetrievedChunk>, String> {
    Ok(vec![
        RetrievedChunk::new("Agentic AI plans.", 0.9),
        RetrievedChunk::new("Agents use tools.", 0.8),
        RetrievedChunk::new("Agents reflect.", 0.7),
    ])
}

fn post_query(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn query_returns_answer_chunks_and_confidence() {
    let f = fixture(agentic_hits(), "Agentic AI is about autonomous agents.");

    let response = f
        .app
        .oneshot(post_query(json!({"query": "What is Agentic AI?"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "answer": {
                "ai_response": "Agentic AI is about autonomous agents.",
                "retrieved_chunks": [
                    {"content": "Agentic AI plans.", "score": 0.9},
                    {"content": "Agents use tools.", "score": 0.8},
                    {"content": "Agents reflect.", "score": 0.7}
                ],
                "confidence_score": 0.8
            }
        })
    );
    assert_eq!(f.model.prompts.lock().len(), 1);
}

#[tokio::test]
async fn blank_query_is_a_normal_answer() {
    let f = fixture(agentic_hits(), "unused");

    let response = f
        .app
        .oneshot(post_query(json!({"query": "   "}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["answer"]["ai_response"], "Invalid user query");
    assert_eq!(body["answer"]["retrieved_chunks"], json!([]));
    assert_eq!(body["answer"]["confidence_score"], json!(0.0));
    assert_eq!(f.index.calls.load(Ordering::SeqCst), 0);
    assert!(f.model.prompts.lock().is_empty());
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let f = fixture(agentic_hits(), "unused");

    let response = f.app.oneshot(post_query("{\"question\": 1}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn index_failure_is_bad_gateway_without_details() {
    let f = fixture(Err("401 invalid api key pc-secret".to_string()), "unused");

    let response = f
        .app
        .oneshot(post_query(json!({"query": "What is Agentic AI?"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");
    assert!(!body.to_string().contains("pc-secret"));
    assert!(f.model.prompts.lock().is_empty());
}

#[tokio::test]
async fn health_reports_service() {
    let f = fixture(Ok(Vec::new()), "unused");

    let response = f
        .app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "ok", "service": "docqa-gateway"})
    );
}
