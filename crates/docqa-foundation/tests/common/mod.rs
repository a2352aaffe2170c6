//! Counting fakes for the three pipeline collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::{
    CompletionRequest, DocumentChunk, Embedder, LanguageModel, RetrievedChunk, SimilarityMetric,
    VectorIndex,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    pub inputs: Mutex<Vec<String>>,
    dimensions: usize,
}

impl FakeEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
            dimensions,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().push(text.to_string());
        Ok(vec![0.5; self.dimensions])
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

pub struct FakeIndex {
    hits: Vec<RetrievedChunk>,
    failure: Option<String>,
    pub calls: AtomicUsize,
    pub requested_k: Mutex<Vec<usize>>,
}

impl FakeIndex {
    pub fn with_hits(hits: &[(&str, f32)]) -> Self {
        Self {
            hits: hits
                .iter()
                .map(|(text, score)| RetrievedChunk::new(*text, *score))
                .collect(),
            failure: None,
            calls: AtomicUsize::new(0),
            requested_k: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_hits(&[])
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::empty()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn search(&self, _query: &[f32], top_k: usize) -> RagResult<Vec<RetrievedChunk>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested_k.lock().push(top_k);
        match &self.failure {
            Some(message) => Err(RagError::VectorIndex(message.clone())),
            None => Ok(self.hits.clone()),
        }
    }

    async fn upsert_batch(&self, _chunks: Vec<DocumentChunk>) -> RagResult<()> {
        Ok(())
    }

    async fn count(&self) -> RagResult<usize> {
        Ok(self.hits.len())
    }

    fn similarity_metric(&self) -> SimilarityMetric {
        SimilarityMetric::Cosine
    }
}

pub struct FakeModel {
    reply: String,
    failure: Option<String>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<CompletionRequest>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            failure: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::replying("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().map(|r| r.prompt.clone())
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, request: &CompletionRequest) -> RagResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.clone());
        match &self.failure {
            Some(message) => Err(RagError::LanguageModel(message.clone())),
            None => Ok(self.reply.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
