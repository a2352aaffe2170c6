//! In-memory vector index
//!
//! Brute-force similarity search over a `HashMap`, guarded by a
//! `parking_lot::RwLock` so one handle can be shared behind an `Arc`.
//! Suitable for development, tests, and small corpora.

use crate::rag::similarity::compute_similarity;
use async_trait::async_trait;
use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::{DocumentChunk, RetrievedChunk, SimilarityMetric, VectorIndex};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;

/// In-memory vector index using brute-force similarity search.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_foundation::rag::InMemoryVectorIndex;
///
/// let index = InMemoryVectorIndex::cosine().with_dimensions(768);
/// index.upsert_batch(chunks).await?;
/// let hits = index.search(&query_vector, 3).await?;
/// ```
pub struct InMemoryVectorIndex {
    chunks: RwLock<HashMap<String, DocumentChunk>>,
    metric: SimilarityMetric,
    dimensions: Option<usize>,
}

impl InMemoryVectorIndex {
    pub fn new(metric: SimilarityMetric) -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
            metric,
            dimensions: None,
        }
    }

    pub fn cosine() -> Self {
        Self::new(SimilarityMetric::Cosine)
    }

    /// Reject vectors whose length differs from `dimensions`.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    fn check_dimensions(&self, len: usize, what: &str) -> RagResult<()> {
        match self.dimensions {
            Some(expected) if expected != len => Err(RagError::VectorIndex(format!(
                "{what} has {len} dimensions, index expects {expected}"
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::cosine()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> RagResult<Vec<RetrievedChunk>> {
        self.check_dimensions(query_embedding.len(), "query vector")?;

        let chunks = self.chunks.read();
        let mut scored: Vec<(&str, RetrievedChunk)> = chunks
            .values()
            .map(|chunk| {
                let score = compute_similarity(&chunk.embedding, query_embedding, self.metric);
                (chunk.id.as_str(), RetrievedChunk::new(chunk.text.clone(), score))
            })
            .collect();

        // ties broken by id so results are deterministic
        scored.sort_by(|(id_a, a), (id_b, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });
        scored.truncate(top_k);

        Ok(scored.into_iter().map(|(_, hit)| hit).collect())
    }

    async fn upsert_batch(&self, chunks: Vec<DocumentChunk>) -> RagResult<()> {
        for chunk in &chunks {
            self.check_dimensions(chunk.embedding.len(), &format!("chunk '{}'", chunk.id))?;
        }
        let mut store = self.chunks.write();
        for chunk in chunks {
            store.insert(chunk.id.clone(), chunk);
        }
        Ok(())
    }

    async fn count(&self) -> RagResult<usize> {
        Ok(self.chunks.read().len())
    }

    fn similarity_metric(&self) -> SimilarityMetric {
        self.metric
    }
}
