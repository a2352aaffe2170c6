//! VectorIndex trait definition
//!
//! Defines the abstract interface for vector storage and similarity search.
//! Concrete implementations (in-memory, Pinecone) live in docqa-foundation.

use crate::error::RagResult;
use crate::rag::types::{DocumentChunk, RetrievedChunk, SimilarityMetric};
use async_trait::async_trait;

/// Abstract interface for nearest-neighbour search over embedded chunks.
///
/// Handles are created once at startup and shared read-only across
/// concurrent requests, so every method takes `&self`.
///
/// The index must contain chunks embedded with the same model and
/// dimensionality as the query path, or similarity scores are meaningless.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_kernel::rag::{DocumentChunk, VectorIndex};
///
/// index.upsert_batch(vec![DocumentChunk::new("id-1", "Agentic AI is ...", embedding)]).await?;
///
/// for hit in index.search(&query_embedding, 3).await? {
///     println!("{}: {}", hit.score, hit.content);
/// }
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return at most `top_k` chunks, ordered by descending relevance.
    ///
    /// Scores are reported in the index's own metric and must not be
    /// rescaled by callers.
    async fn search(&self, query_embedding: &[f32], top_k: usize)
    -> RagResult<Vec<RetrievedChunk>>;

    /// Insert or replace chunks keyed by their id.
    async fn upsert_batch(&self, chunks: Vec<DocumentChunk>) -> RagResult<()>;

    /// Total number of chunks stored.
    async fn count(&self) -> RagResult<usize>;

    /// Similarity metric this index was configured with.
    fn similarity_metric(&self) -> SimilarityMetric;
}
