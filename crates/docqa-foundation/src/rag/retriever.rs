//! Retrieval stage
//!
//! Embeds the validated query, asks the vector index for the nearest
//! [`TOP_K`] chunks, and records them with their confidence score.

use docqa_kernel::error::RagResult;
use docqa_kernel::rag::{Embedder, PipelineState, RetrievalResult, TOP_K, VectorIndex};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Similarity-based retriever over an [`Embedder`] and a [`VectorIndex`].
///
/// Chunks are kept in the order the index returned them and their scores
/// are not rescaled. Embedding and index failures propagate unchanged.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Number of chunks requested per query.
    pub fn top_k(&self) -> usize {
        TOP_K
    }

    /// Embed `query` and fetch its nearest chunks.
    pub async fn retrieve(&self, query: &str) -> RagResult<RetrievalResult> {
        let started = Instant::now();
        let query_vector = self.embedder.embed(query).await?;
        let mut chunks = self.index.search(&query_vector, TOP_K).await?;
        chunks.truncate(TOP_K);

        let result = RetrievalResult::from_chunks(chunks);
        info!(
            chunks = result.len(),
            confidence = result.confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "retrieval completed"
        );
        Ok(result)
    }

    /// Run the stage: `Validated -> Retrieved`.
    pub async fn run(&self, state: &mut PipelineState) -> RagResult<()> {
        debug!(query_len = state.query().len(), top_k = TOP_K, "retrieving context");
        let result = self.retrieve(state.query()).await?;
        state.record_retrieval(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_kernel::error::RagError;
    use docqa_kernel::rag::{
        DocumentChunk, MessageContent, PipelineStage, RetrievedChunk, SimilarityMetric,
    };
    use parking_lot::Mutex;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Returns canned hits and records the `top_k` it was asked for.
    struct ScriptedIndex {
        hits: Vec<RetrievedChunk>,
        requested_k: Mutex<Option<usize>>,
    }

    impl ScriptedIndex {
        fn new(scores: &[f32]) -> Self {
            Self {
                hits: scores
                    .iter()
                    .enumerate()
                    .map(|(i, s)| RetrievedChunk::new(format!("chunk {i}"), *s))
                    .collect(),
                requested_k: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl VectorIndex for ScriptedIndex {
        async fn search(&self, _q: &[f32], top_k: usize) -> RagResult<Vec<RetrievedChunk>> {
            *self.requested_k.lock() = Some(top_k);
            Ok(self.hits.clone())
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

    struct DownIndex;

    #[async_trait]
    impl VectorIndex for DownIndex {
        async fn search(&self, _q: &[f32], _k: usize) -> RagResult<Vec<RetrievedChunk>> {
            Err(RagError::VectorIndex("401 Unauthorized".to_string()))
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

    fn validated_state(query: &str) -> PipelineState {
        let mut state = PipelineState::new(query);
        state.mark_validated().unwrap();
        state
    }

    #[tokio::test]
    async fn test_confidence_is_mean_of_scores() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(ScriptedIndex::new(&[0.81, 0.73, 0.65])),
        );
        let result = retriever.retrieve("q").await.unwrap();
        assert_eq!(result.confidence, 0.73);
        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn test_requests_fixed_top_k() {
        let index = Arc::new(ScriptedIndex::new(&[0.5]));
        let retriever = Retriever::new(Arc::new(FixedEmbedder), index.clone());
        retriever.retrieve("q").await.unwrap();
        assert_eq!(*index.requested_k.lock(), Some(3));
    }

    #[tokio::test]
    async fn test_truncates_oversized_index_response() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(ScriptedIndex::new(&[0.9, 0.8, 0.7, 0.6, 0.5])),
        );
        let result = retriever.retrieve("q").await.unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.confidence, 0.8);
    }

    #[tokio::test]
    async fn test_index_order_and_scores_pass_through() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(ScriptedIndex::new(&[0.2, 0.9, 0.4])),
        );
        let result = retriever.retrieve("q").await.unwrap();
        let scores: Vec<f32> = result.chunks.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![0.2, 0.9, 0.4]);
    }

    #[tokio::test]
    async fn test_empty_index_yields_zero_confidence() {
        let retriever =
            Retriever::new(Arc::new(FixedEmbedder), Arc::new(ScriptedIndex::new(&[])));
        let mut state = validated_state("q");
        retriever.run(&mut state).await.unwrap();

        assert_eq!(state.stage(), PipelineStage::Retrieved);
        assert_eq!(state.retrieval().unwrap().confidence, 0.0);
        assert!(state.retrieval().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_appends_retrieval_message() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(ScriptedIndex::new(&[0.9, 0.8, 0.7])),
        );
        let mut state = validated_state("q");
        retriever.run(&mut state).await.unwrap();

        match &state.log().last().unwrap().content {
            MessageContent::Retrieval(outcome) => {
                assert_eq!(outcome.documents.len(), 3);
                assert_eq!(outcome.retrieval_confidence, 0.8);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_index_failure_propagates() {
        let retriever = Retriever::new(Arc::new(FixedEmbedder), Arc::new(DownIndex));
        let mut state = validated_state("q");
        let err = retriever.run(&mut state).await.unwrap_err();

        assert!(err.is_retrieval_failure());
        assert_eq!(state.stage(), PipelineStage::Validated);
    }
}
