//! Question-answering pipeline
//!
//! A linear state machine over one request:
//!
//! ```text
//! Start --validate--> Validated --retrieve--> Retrieved --generate--> Generated --> End
//!   \________________________ blank query ____________________________________/
//! ```
//!
//! The orchestrator only forwards [`PipelineState`] between stages. It never
//! reads message content itself and performs no retries.

use super::generator::AnswerGenerator;
use super::retriever::Retriever;
use super::validator::QueryValidator;
use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::{
    Embedder, LanguageModel, PipelineStage, PipelineState, RetrievalResult, RetrievedChunk,
    VectorIndex,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Final result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Model completion, or the rejection message when validation failed
    pub answer: String,
    /// Retrieved chunks; empty with zero confidence when validation failed
    pub retrieval: RetrievalResult,
    /// Always [`PipelineStage::End`]
    pub stage: PipelineStage,
    /// False when the query was rejected before retrieval
    pub validated: bool,
    /// Final state, message log included
    pub state: PipelineState,
}

impl PipelineOutput {
    fn from_state(state: PipelineState) -> RagResult<Self> {
        let answer = state
            .answer()
            .map(str::to_string)
            .ok_or_else(|| RagError::Internal("pipeline finished without an answer".to_string()))?;
        Ok(Self {
            answer,
            retrieval: state.retrieval().cloned().unwrap_or_default(),
            stage: state.stage(),
            validated: !state.is_rejected(),
            state,
        })
    }

    pub fn confidence(&self) -> f32 {
        self.retrieval.confidence
    }

    /// Convert into the wire shape returned by `POST /query`.
    pub fn into_response(self) -> QueryResponse {
        QueryResponse {
            answer: AnswerBody {
                ai_response: self.answer,
                confidence_score: self.retrieval.confidence,
                retrieved_chunks: self.retrieval.chunks,
            },
        }
    }
}

/// Response body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: AnswerBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerBody {
    pub ai_response: String,
    pub retrieved_chunks: Vec<RetrievedChunk>,
    pub confidence_score: f32,
}

/// The validate → retrieve → generate orchestrator.
///
/// Cheap to clone; every clone shares the same provider handles. Each call
/// to [`RagPipeline::run`] owns its own state, so concurrent runs need no
/// locking.
#[derive(Clone)]
pub struct RagPipeline {
    validator: QueryValidator,
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, generator: AnswerGenerator) -> Self {
        Self {
            validator: QueryValidator::new(),
            retriever,
            generator,
        }
    }

    /// Wire the default stages directly over provider handles.
    pub fn from_providers(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self::new(Retriever::new(embedder, index), AnswerGenerator::new(model))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn generator(&self) -> &AnswerGenerator {
        &self.generator
    }

    /// Answer `query`.
    ///
    /// A blank query ends the run with the rejection message and makes no
    /// external calls. Retrieval and generation errors propagate unchanged
    /// and no partial answer is produced.
    pub async fn run(&self, query: impl Into<String>) -> RagResult<PipelineOutput> {
        let mut state = PipelineState::new(query);
        self.drive(&mut state).await?;
        PipelineOutput::from_state(state)
    }

    /// Advance `state` from `Start` to `End`.
    pub async fn drive(&self, state: &mut PipelineState) -> RagResult<()> {
        let started = Instant::now();
        debug!(query_len = state.query().len(), "pipeline started");

        let outcome = self.validator.validate(state)?;
        if outcome.is_rejected() {
            info!(
                stage = %state.stage(),
                validated = false,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "pipeline finished"
            );
            return Ok(());
        }

        if let Err(err) = self.retriever.run(state).await {
            warn!(stage = %state.stage(), error = %err, "retrieval failed");
            return Err(err);
        }
        if let Err(err) = self.generator.run(state).await {
            warn!(stage = %state.stage(), error = %err, "generation failed");
            return Err(err);
        }
        state.finish()?;

        info!(
            stage = %state.stage(),
            validated = true,
            confidence = state.retrieval().map(|r| r.confidence).unwrap_or_default(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let output = PipelineOutput {
            answer: "Agents act.".to_string(),
            retrieval: RetrievalResult::from_chunks(vec![RetrievedChunk::new("a", 0.5)]),
            stage: PipelineStage::End,
            validated: true,
            state: PipelineState::new("q"),
        };

        let value = serde_json::to_value(output.into_response()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "answer": {
                    "ai_response": "Agents act.",
                    "retrieved_chunks": [{"content": "a", "score": 0.5}],
                    "confidence_score": 0.5
                }
            })
        );
    }

    #[test]
    fn test_output_requires_answer() {
        let err = PipelineOutput::from_state(PipelineState::new("q")).unwrap_err();
        assert!(matches!(err, RagError::Internal(_)));
    }
}
