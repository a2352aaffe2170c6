//! Request-scoped pipeline state
//!
//! [`PipelineState`] is created fresh for every query and owned by the one
//! in-flight request. Stages advance it through [`PipelineStage`] with the
//! transition methods below; any other order is rejected.

use crate::error::{RagError, RagResult};
use crate::rag::message::{Message, MessageLog, RetrievalOutcome, ValidationOutcome};
use crate::rag::types::RetrievalResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a request in the linear pipeline.
///
/// ```text
/// Start --validate--> Validated --retrieve--> Retrieved --generate--> Generated --> End
///   \------------------------ validation failure ------------------------------/
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PipelineStage {
    #[default]
    Start,
    Validated,
    Retrieved,
    Generated,
    End,
}

impl PipelineStage {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Start, Validated)
                | (Start, End)
                | (Validated, Retrieved)
                | (Retrieved, Generated)
                | (Generated, End)
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Start => write!(f, "Start"),
            PipelineStage::Validated => write!(f, "Validated"),
            PipelineStage::Retrieved => write!(f, "Retrieved"),
            PipelineStage::Generated => write!(f, "Generated"),
            PipelineStage::End => write!(f, "End"),
        }
    }
}

/// The single mutable object threaded through all stages of one request.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    stage: PipelineStage,
    query: String,
    retrieval: Option<RetrievalResult>,
    answer: Option<String>,
    rejected: bool,
    log: MessageLog,
}

impl PipelineState {
    /// Create a state at [`PipelineStage::Start`] holding the raw user query.
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            stage: PipelineStage::Start,
            log: MessageLog::with_query(query.clone()),
            query,
            retrieval: None,
            answer: None,
            rejected: false,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// The original, unmodified user query.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn retrieval(&self) -> Option<&RetrievalResult> {
        self.retrieval.as_ref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// True when validation short-circuited the run.
    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// `Start -> Validated`. The query passes through untouched.
    pub fn mark_validated(&mut self) -> RagResult<()> {
        self.advance(PipelineStage::Validated)
    }

    /// `Start -> End` on validation failure; the rejection message becomes the answer.
    pub fn reject(&mut self, message: impl Into<String>) -> RagResult<()> {
        self.advance(PipelineStage::End)?;
        let message = message.into();
        self.log.push(Message::validation(ValidationOutcome::Rejected {
            message: message.clone(),
        }));
        self.answer = Some(message);
        self.rejected = true;
        Ok(())
    }

    /// `Validated -> Retrieved`, logging the chunks and their confidence.
    pub fn record_retrieval(&mut self, result: RetrievalResult) -> RagResult<()> {
        self.advance(PipelineStage::Retrieved)?;
        self.log.push(Message::retrieval(RetrievalOutcome::from(&result)));
        self.retrieval = Some(result);
        Ok(())
    }

    /// `Retrieved -> Generated`, logging the model's completion verbatim.
    pub fn record_answer(&mut self, answer: impl Into<String>) -> RagResult<()> {
        self.advance(PipelineStage::Generated)?;
        let answer = answer.into();
        self.log.push(Message::generation(answer.clone()));
        self.answer = Some(answer);
        Ok(())
    }

    /// `Generated -> End`.
    pub fn finish(&mut self) -> RagResult<()> {
        self.advance(PipelineStage::End)
    }

    fn advance(&mut self, next: PipelineStage) -> RagResult<()> {
        if !self.stage.can_transition_to(next) {
            return Err(RagError::invalid_state_transition(self.stage, next));
        }
        self.stage = next;
        Ok(())
    }
}
