//! Query validation stage

use docqa_kernel::error::RagResult;
use docqa_kernel::rag::{INVALID_QUERY_MESSAGE, PipelineState, ValidationOutcome};
use tracing::{debug, warn};

/// Rejects empty or whitespace-only queries.
///
/// Makes no external calls. On success the state moves to `Validated` with
/// the query untouched; on failure it moves straight to `End` with
/// [`INVALID_QUERY_MESSAGE`] as the answer.
#[derive(Debug, Clone, Default)]
pub struct QueryValidator;

impl QueryValidator {
    pub fn new() -> Self {
        Self
    }

    /// Classify a raw query without touching any state.
    pub fn check(&self, query: &str) -> ValidationOutcome {
        if query.trim().is_empty() {
            ValidationOutcome::Rejected {
                message: INVALID_QUERY_MESSAGE.to_string(),
            }
        } else {
            ValidationOutcome::Accepted
        }
    }

    /// Run the stage against `state`, returning the outcome it applied.
    pub fn validate(&self, state: &mut PipelineState) -> RagResult<ValidationOutcome> {
        debug!(query_len = state.query().len(), "validating query");
        let outcome = self.check(state.query());
        match &outcome {
            ValidationOutcome::Accepted => state.mark_validated()?,
            ValidationOutcome::Rejected { message } => {
                warn!(query_len = state.query().len(), "rejecting blank query");
                state.reject(message.clone())?;
            }
        }
        Ok(outcome)
    }
}
