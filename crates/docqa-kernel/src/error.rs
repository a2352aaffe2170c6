//! Error types for the question-answering pipeline
//!
//! A single [`RagError`] covers every failure the pipeline and its
//! collaborators can surface. Stage classification helpers map variants back
//! onto the retrieval / generation failure classes callers care about.

use std::fmt;
use thiserror::Error;

/// Result alias used across the kernel contracts.
pub type RagResult<T> = Result<T, RagError>;

/// Errors produced by the pipeline, its stages, and provider adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RagError {
    /// The embedding provider failed or returned an unusable vector.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// The vector index rejected or failed a request.
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// The language model call failed.
    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stage ran against a pipeline state it does not accept.
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    /// A document could not be loaded for ingestion.
    #[error("Loader error: {0}")]
    Loader(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RagError {
    /// Create a state transition error
    pub fn invalid_state_transition(from: impl fmt::Debug, to: impl fmt::Debug) -> Self {
        Self::InvalidStateTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }

    /// True when the embedding or the index call failed.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::VectorIndex(_))
    }

    /// True when the language model call failed.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::LanguageModel(_))
    }
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for RagError {
    fn from(err: serde_json::Error) -> Self {
        RagError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagError::VectorIndex("connection refused".to_string());
        assert_eq!(err.to_string(), "Vector index error: connection refused");
    }

    #[test]
    fn test_stage_classification() {
        assert!(RagError::Embedding("x".into()).is_retrieval_failure());
        assert!(RagError::VectorIndex("x".into()).is_retrieval_failure());
        assert!(!RagError::LanguageModel("x".into()).is_retrieval_failure());

        assert!(RagError::LanguageModel("x".into()).is_generation_failure());
        assert!(!RagError::Embedding("x".into()).is_generation_failure());
        assert!(!RagError::InvalidInput("x".into()).is_generation_failure());
    }

    #[test]
    fn test_invalid_state_transition() {
        let err = RagError::invalid_state_transition("Start", "Generated");
        assert!(err.to_string().contains("Start"));
        assert!(err.to_string().contains("Generated"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: RagError = io_err.into();
        assert!(matches!(err, RagError::IoError(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
