//! RAG (Retrieval-Augmented Generation) traits and types
//!
//! Defines the contracts for embedding, vector search and generation, plus
//! the request-scoped state the question-answering pipeline threads through
//! its stages. Concrete implementations live in docqa-foundation.

pub mod message;
pub mod provider;
pub mod state;
pub mod types;
pub mod vector_store;

pub use message::{
    GenerationOutcome, Message, MessageContent, MessageLog, RetrievalOutcome, Role,
    ValidationOutcome,
};
pub use provider::{CompletionRequest, Embedder, LanguageModel};
pub use state::{PipelineStage, PipelineState};
pub use types::{
    Document, DocumentChunk, RetrievalResult, RetrievedChunk, SimilarityMetric, confidence_score,
};
pub use vector_store::VectorIndex;

/// Number of chunks requested per query.
pub const TOP_K: usize = 3;

/// Terminal answer for an empty or blank query.
pub const INVALID_QUERY_MESSAGE: &str = "Invalid user query";

/// Literal the model is instructed to return when the context lacks an answer.
pub const NOT_FOUND_ANSWER: &str = "Not found in document";
