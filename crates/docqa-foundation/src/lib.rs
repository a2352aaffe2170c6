//! DocQA foundation
//!
//! Concrete pipeline stages, provider adapters, and the ingestion job for
//! the contracts defined in `docqa-kernel`.

pub mod llm;
pub mod rag;

pub use rag::{PipelineOutput, QueryResponse, RagPipeline};
