//! DocQA kernel
//!
//! Contracts and data types for answering questions about a fixed document
//! corpus: the [`rag::Embedder`], [`rag::VectorIndex`] and
//! [`rag::LanguageModel`] seams, the retrieval data model, and the
//! request-scoped [`rag::PipelineState`]. Implementations live in
//! `docqa-foundation`.

pub mod error;
pub mod rag;

#[cfg(feature = "config")]
pub mod config;

pub use error::{RagError, RagResult};
pub use rag::{Embedder, LanguageModel, VectorIndex};
