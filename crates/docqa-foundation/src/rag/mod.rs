//! RAG implementations
//!
//! Pipeline stages and orchestrator, vector index backends, and the offline
//! ingestion path, built on the contracts in docqa-kernel.

pub mod generator;
pub mod ingest;
pub mod loaders;
pub mod pinecone;
pub mod pinecone_control;
pub mod pipeline;
pub mod retriever;
pub mod similarity;
pub mod splitter;
pub mod validator;
pub mod vector_store;

pub use generator::{AnswerGenerator, build_prompt, render_context};
pub use ingest::{IngestReport, IngestionJob};
#[cfg(feature = "pdf")]
pub use loaders::PdfLoader;
pub use loaders::{DirectoryLoader, DocumentLoader, LoaderError, MarkdownLoader, TextLoader};
pub use pinecone::{PineconeConfig, PineconeIndex};
pub use pinecone_control::{
    ControlPlaneConfig, IndexDescription, IndexSpec, PineconeControlPlane,
};
pub use pipeline::{AnswerBody, PipelineOutput, QueryResponse, RagPipeline};
pub use retriever::Retriever;
pub use similarity::compute_similarity;
pub use splitter::{RecursiveTextSplitter, SplitterConfig};
pub use validator::QueryValidator;
pub use vector_store::InMemoryVectorIndex;

// Re-export kernel types for convenience
pub use docqa_kernel::rag::{
    DocumentChunk, PipelineStage, PipelineState, RetrievalResult, RetrievedChunk,
    SimilarityMetric, VectorIndex,
};
