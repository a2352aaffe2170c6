//! RAG core data types
//!
//! Types shared by the vector index, the ingestion path, and the
//! question-answering pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One nearest-neighbour hit returned by a [`VectorIndex`](super::VectorIndex).
///
/// The score is passed through exactly as the index reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Text of the matched chunk
    pub content: String,
    /// Similarity score as defined by the index metric
    pub score: f32,
}

impl RetrievedChunk {
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            score,
        }
    }
}

/// The chunks retrieved for one query together with their aggregate confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Chunks in index order (descending relevance)
    pub chunks: Vec<RetrievedChunk>,
    /// Mean chunk score rounded to two decimals, `0.0` when empty
    pub confidence: f32,
}

impl RetrievalResult {
    /// Build a result from index hits, computing the confidence score.
    pub fn from_chunks(chunks: Vec<RetrievedChunk>) -> Self {
        let confidence = confidence_score(&chunks);
        Self { chunks, confidence }
    }

    /// A result with no chunks and zero confidence.
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            confidence: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

impl Default for RetrievalResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Arithmetic mean of the chunk scores, rounded to two decimal places.
///
/// Ties round to even (`0.625 -> 0.62`). Returns exactly `0.0` for an empty slice. The value is descriptive only;
/// it is not normalised or calibrated.
pub fn confidence_score(chunks: &[RetrievedChunk]) -> f32 {
    if chunks.is_empty() {
        return 0.0;
    }
    let sum: f64 = chunks.iter().map(|c| f64::from(c.score)).sum();
    let mean = sum / chunks.len() as f64;
    ((mean * 100.0).round_ties_even() / 100.0) as f32
}

/// A source document produced by a loader, before splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (usually the source path)
    pub id: String,
    /// Full extracted text
    pub text: String,
    /// Arbitrary metadata (source path, format, heading, ...)
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A chunk of a document with its embedding vector and metadata.
///
/// This is the unit the ingestion job upserts into a vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique identifier for this chunk
    pub id: String,
    /// The text content of this chunk
    pub text: String,
    /// The embedding vector for this chunk
    pub embedding: Vec<f32>,
    /// Arbitrary metadata (source file, chunk index, ...)
    pub metadata: HashMap<String, String>,
}

impl DocumentChunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Similarity metric used for comparing embedding vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// Cosine similarity, higher is more similar
    #[default]
    Cosine,
    /// Euclidean distance mapped to `1 / (1 + d)` so higher is still more similar
    Euclidean,
    /// Dot product, higher is more similar
    #[serde(alias = "dot", alias = "dot_product")]
    DotProduct,
}
