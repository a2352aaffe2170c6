//! Offline ingestion: load, split, embed, upsert
//!
//! Must run with the same [`Embedder`] model the query path uses, otherwise
//! similarity scores are meaningless.

use super::loaders::DirectoryLoader;
use super::splitter::RecursiveTextSplitter;
use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::{DocumentChunk, Embedder, VectorIndex};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Summary of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Documents produced by the loaders
    pub documents: usize,
    /// Chunks embedded and upserted
    pub chunks: usize,
    /// Vectors in the index after the run
    pub index_count: usize,
}

/// Loads a directory into a vector index.
pub struct IngestionJob {
    loader: DirectoryLoader,
    splitter: RecursiveTextSplitter,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
}

impl IngestionJob {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            loader: DirectoryLoader::new(),
            splitter: RecursiveTextSplitter::default(),
            embedder,
            index,
            batch_size: 64,
        }
    }

    pub fn with_splitter(mut self, splitter: RecursiveTextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn with_loader(mut self, loader: DirectoryLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Number of chunks embedded and upserted per request; clamped to at least 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Split every loaded document into index-ready chunks (without embeddings).
    ///
    /// Chunk ids are `"{source}#{n}"` where `n` counts chunks per source file,
    /// so markdown sections of one file never collide.
    pub fn prepare(&self, dir: &Path) -> RagResult<(usize, Vec<DocumentChunk>)> {
        split_directory(&self.loader, &self.splitter, dir)
    }

    /// Run the full job over `dir`.
    pub async fn run(&self, dir: &Path) -> RagResult<IngestReport> {
        let started = Instant::now();
        let (loader, splitter, owned_dir) =
            (self.loader.clone(), self.splitter.clone(), dir.to_path_buf());
        let (documents, mut chunks) =
            tokio::task::spawn_blocking(move || split_directory(&loader, &splitter, &owned_dir))
                .await
                .map_err(|e| RagError::Internal(format!("document loading task failed: {e}")))??;
        info!(dir = %dir.display(), documents, chunks = chunks.len(), "ingesting documents");

        let total = chunks.len();
        let mut done = 0usize;
        while !chunks.is_empty() {
            let rest = chunks.split_off(self.batch_size.min(chunks.len()));
            let mut batch = std::mem::replace(&mut chunks, rest);

            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            for (chunk, vector) in batch.iter_mut().zip(vectors) {
                chunk.embedding = vector;
            }

            let size = batch.len();
            self.index.upsert_batch(batch).await?;
            done += size;
            debug!(upserted = done, total, "batch upserted");
        }

        let index_count = self.index.count().await?;
        let report = IngestReport {
            documents,
            chunks: total,
            index_count,
        };
        info!(
            documents,
            chunks = total,
            index_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ingestion completed"
        );
        Ok(report)
    }
}

fn split_directory(
    loader: &DirectoryLoader,
    splitter: &RecursiveTextSplitter,
    dir: &Path,
) -> RagResult<(usize, Vec<DocumentChunk>)> {
    let documents = loader.load_dir(dir)?;
    let mut per_source: HashMap<String, usize> = HashMap::new();
    let mut chunks = Vec::new();

    for doc in &documents {
        let source = doc
            .metadata
            .get("source")
            .cloned()
            .unwrap_or_else(|| doc.id.clone());
        for text in splitter.split_text(&doc.text) {
            let n = per_source.entry(source.clone()).or_default();
            let mut chunk = DocumentChunk::new(format!("{source}#{n}"), text.clone(), Vec::new())
                .with_metadata("text", text)
                .with_metadata("source", source.clone())
                .with_metadata("chunk_index", n.to_string());
            for (key, value) in &doc.metadata {
                chunk
                    .metadata
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
            chunks.push(chunk);
            *n += 1;
        }
    }
    Ok((documents.len(), chunks))
}
