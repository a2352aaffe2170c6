//! Document loaders for the ingestion job
//!
//! Each loader turns one file into one or more [`Document`]s carrying a
//! `source` metadata entry. [`DirectoryLoader`] dispatches on file extension.

use docqa_kernel::error::RagError;
use docqa_kernel::rag::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from document loading.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoaderError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file contains no text after trimming
    #[error("Document is empty: {0}")]
    EmptyDocument(String),

    #[error("Failed to extract text from '{path}': {message}")]
    Extraction { path: String, message: String },

    /// A PDF was found in a build without the `pdf` feature
    #[error("Cannot load '{0}': built without the `pdf` feature")]
    PdfDisabled(String),
}

pub type LoaderResult<T> = Result<T, LoaderError>;

impl From<LoaderError> for RagError {
    fn from(err: LoaderError) -> Self {
        RagError::Loader(err.to_string())
    }
}

/// Loads documents from a single file.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> LoaderResult<Vec<Document>>;
}

fn read_non_empty(path: &Path) -> LoaderResult<String> {
    let content = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    if content.trim().is_empty() {
        return Err(LoaderError::EmptyDocument(path.display().to_string()));
    }
    Ok(content)
}

/// Plain text: one document per file.
#[derive(Debug, Clone, Default)]
pub struct TextLoader;

impl TextLoader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> LoaderResult<Vec<Document>> {
        let text = read_non_empty(path)?;
        let source = path.display().to_string();
        Ok(vec![
            Document::new(source.clone(), text)
                .with_metadata("source", source)
                .with_metadata("format", "text"),
        ])
    }
}

/// Markdown split into sections at headings up to `split_level`.
///
/// Text before the first heading becomes its own section. Each section keeps
/// its heading line so the chunk text stays self-describing.
#[derive(Debug, Clone)]
pub struct MarkdownLoader {
    pub split_level: usize,
}

impl Default for MarkdownLoader {
    fn default() -> Self {
        Self { split_level: 2 }
    }
}

impl MarkdownLoader {
    #[must_use]
    pub fn new(split_level: usize) -> Self {
        Self { split_level }
    }

    /// `"## Foo"` -> `Some(2)`; `"#Foo"` is not a heading.
    fn heading_level(line: &str) -> Option<usize> {
        let trimmed = line.trim_start();
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        if level == 0 {
            return None;
        }
        let rest = &trimmed[level..];
        (rest.is_empty() || rest.starts_with(' ')).then_some(level)
    }

    fn section(source: &str, index: usize, heading: Option<&str>, body: &str) -> Document {
        let mut doc = Document::new(format!("{source}:s{index}"), body.trim())
            .with_metadata("source", source)
            .with_metadata("format", "markdown")
            .with_metadata("section_index", index.to_string());
        if let Some(heading) = heading {
            doc = doc.with_metadata("heading", heading);
        }
        doc
    }
}

impl DocumentLoader for MarkdownLoader {
    fn load(&self, path: &Path) -> LoaderResult<Vec<Document>> {
        let content = read_non_empty(path)?;
        let source = path.display().to_string();

        let mut documents = Vec::new();
        let mut heading: Option<String> = None;
        let mut body = String::new();

        for line in content.lines() {
            let splits_here = Self::heading_level(line).is_some_and(|l| l <= self.split_level);
            if splits_here {
                if !body.trim().is_empty() {
                    documents.push(Self::section(
                        &source,
                        documents.len(),
                        heading.as_deref(),
                        &body,
                    ));
                }
                heading = Some(line.trim_start().trim_start_matches('#').trim().to_string())
                    .filter(|h| !h.is_empty());
                body.clear();
            }
            body.push_str(line);
            body.push('\n');
        }
        if !body.trim().is_empty() {
            documents.push(Self::section(
                &source,
                documents.len(),
                heading.as_deref(),
                &body,
            ));
        }

        if documents.is_empty() {
            return Err(LoaderError::EmptyDocument(source));
        }
        Ok(documents)
    }
}

/// PDF text extraction: one document per non-blank page.
///
/// Pages carry a zero-based `page` metadata entry, so chunks can be traced
/// back to where they came from.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Default)]
pub struct PdfLoader;

#[cfg(feature = "pdf")]
impl PdfLoader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "pdf")]
impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> LoaderResult<Vec<Document>> {
        let source = path.display().to_string();
        let pages =
            pdf_extract::extract_text_by_pages(path).map_err(|e| LoaderError::Extraction {
                path: source.clone(),
                message: e.to_string(),
            })?;

        let documents: Vec<Document> = pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(page, text)| {
                Document::new(format!("{source}:p{page}"), text)
                    .with_metadata("source", source.clone())
                    .with_metadata("format", "pdf")
                    .with_metadata("page", page.to_string())
            })
            .collect();
        if documents.is_empty() {
            return Err(LoaderError::EmptyDocument(source));
        }
        Ok(documents)
    }
}

/// Loads every supported file directly inside a directory.
///
/// Not recursive. Files are visited in name order so repeated runs produce
/// the same chunk ids. Unsupported extensions and empty files are skipped.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLoader {
    text: TextLoader,
    markdown: MarkdownLoader,
    #[cfg(feature = "pdf")]
    pdf: PdfLoader,
}

impl DirectoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_markdown_split_level(mut self, split_level: usize) -> Self {
        self.markdown = MarkdownLoader::new(split_level);
        self
    }

    fn loader_for(&self, path: &Path) -> LoaderResult<&dyn DocumentLoader> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let loader: &dyn DocumentLoader = match ext.as_str() {
            "txt" => &self.text,
            "md" | "markdown" => &self.markdown,
            #[cfg(feature = "pdf")]
            "pdf" => &self.pdf,
            #[cfg(not(feature = "pdf"))]
            "pdf" => return Err(LoaderError::PdfDisabled(path.display().to_string())),
            _ => return Err(LoaderError::UnsupportedFormat(path.display().to_string())),
        };
        Ok(loader)
    }

    /// List the regular files in `dir`, sorted by name.
    pub fn files(dir: &Path) -> LoaderResult<Vec<PathBuf>> {
        let io_err = |source: std::io::Error| LoaderError::Io {
            path: dir.display().to_string(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load every supported file in `dir`.
    ///
    /// A PDF in a build without the `pdf` feature is an error rather than a
    /// silent skip.
    pub fn load_dir(&self, dir: &Path) -> LoaderResult<Vec<Document>> {
        let mut documents = Vec::new();
        for path in Self::files(dir)? {
            let loader = match self.loader_for(&path) {
                Ok(loader) => loader,
                Err(LoaderError::UnsupportedFormat(_)) => {
                    debug!(path = %path.display(), "skipping unsupported file");
                    continue;
                }
                Err(err) => return Err(err),
            };
            match loader.load(&path) {
                Ok(docs) => {
                    debug!(path = %path.display(), documents = docs.len(), "loaded file");
                    documents.extend(docs);
                }
                Err(LoaderError::EmptyDocument(_)) => {
                    warn!(path = %path.display(), "skipping empty document");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(documents)
    }
}
