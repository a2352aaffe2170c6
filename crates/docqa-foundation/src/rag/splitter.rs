//! Recursive character text splitter
//!
//! Splits on the most meaningful separator present (paragraph, line, word,
//! character), merges the pieces greedily up to `chunk_size` characters, and
//! carries a tail of at most `chunk_overlap` characters into the next chunk.
//! Sizes are counted in `char`s so multi-byte text never splits mid-codepoint.

use docqa_kernel::error::{RagError, RagResult};
use std::collections::VecDeque;

/// Configuration for [`RecursiveTextSplitter`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitterConfig {
    /// Maximum number of characters per chunk
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Separators tried in order; `""` means "split into characters"
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self::new(512, 51)
    }
}

impl SplitterConfig {
    #[must_use]
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: vec!["\n\n".into(), "\n".into(), " ".into(), String::new()],
        }
    }

    #[must_use]
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }
}

/// Recursive splitter used by the ingestion job.
#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    config: SplitterConfig,
}

impl RecursiveTextSplitter {
    /// Create a splitter, rejecting a zero size or an overlap that is not
    /// smaller than the size.
    pub fn new(config: SplitterConfig) -> RagResult<Self> {
        if config.chunk_size == 0 {
            return Err(RagError::InvalidInput(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split `text` into non-empty, trimmed chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.config.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // Pick the first separator that occurs in the text; "" always matches.
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.config.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_with(&piece, remaining));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let sep_len = char_len(separator);

        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };
            if total + len + joiner > size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);
                // Drop from the front until only an overlap-sized tail remains
                // and the next piece fits.
                loop {
                    let joiner = if window.is_empty() { 0 } else { sep_len };
                    let crowded = total > 0 && total + len + joiner > size;
                    if total <= overlap && !crowded {
                        break;
                    }
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    let trailing = if window.is_empty() { 0 } else { sep_len };
                    total -= char_len(front) + trailing;
                }
            }
            let joiner = if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
            total += len + joiner;
        }
        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

impl Default for RecursiveTextSplitter {
    fn default() -> Self {
        Self {
            config: SplitterConfig::default(),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
