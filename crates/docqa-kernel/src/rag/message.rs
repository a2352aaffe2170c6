//! Append-only message log threaded through the pipeline
//!
//! Each stage's output is a distinct variant of [`MessageContent`], so the
//! retrieval record and the final answer never share an untyped field.

use crate::rag::types::{RetrievalResult, RetrievedChunk};
use serde::{Deserialize, Serialize};

/// Author of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Output of the validation stage. Only a rejection is ever logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted,
    Rejected { message: String },
}

impl ValidationOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Output of the retrieval stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    /// Retrieved chunks, in index order
    pub documents: Vec<RetrievedChunk>,
    /// Mean chunk score rounded to two decimals
    pub retrieval_confidence: f32,
}

impl From<&RetrievalResult> for RetrievalOutcome {
    fn from(result: &RetrievalResult) -> Self {
        Self {
            documents: result.chunks.clone(),
            retrieval_confidence: result.confidence,
        }
    }
}

/// Output of the generation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub answer: String,
}

/// Payload of a log entry, one variant per producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Query { text: String },
    Validation(ValidationOutcome),
    Retrieval(RetrievalOutcome),
    Generation(GenerationOutcome),
}

/// One entry in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn query(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Query { text: text.into() },
        }
    }

    pub fn validation(outcome: ValidationOutcome) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Validation(outcome),
        }
    }

    pub fn retrieval(outcome: RetrievalOutcome) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Retrieval(outcome),
        }
    }

    pub fn generation(answer: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Generation(GenerationOutcome {
                answer: answer.into(),
            }),
        }
    }

    /// Plain text view of the entry, if it has one.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Query { text } => Some(text),
            MessageContent::Validation(ValidationOutcome::Rejected { message }) => Some(message),
            MessageContent::Generation(outcome) => Some(&outcome.answer),
            MessageContent::Validation(ValidationOutcome::Accepted)
            | MessageContent::Retrieval(_) => None,
        }
    }
}

/// Ordered log that only supports appending.
///
/// Index 0 is always the original user query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// Start a log with the user's query as its first entry.
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::query(query)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}
