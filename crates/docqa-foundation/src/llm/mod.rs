//! Language model and embedding provider adapters

pub mod openai;

pub use openai::{OpenAiChatModel, OpenAiConfig, OpenAiEmbedder};
