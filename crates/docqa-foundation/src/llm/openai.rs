//! OpenAI-compatible embedding and chat adapters
//!
//! Both adapters wrap `async-openai`, so any server speaking the OpenAI wire
//! format can be targeted through `base_url` (a local sentence-transformers
//! server, vLLM, Ollama, Azure deployments).
//!
//! ```rust,ignore
//! use docqa_foundation::llm::openai::{OpenAiChatModel, OpenAiConfig, OpenAiEmbedder};
//!
//! let embedder = OpenAiEmbedder::new(
//!     OpenAiConfig::new("sk-xxx").with_model("text-embedding-3-small"),
//!     768,
//! );
//! let model = OpenAiChatModel::new(OpenAiConfig::new("sk-xxx").with_model("gpt-4o-mini"));
//! ```

use async_openai::{
    Client,
    config::OpenAIConfig as AsyncOpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs,
    },
};
use async_trait::async_trait;
use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::{CompletionRequest, Embedder, LanguageModel};
use tracing::debug;

/// Connection settings shared by both adapters.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// `None` targets api.openai.com
    pub base_url: Option<String>,
    pub org_id: Option<String>,
    pub model: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            org_id: None,
            model: String::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn client(&self) -> Client<AsyncOpenAIConfig> {
        let mut config = AsyncOpenAIConfig::new().with_api_key(&self.api_key);
        if let Some(ref base_url) = self.base_url {
            config = config.with_api_base(base_url.trim_end_matches('/'));
        }
        if let Some(ref org_id) = self.org_id {
            config = config.with_org_id(org_id);
        }
        Client::with_config(config)
    }
}

/// Render an `async-openai` error as a one-line message.
fn describe_error(err: OpenAIError) -> String {
    match err {
        OpenAIError::ApiError(api_err) => match api_err.code {
            Some(code) => format!("{} ({code})", api_err.message),
            None => api_err.message,
        },
        OpenAIError::Reqwest(e) if e.is_timeout() => format!("request timed out: {e}"),
        OpenAIError::Reqwest(e) => format!("network error: {e}"),
        other => other.to_string(),
    }
}

/// [`Embedder`] over the `/embeddings` endpoint.
///
/// The configured dimensionality is sent with every request, so models that
/// support shortening (`text-embedding-3-*`) return vectors of that size.
/// Every returned vector is checked against it.
pub struct OpenAiEmbedder {
    client: Client<AsyncOpenAIConfig>,
    config: OpenAiConfig,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAiConfig, dimensions: usize) -> Self {
        Self {
            client: config.client(),
            config,
            dimensions,
        }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    async fn request(&self, input: Vec<String>) -> RagResult<Vec<Vec<f32>>> {
        let expected = input.len();
        let dimensions = u32::try_from(self.dimensions).map_err(|_| {
            RagError::Embedding(format!("unsupported dimensions {}", self.dimensions))
        })?;
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.config.model)
            .input(input)
            .dimensions(dimensions)
            .build()
            .map_err(|e| RagError::Embedding(describe_error(e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RagError::Embedding(describe_error(e)))?;

        let mut data = response.data;
        if data.len() != expected {
            return Err(RagError::Embedding(format!(
                "expected {expected} embeddings, got {}",
                data.len()
            )));
        }
        data.sort_by_key(|d| d.index);

        let mut vectors = Vec::with_capacity(data.len());
        for item in data {
            if item.embedding.len() != self.dimensions {
                return Err(RagError::Embedding(format!(
                    "model {} returned {} dimensions, expected {}",
                    self.config.model,
                    item.embedding.len(),
                    self.dimensions
                )));
            }
            vectors.push(item.embedding);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        self.request(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| RagError::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(model = %self.config.model, inputs = texts.len(), "embedding batch");
        self.request(texts.to_vec()).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// [`LanguageModel`] over `/chat/completions`, sending the prompt as a
/// single user message.
pub struct OpenAiChatModel {
    client: Client<AsyncOpenAIConfig>,
    config: OpenAiConfig,
}

impl OpenAiChatModel {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: config.client(),
            config,
        }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(&self, request: &CompletionRequest) -> RagResult<String> {
        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(|e| RagError::LanguageModel(describe_error(e)))?
            .into();

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.config.model)
            .messages(vec![message])
            .temperature(request.temperature);
        if let Some(max_tokens) = request.max_tokens {
            builder.max_tokens(max_tokens);
        }
        let chat_request = builder
            .build()
            .map_err(|e| RagError::LanguageModel(describe_error(e)))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| RagError::LanguageModel(describe_error(e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RagError::LanguageModel("completion has no choices".to_string()))?;
        choice
            .message
            .content
            .ok_or_else(|| RagError::LanguageModel("completion has no text content".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
