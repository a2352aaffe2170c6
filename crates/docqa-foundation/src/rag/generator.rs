//! Grounded answer generation
//!
//! Builds a prompt from the original query and the retrieved chunks and
//! asks the language model once. The completion is used verbatim.

use docqa_kernel::error::{RagError, RagResult};
use docqa_kernel::rag::{
    CompletionRequest, LanguageModel, MessageContent, NOT_FOUND_ANSWER, PipelineStage,
    PipelineState, RetrievedChunk,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default subject area the assistant is restricted to.
pub const DEFAULT_DOMAIN: &str = "Agentic AI";

/// Default sampling temperature for generation calls.
pub const GENERATION_TEMPERATURE: f32 = 0.1;

/// Render the grounded prompt for `query` over `context`.
///
/// `context` is the serialized chunk list exactly as it will be shown to the
/// model. The output is deterministic for identical inputs.
pub fn build_prompt(domain: &str, query: &str, context: &str) -> String {
    format!(
        "You are an assistant that answers questions exclusively about {domain}.\n\
         \n\
         Here's a question:\n\
         {query}\n\
         \n\
         Only use the below context to answer the question:\n\
         \n\
         {context}\n\
         \n\
         If the question is not related to {domain} or if the provided context doesn't \
         have the details about the question then respond with answer \"{NOT_FOUND_ANSWER}\".\n\
         \n\
         Answer:\n"
    )
}

/// Serialize retrieved chunks for embedding in the prompt.
pub fn render_context(chunks: &[RetrievedChunk]) -> RagResult<String> {
    Ok(serde_json::to_string_pretty(chunks)?)
}

/// Generation stage: one [`LanguageModel`] call per request, no retries.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
    domain: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            domain: DEFAULT_DOMAIN.to_string(),
            temperature: GENERATION_TEMPERATURE,
            max_tokens: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Build the completion request from the state's message log.
    ///
    /// The query comes from the first log entry and the context from the
    /// last one, which must be the retrieval record.
    pub fn prepare(&self, state: &PipelineState) -> RagResult<CompletionRequest> {
        if state.stage() != PipelineStage::Retrieved {
            return Err(RagError::invalid_state_transition(
                state.stage(),
                PipelineStage::Generated,
            ));
        }

        let query = match state.log().first().map(|m| &m.content) {
            Some(MessageContent::Query { text }) => text.as_str(),
            _ => {
                return Err(RagError::Internal(
                    "message log does not start with the user query".to_string(),
                ));
            }
        };
        let documents = match state.log().last().map(|m| &m.content) {
            Some(MessageContent::Retrieval(outcome)) => &outcome.documents,
            _ => {
                return Err(RagError::Internal(
                    "last log entry is not a retrieval record".to_string(),
                ));
            }
        };

        let context = render_context(documents)?;
        let mut request = CompletionRequest::new(build_prompt(&self.domain, query, &context))
            .with_temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        Ok(request)
    }

    /// Run the stage: `Retrieved -> Generated`.
    pub async fn run(&self, state: &mut PipelineState) -> RagResult<()> {
        let request = self.prepare(state)?;
        debug!(
            model = self.model.model_name(),
            prompt_len = request.prompt.len(),
            "generating answer"
        );

        let started = Instant::now();
        let answer = self.model.complete(&request).await?;
        info!(
            model = self.model.model_name(),
            answer_len = answer.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation completed"
        );

        state.record_answer(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_kernel::rag::RetrievalResult;
    use parking_lot::Mutex;

    /// Echoes a fixed answer and keeps every request it saw.
    struct RecordingModel {
        reply: String,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl RecordingModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn complete(&self, request: &CompletionRequest) -> RagResult<String> {
            self.requests.lock().push(request.clone());
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn complete(&self, _request: &CompletionRequest) -> RagResult<String> {
            Err(RagError::LanguageModel("rate limited".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn retrieved_state(query: &str, texts: &[&str]) -> PipelineState {
        let mut state = PipelineState::new(query);
        state.mark_validated().unwrap();
        let chunks = texts
            .iter()
            .map(|t| RetrievedChunk::new(*t, 0.5))
            .collect();
        state
            .record_retrieval(RetrievalResult::from_chunks(chunks))
            .unwrap();
        state
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt("Agentic AI", "What is an agent?", "[]");
        let b = build_prompt("Agentic AI", "What is an agent?", "[]");
        assert_eq!(a, b);
        assert!(a.contains("exclusively about Agentic AI"));
        assert!(a.contains("\"Not found in document\""));
        assert!(a.trim_end().ends_with("Answer:"));
    }

    #[tokio::test]
    async fn test_prompt_carries_query_and_every_chunk() {
        let model = Arc::new(RecordingModel::new("An agent plans and acts."));
        let generator = AnswerGenerator::new(model.clone());
        let mut state = retrieved_state(
            "What is an agent?",
            &["agents plan", "agents use tools", "agents reflect"],
        );

        generator.run(&mut state).await.unwrap();

        let requests = model.requests.lock();
        assert_eq!(requests.len(), 1);
        let prompt = &requests[0].prompt;
        assert!(prompt.contains("What is an agent?"));
        for text in ["agents plan", "agents use tools", "agents reflect"] {
            assert!(prompt.contains(text), "missing chunk {text}");
        }
        assert!((requests[0].temperature - 0.1).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_answer_is_used_verbatim() {
        let reply = "  Not found in document \n";
        let generator = AnswerGenerator::new(Arc::new(RecordingModel::new(reply)));
        let mut state = retrieved_state("weather?", &[]);

        generator.run(&mut state).await.unwrap();

        assert_eq!(state.answer(), Some(reply));
        assert_eq!(state.stage(), PipelineStage::Generated);
    }

    #[tokio::test]
    async fn test_custom_domain_and_max_tokens() {
        let model = Arc::new(RecordingModel::new("ok"));
        let generator = AnswerGenerator::new(model.clone())
            .with_domain("Rust tooling")
            .with_max_tokens(256);
        let mut state = retrieved_state("q", &["c"]);

        generator.run(&mut state).await.unwrap();

        let requests = model.requests.lock();
        assert!(requests[0].prompt.contains("exclusively about Rust tooling"));
        assert_eq!(requests[0].max_tokens, Some(256));
    }

    #[tokio::test]
    async fn test_rejects_state_without_retrieval() {
        let model = Arc::new(RecordingModel::new("ok"));
        let generator = AnswerGenerator::new(model.clone());
        let mut state = PipelineState::new("q");
        state.mark_validated().unwrap();

        let err = generator.run(&mut state).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidStateTransition { .. }));
        assert!(model.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let generator = AnswerGenerator::new(Arc::new(FailingModel));
        let mut state = retrieved_state("q", &["c"]);

        let err = generator.run(&mut state).await.unwrap_err();
        assert!(err.is_generation_failure());
        assert_eq!(state.stage(), PipelineStage::Retrieved);
        assert!(state.answer().is_none());
    }
}
