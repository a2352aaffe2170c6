//! Configuration loading and provider wiring shared by all commands

use anyhow::Context as _;
use docqa_foundation::llm::{OpenAiChatModel, OpenAiConfig, OpenAiEmbedder};
use docqa_foundation::rag::{
    AnswerGenerator, ControlPlaneConfig, InMemoryVectorIndex, IndexSpec, IngestionJob,
    PineconeConfig, PineconeControlPlane, PineconeIndex, RagPipeline, RecursiveTextSplitter,
    Retriever, SplitterConfig,
};
use docqa_kernel::config::{self, DocQaConfig, ENV_PREFIX, IndexBackend, IndexSettings};
use docqa_kernel::rag::{Embedder, LanguageModel, VectorIndex};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Validated configuration plus the provider handles built from it.
pub struct CliContext {
    pub config: DocQaConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl CliContext {
    /// Load defaults < file < `DOCQA_*` environment, then validate.
    ///
    /// With `bootstrap_index`, a named Pinecone index is created when the
    /// project does not have it yet.
    pub async fn load(path: Option<&Path>, bootstrap_index: bool) -> anyhow::Result<Self> {
        let path = path.map(|p| p.display().to_string());
        let config: DocQaConfig = config::load_layered(path.as_deref(), ENV_PREFIX)
            .context("failed to load configuration")?;
        Self::from_config(config, bootstrap_index).await
    }

    pub async fn from_config(config: DocQaConfig, bootstrap_index: bool) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;
        let embedder = build_embedder(&config);
        let index = build_index(&config, bootstrap_index).await?;
        Ok(Self {
            config,
            embedder,
            index,
        })
    }

    pub fn ingestion_job(&self) -> anyhow::Result<IngestionJob> {
        let ingest = &self.config.ingest;
        let splitter = RecursiveTextSplitter::new(SplitterConfig::new(
            ingest.chunk_size,
            ingest.chunk_overlap,
        ))?;
        Ok(
            IngestionJob::new(self.embedder.clone(), self.index.clone())
                .with_splitter(splitter)
                .with_batch_size(ingest.batch_size),
        )
    }

    /// Build the query pipeline.
    ///
    /// The memory backend starts empty, so it is filled from
    /// `ingest.docs_dir` first when that directory exists.
    pub async fn pipeline(&self) -> anyhow::Result<RagPipeline> {
        if self.config.index.backend == IndexBackend::Memory {
            let dir = &self.config.ingest.docs_dir;
            if dir.is_dir() {
                let report = self.ingestion_job()?.run(dir).await?;
                info!(
                    documents = report.documents,
                    chunks = report.chunks,
                    "in-memory index loaded"
                );
            } else {
                warn!(dir = %dir.display(), "in-memory index is empty, docs_dir not found");
            }
        }

        let mut generator = AnswerGenerator::new(build_model(&self.config))
            .with_domain(&self.config.generation.domain)
            .with_temperature(self.config.llm.temperature);
        if let Some(max_tokens) = self.config.llm.max_tokens {
            generator = generator.with_max_tokens(max_tokens);
        }
        let retriever = Retriever::new(self.embedder.clone(), self.index.clone());
        Ok(RagPipeline::new(retriever, generator))
    }
}

fn openai_config(base_url: Option<&String>, api_key: String, model: &str) -> OpenAiConfig {
    let mut config = OpenAiConfig::new(api_key).with_model(model);
    if let Some(url) = base_url {
        config = config.with_base_url(url);
    }
    config
}

fn build_embedder(config: &DocQaConfig) -> Arc<dyn Embedder> {
    let settings = &config.embedding;
    Arc::new(OpenAiEmbedder::new(
        openai_config(
            settings.base_url.as_ref(),
            settings.resolved_api_key(),
            &settings.model,
        ),
        settings.dimensions,
    ))
}

fn build_model(config: &DocQaConfig) -> Arc<dyn LanguageModel> {
    let settings = &config.llm;
    Arc::new(OpenAiChatModel::new(openai_config(
        settings.base_url.as_ref(),
        settings.resolved_api_key(),
        &settings.model,
    )))
}

async fn build_index(
    config: &DocQaConfig,
    bootstrap: bool,
) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let settings = &config.index;
    match settings.backend {
        IndexBackend::Memory => Ok(Arc::new(
            InMemoryVectorIndex::new(settings.metric).with_dimensions(config.embedding.dimensions),
        )),
        IndexBackend::Pinecone => {
            let host = pinecone_host(config, bootstrap).await?;
            let mut pinecone = PineconeConfig::new(host, settings.resolved_api_key())
                .with_metric(settings.metric);
            if let Some(ns) = &settings.namespace {
                pinecone = pinecone.with_namespace(ns);
            }
            Ok(Arc::new(PineconeIndex::new(pinecone)?))
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn control_plane(settings: &IndexSettings) -> anyhow::Result<PineconeControlPlane> {
    let mut control = ControlPlaneConfig::new(settings.resolved_api_key());
    if let Some(url) = non_blank(&settings.control_url) {
        control = control.with_base_url(url);
    }
    Ok(PineconeControlPlane::new(control)?)
}

/// The configured host, or the host of the index named in `index.name`.
///
/// With `bootstrap` the named index is created (and awaited) when missing,
/// sized to the embedder.
async fn pinecone_host(config: &DocQaConfig, bootstrap: bool) -> anyhow::Result<String> {
    let settings = &config.index;
    let configured = non_blank(&settings.host).map(str::to_string);
    let Some(name) = non_blank(&settings.name) else {
        return configured.context("index.host is required for the pinecone backend");
    };
    if let Some(host) = configured.as_ref().filter(|_| !bootstrap) {
        return Ok(host.clone());
    }

    let control = control_plane(settings)?;
    let description = if bootstrap {
        let spec = IndexSpec::new(name, config.embedding.dimensions)
            .with_metric(settings.metric)
            .with_serverless(&settings.cloud, &settings.region);
        control.ensure_index(&spec).await?
    } else {
        control
            .describe_index(name)
            .await?
            .with_context(|| format!("pinecone index {name} not found, run `docqa ingest` first"))?
    };
    Ok(configured.unwrap_or(description.host))
}
