//! Capability traits for the hosted services and the startup bundle.

use crate::error::{PipelineError, SetupError};
use crate::providers::{LlmEmbedder, LlmGenerator, PineconeIndex};
use async_trait::async_trait;
use autoagents_llm::LLMProvider;
use autoagents_llm::backends::google::Google;
use autoagents_llm::builder::LLMBuilder;
use futures_util::Stream;
use log::info;
use profchat_config::{ProfchatConfig, Secrets};
use profchat_protocol::{RetrievalMatch, Turn};
use std::pin::Pin;
use std::sync::Arc;

/// Ordered stream of generated text deltas.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, PipelineError>> + Send>>;

#[async_trait]
/// Turns text into a dense vector.
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError>;
}

/// Nearest-neighbor request sent to the vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub include_metadata: bool,
}

#[async_trait]
/// Similarity search over the review corpus.
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` matches, best first.
    async fn query(&self, query: VectorQuery) -> Result<Vec<RetrievalMatch>, PipelineError>;
}

#[async_trait]
/// Streaming text generation over a chat history.
pub trait Generator: Send + Sync {
    async fn stream_generate(&self, history: Vec<Turn>) -> Result<DeltaStream, PipelineError>;
}

/// Service handles built once at startup and shared by every request.
#[derive(Clone)]
pub struct Services {
    pub embedder: Arc<dyn Embedder>,
    pub index: Arc<dyn VectorIndex>,
    pub generator: Arc<dyn Generator>,
}

impl Services {
    /// Bundle already-built service handles.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
        }
    }

    /// Build the Gemini and Pinecone clients described by the config.
    ///
    /// Resolves the index host through the control plane when the config
    /// does not name one.
    pub async fn from_config(
        config: &ProfchatConfig,
        secrets: &Secrets,
    ) -> Result<Self, SetupError> {
        let embedding_llm = build_gemini(&secrets.gemini_api_key, &config.models.embedding)?;
        let chat_llm = build_gemini(&secrets.gemini_api_key, &config.models.chat)?;

        let http = reqwest::Client::builder().build()?;
        let retrieval = &config.retrieval;
        let host = match retrieval.index_host.as_deref() {
            Some(host) => host.to_string(),
            None => {
                PineconeIndex::resolve_host(&http, &secrets.pinecone_api_key, &retrieval.index_name)
                    .await?
            }
        };
        let index = PineconeIndex::new(
            http,
            &host,
            secrets.pinecone_api_key.clone(),
            retrieval.namespace.clone(),
        );
        info!(
            "services ready (embedding={}, chat={}, index={}, namespace={})",
            config.models.embedding,
            config.models.chat,
            index.host(),
            retrieval.namespace
        );

        Ok(Self::new(
            Arc::new(LlmEmbedder::new(embedding_llm)),
            Arc::new(index),
            Arc::new(LlmGenerator::new(chat_llm)),
        ))
    }
}

fn build_gemini(api_key: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SetupError> {
    let llm: Arc<dyn LLMProvider> = LLMBuilder::<Google>::new()
        .api_key(api_key.to_string())
        .model(model.to_string())
        .build()
        .map_err(|err| SetupError::Provider {
            model: model.to_string(),
            message: err.to_string(),
        })?;
    Ok(llm)
}
