//! Embedding and generation backed by an `autoagents-llm` provider.

use crate::error::PipelineError;
use crate::services::{DeltaStream, Embedder, Generator};
use async_trait::async_trait;
use autoagents_llm::LLMProvider;
use autoagents_llm::chat::{ChatMessage, ChatRole, MessageType};
use futures_util::TryStreamExt;
use log::debug;
use profchat_protocol::{Role, Turn};
use std::sync::Arc;

/// [`Embedder`] over the provider's embedding endpoint.
#[derive(Clone)]
pub struct LlmEmbedder {
    llm: Arc<dyn LLMProvider>,
}

impl LlmEmbedder {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Embedder for LlmEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let vectors = self
            .llm
            .embed(vec![text.to_string()])
            .await
            .map_err(|err| PipelineError::Embedding(err.to_string()))?;
        let vector = vectors
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| PipelineError::Embedding("provider returned no embedding".into()))?;
        Ok(vector)
    }
}

/// [`Generator`] over the provider's streaming chat endpoint.
#[derive(Clone)]
pub struct LlmGenerator {
    llm: Arc<dyn LLMProvider>,
}

impl LlmGenerator {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn stream_generate(&self, history: Vec<Turn>) -> Result<DeltaStream, PipelineError> {
        let messages: Vec<ChatMessage> = history.into_iter().map(to_chat_message).collect();
        debug!("opening chat stream (messages={})", messages.len());
        let stream = self
            .llm
            .chat_stream(&messages, None)
            .await
            .map_err(|err| PipelineError::Generation(err.to_string()))?;
        Ok(Box::pin(
            stream.map_err(|err| PipelineError::Stream(err.to_string())),
        ))
    }
}

fn to_chat_message(turn: Turn) -> ChatMessage {
    let role = match turn.role {
        Role::User => ChatRole::User,
        Role::Model => ChatRole::Assistant,
    };
    ChatMessage {
        role,
        message_type: MessageType::Text,
        content: turn.content,
    }
}
