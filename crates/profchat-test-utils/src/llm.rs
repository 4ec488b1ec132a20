//! Fake `autoagents-llm` providers.

use crate::calls::CallLog;
use async_trait::async_trait;
use autoagents_llm::chat::{ChatMessage, ChatProvider, ChatResponse, StructuredOutputFormat, Tool};
use autoagents_llm::completion::{CompletionProvider, CompletionRequest, CompletionResponse};
use autoagents_llm::embedding::EmbeddingProvider;
use autoagents_llm::error::LLMError;
use autoagents_llm::models::ModelsProvider;
use autoagents_llm::{LLMProvider, ToolCall};
use futures_util::Stream;
use futures_util::stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;

type TextStream = Pin<Box<dyn Stream<Item = Result<String, LLMError>> + Send>>;

#[derive(Debug, Clone)]
struct TextResponse(String);

impl std::fmt::Display for TextResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ChatResponse for TextResponse {
    fn text(&self) -> Option<String> {
        Some(self.0.clone())
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        None
    }
}

fn unsupported(what: &str) -> LLMError {
    LLMError::ProviderError(format!("{what} not scripted"))
}

/// Streams a fixed list of chunks and records the messages it was sent.
#[derive(Debug, Clone)]
pub struct ScriptedLLM {
    chunks: Vec<String>,
    fail_after: Option<usize>,
    calls: CallLog,
    pub last_messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl ScriptedLLM {
    pub fn new<I, S>(chunks: I, calls: CallLog) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            fail_after: None,
            calls,
            last_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Break the stream with an error after `count` chunks.
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

#[async_trait]
impl ChatProvider for ScriptedLLM {
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        *self.last_messages.lock() = messages.to_vec();
        Ok(Box::new(TextResponse(self.chunks.concat())))
    }

    async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<TextStream, LLMError> {
        self.calls.record("generate");
        *self.last_messages.lock() = messages.to_vec();
        let mut items: Vec<Result<String, LLMError>> = match self.fail_after {
            Some(count) => self.chunks.iter().take(count).cloned().map(Ok).collect(),
            None => self.chunks.iter().cloned().map(Ok).collect(),
        };
        if self.fail_after.is_some() {
            items.push(Err(LLMError::ProviderError("stream reset".to_string())));
        }
        Ok(Box::pin(stream::iter(items)))
    }
}

#[async_trait]
impl CompletionProvider for ScriptedLLM {
    async fn complete(
        &self,
        _req: &CompletionRequest,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<CompletionResponse, LLMError> {
        Err(unsupported("completion"))
    }
}

#[async_trait]
impl EmbeddingProvider for ScriptedLLM {
    async fn embed(&self, _input: Vec<String>) -> Result<Vec<Vec<f32>>, LLMError> {
        Err(unsupported("embedding"))
    }
}

#[async_trait]
impl ModelsProvider for ScriptedLLM {}

impl LLMProvider for ScriptedLLM {}

/// Returns the same vector for every input and records the inputs.
#[derive(Debug, Clone)]
pub struct EmbeddingLLM {
    vector: Vec<f32>,
    calls: CallLog,
    pub inputs: Arc<Mutex<Vec<String>>>,
}

impl EmbeddingLLM {
    pub fn new(vector: Vec<f32>, calls: CallLog) -> Self {
        Self {
            vector,
            calls,
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ChatProvider for EmbeddingLLM {
    async fn chat_with_tools(
        &self,
        _messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        Err(unsupported("chat"))
    }
}

#[async_trait]
impl CompletionProvider for EmbeddingLLM {
    async fn complete(
        &self,
        _req: &CompletionRequest,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<CompletionResponse, LLMError> {
        Err(unsupported("completion"))
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingLLM {
    async fn embed(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, LLMError> {
        self.calls.record("embed");
        let vectors = input.iter().map(|_| self.vector.clone()).collect();
        self.inputs.lock().extend(input);
        Ok(vectors)
    }
}

#[async_trait]
impl ModelsProvider for EmbeddingLLM {}

impl LLMProvider for EmbeddingLLM {}

/// Fails every call with the configured message.
#[derive(Debug, Clone)]
pub struct FailingLLM {
    message: String,
    calls: CallLog,
}

impl FailingLLM {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_log(message, CallLog::new())
    }

    pub fn with_log(message: impl Into<String>, calls: CallLog) -> Self {
        Self {
            message: message.into(),
            calls,
        }
    }

    fn fail(&self, call: &str) -> LLMError {
        self.calls.record(call);
        LLMError::ProviderError(self.message.clone())
    }
}

#[async_trait]
impl ChatProvider for FailingLLM {
    async fn chat_with_tools(
        &self,
        _messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        Err(self.fail("chat"))
    }

    async fn chat_stream(
        &self,
        _messages: &[ChatMessage],
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<TextStream, LLMError> {
        Err(self.fail("generate"))
    }
}

#[async_trait]
impl CompletionProvider for FailingLLM {
    async fn complete(
        &self,
        _req: &CompletionRequest,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<CompletionResponse, LLMError> {
        Err(self.fail("complete"))
    }
}

#[async_trait]
impl EmbeddingProvider for FailingLLM {
    async fn embed(&self, _input: Vec<String>) -> Result<Vec<Vec<f32>>, LLMError> {
        Err(self.fail("embed"))
    }
}

#[async_trait]
impl ModelsProvider for FailingLLM {}

impl LLMProvider for FailingLLM {}
