//! Error types for the answer pipeline.

use profchat_protocol::{ErrorKind, TranscriptError};
use thiserror::Error;

/// Errors returned while answering a chat request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The transcript cannot be answered.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The embedding service failed.
    #[error("embedding failed: {0}")]
    Embedding(String),
    /// The vector index query failed.
    #[error("vector query failed: {0}")]
    VectorQuery(String),
    /// The generation stream could not be started.
    #[error("generation failed: {0}")]
    Generation(String),
    /// The generation stream broke after output started.
    #[error("stream interrupted: {0}")]
    Stream(String),
}

impl PipelineError {
    /// Coarse classification used at the HTTP boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InputValidation,
            PipelineError::Embedding(_)
            | PipelineError::VectorQuery(_)
            | PipelineError::Generation(_) => ErrorKind::UpstreamFailure,
            PipelineError::Stream(_) => ErrorKind::StreamingFailure,
        }
    }
}

impl From<TranscriptError> for PipelineError {
    fn from(err: TranscriptError) -> Self {
        PipelineError::InvalidInput(err.to_string())
    }
}

/// Errors raised while building the service clients at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    /// An LLM provider could not be constructed.
    #[error("failed to build {model} provider: {message}")]
    Provider { model: String, message: String },
    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// The index data-plane host could not be resolved.
    #[error("failed to resolve index '{index}': {message}")]
    IndexResolve { index: String, message: String },
}
