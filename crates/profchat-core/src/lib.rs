//! Retrieval-augmented answer pipeline for profchat.
//!
//! This crate owns the capability traits for the three hosted services
//! (embedding, vector index, generation), the adapters that talk to them,
//! and the `RagPipeline` that sequences a chat request through them.

pub mod error;
pub mod pipeline;
pub mod policy;
pub mod prompt;
pub mod providers;
pub mod services;

pub use error::{PipelineError, SetupError};
pub use pipeline::{PipelineOptions, PreparedRequest, RagPipeline};
pub use policy::RetrievalPolicy;
pub use prompt::DEFAULT_SYSTEM_PROMPT;
pub use providers::{LlmEmbedder, LlmGenerator, PineconeIndex};
/// Capability traits and the bundle built at startup.
pub use services::{DeltaStream, Embedder, Generator, Services, VectorIndex, VectorQuery};
