//! Adapters from the capability traits to hosted services.

mod llm;
mod pinecone;

pub use llm::{LlmEmbedder, LlmGenerator};
pub use pinecone::PineconeIndex;
