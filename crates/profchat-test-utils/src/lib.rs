//! Test helpers shared across profchat crates.

pub mod calls;
pub mod index;
pub mod llm;

pub use calls::CallLog;
pub use index::{StaticIndex, review};
pub use llm::{EmbeddingLLM, FailingLLM, ScriptedLLM};

use autoagents_llm::LLMProvider;
use profchat_core::{LlmEmbedder, LlmGenerator, Services};
use std::sync::Arc;

/// Wire fake providers into a [`Services`] bundle through the real adapters.
pub fn fake_services(
    embedding: impl LLMProvider + 'static,
    index: StaticIndex,
    chat: impl LLMProvider + 'static,
) -> Services {
    Services::new(
        Arc::new(LlmEmbedder::new(Arc::new(embedding))),
        Arc::new(index),
        Arc::new(LlmGenerator::new(Arc::new(chat))),
    )
}
