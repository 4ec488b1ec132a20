//! Configuration schema for profchat.

use serde::{Deserialize, Serialize};

/// Root config shared by the server and the chat client.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProfchatConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl ProfchatConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ProfchatConfigBuilder {
        ProfchatConfigBuilder::new()
    }
}

/// Builder for assembling a `ProfchatConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ProfchatConfigBuilder {
    config: ProfchatConfig,
}

impl ProfchatConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ProfchatConfig::default(),
        }
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the retrieval configuration.
    pub fn retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.config.retrieval = retrieval;
        self
    }

    /// Replace the model selection.
    pub fn models(mut self, models: ModelsConfig) -> Self {
        self.config.models = models;
        self
    }

    /// Replace the prompt configuration.
    pub fn prompt(mut self, prompt: PromptConfig) -> Self {
        self.config.prompt = prompt;
        self
    }

    /// Replace the chat client configuration.
    pub fn client(mut self, client: ClientConfig) -> Self {
        self.config.client = client;
        self
    }

    /// Finalize and return the built `ProfchatConfig`.
    pub fn build(self) -> ProfchatConfig {
        self.config
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Vector index and retrieval policy settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Number of nearest neighbors requested per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Index name, used to resolve the data-plane host when none is set.
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Data-plane host of the index (skips host resolution when set).
    #[serde(default)]
    pub index_host: Option<String>,
    /// Index namespace holding the review vectors.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Drop matches scoring below this value.
    #[serde(default)]
    pub min_score: Option<f32>,
    /// Keep only the first match per document id.
    #[serde(default)]
    pub dedupe_by_id: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            index_name: default_index_name(),
            index_host: None,
            namespace: default_namespace(),
            min_score: None,
            dedupe_by_id: false,
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_index_name() -> String {
    "rag".to_string()
}

fn default_namespace() -> String {
    "ns1".to_string()
}

/// Model names used for embedding and generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsConfig {
    #[serde(default = "default_embedding_model")]
    pub embedding: String,
    #[serde(default = "default_chat_model")]
    pub chat: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            embedding: default_embedding_model(),
            chat: default_chat_model(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_chat_model() -> String {
    "gemini-1.5-flash".to_string()
}

/// Prompt overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PromptConfig {
    /// Replaces the built-in instruction turn when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Chat client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Full URL of the chat endpoint.
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:3000/api/chat".to_string()
}
