//! Configuration models and layered config loading.
//!
//! This crate owns the profchat config schema, validation, layer merging, and
//! the environment-supplied provider credentials used by the server.

mod error;
mod loader;
mod model;
mod secrets;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
/// Provider credentials read from the process environment.
pub use secrets::{ENV_GEMINI_API_KEY, ENV_PINECONE_API_KEY, Secrets};
