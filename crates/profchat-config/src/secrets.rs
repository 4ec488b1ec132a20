//! Provider credentials supplied through the process environment.

use crate::ConfigError;
use log::debug;
use std::fmt;

/// Environment variable holding the Gemini (embedding + generation) key.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable holding the Pinecone key.
pub const ENV_PINECONE_API_KEY: &str = "PINECONE_API_KEY";

/// Credentials for the hosted services. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    pub gemini_api_key: String,
    pub pinecone_api_key: String,
}

impl Secrets {
    /// Read both keys from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both keys through an arbitrary lookup, failing on the first
    /// missing or blank value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::MissingEnv(name.to_string()))
        };
        let gemini_api_key = read(ENV_GEMINI_API_KEY)?;
        let pinecone_api_key = read(ENV_PINECONE_API_KEY)?;
        debug!("provider credentials loaded from environment");
        Ok(Self {
            gemini_api_key,
            pinecone_api_key,
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("gemini_api_key", &"<redacted>")
            .field("pinecone_api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ENV_GEMINI_API_KEY, ENV_PINECONE_API_KEY, Secrets};
    use crate::ConfigError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn reads_both_keys() {
        let secrets = Secrets::from_lookup(lookup(&[
            (ENV_GEMINI_API_KEY, "g-key"),
            (ENV_PINECONE_API_KEY, " p-key "),
        ]))
        .expect("secrets");
        assert_eq!(secrets.gemini_api_key, "g-key");
        assert_eq!(secrets.pinecone_api_key, "p-key");
    }

    #[test]
    fn names_the_missing_variable() {
        let err = Secrets::from_lookup(lookup(&[(ENV_GEMINI_API_KEY, "g-key")])).unwrap_err();
        match err {
            ConfigError::MissingEnv(name) => assert_eq!(name, ENV_PINECONE_API_KEY),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = Secrets::from_lookup(lookup(&[
            (ENV_GEMINI_API_KEY, "  "),
            (ENV_PINECONE_API_KEY, "p"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(name) if name == ENV_GEMINI_API_KEY));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let secrets = Secrets {
            gemini_api_key: "g-secret".to_string(),
            pinecone_api_key: "p-secret".to_string(),
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("g-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
