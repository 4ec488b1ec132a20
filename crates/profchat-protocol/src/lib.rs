//! Wire protocol types shared by the profchat server and clients.

mod transcript;

pub use transcript::{TranscriptError, append_delta, split_query};

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Header carrying the [`ErrorKind`] of a failed chat request.
pub const ERROR_KIND_HEADER: &str = "x-error-kind";

/// Speaker role for a transcript turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User-authored turn.
    User,
    /// Model-authored turn.
    #[serde(alias = "assistant")]
    Model,
}

impl Role {
    /// Return the role as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single entry of a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    /// Role that produced the turn.
    pub role: Role,
    /// Turn content (markdown for model turns).
    #[serde(default)]
    pub content: String,
}

impl Turn {
    /// Build a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build a model turn.
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

/// Metadata stored alongside each review vector in the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MatchMetadata {
    /// Review text snippet.
    #[serde(default, rename = "content", deserialize_with = "null_as_default")]
    pub review: String,
    /// Subject or department taught.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    /// Star rating; numeric strings are accepted, anything else reads as 0.
    #[serde(default, deserialize_with = "lenient_stars")]
    pub stars: f32,
}

/// Nearest-neighbor result returned by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalMatch {
    /// Document identifier (the professor's name).
    pub id: String,
    /// Similarity score reported by the index.
    #[serde(default)]
    pub score: f32,
    /// Document metadata.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: MatchMetadata,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_stars<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stars {
        Number(f32),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Stars::deserialize(deserializer)? {
        Stars::Number(stars) => stars,
        Stars::Text(text) => text.trim().parse().unwrap_or_default(),
        Stars::Other(_) => 0.0,
    })
}

/// Coarse classification of a failed chat request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The transcript was malformed or its last turn unusable.
    InputValidation,
    /// An embedding, index, or generation call failed.
    UpstreamFailure,
    /// The generation stream broke after output started.
    StreamingFailure,
}

impl ErrorKind {
    /// Return the snake_case name used in the error header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InputValidation => "input_validation",
            ErrorKind::UpstreamFailure => "upstream_failure",
            ErrorKind::StreamingFailure => "streaming_failure",
        }
    }

    /// Parse the header value produced by [`ErrorKind::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "input_validation" => Some(ErrorKind::InputValidation),
            "upstream_failure" => Some(ErrorKind::UpstreamFailure),
            "streaming_failure" => Some(ErrorKind::StreamingFailure),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, MatchMetadata, RetrievalMatch, Role, Turn};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn turn_roles_use_wire_names() {
        let turns = vec![Turn::user("hi"), Turn::model("hello")];
        let value = serde_json::to_value(&turns).expect("serialize");
        assert_eq!(
            value,
            json!([
                { "role": "user", "content": "hi" },
                { "role": "model", "content": "hello" }
            ])
        );
    }

    #[test]
    fn assistant_is_accepted_as_model_alias() {
        let turn: Turn =
            serde_json::from_value(json!({ "role": "assistant", "content": "x" })).expect("turn");
        assert_eq!(turn.role, Role::Model);
    }

    #[test]
    fn missing_content_decodes_as_empty() {
        let turn: Turn = serde_json::from_value(json!({ "role": "user" })).expect("turn");
        assert_eq!(turn.content, "");
    }

    #[test]
    fn retrieval_match_reads_index_metadata_names() {
        let value = json!({
            "id": "Dr. Ada Lovelace",
            "score": 0.91,
            "metadata": { "content": "Clear lectures.", "subject": "Mathematics", "stars": 5 }
        });
        let matched: RetrievalMatch = serde_json::from_value(value).expect("match");
        assert_eq!(matched.metadata.review, "Clear lectures.");
        assert_eq!(matched.metadata.subject, "Mathematics");
        assert_eq!(matched.metadata.stars, 5.0);
    }

    #[test]
    fn retrieval_match_tolerates_missing_metadata() {
        let matched: RetrievalMatch =
            serde_json::from_value(json!({ "id": "Prof X", "score": 0.2 })).expect("match");
        assert_eq!(matched.metadata.review, "");
        assert_eq!(matched.metadata.stars, 0.0);
    }

    #[test]
    fn retrieval_match_tolerates_null_metadata() {
        let matched: RetrievalMatch =
            serde_json::from_value(json!({ "id": "Prof X", "score": 0.2, "metadata": null }))
                .expect("match");
        assert_eq!(matched.metadata, MatchMetadata::default());
    }

    #[test]
    fn odd_metadata_values_do_not_fail_the_match() {
        let value = json!({
            "id": "Prof Y",
            "score": 0.4,
            "metadata": { "content": null, "subject": "Biology", "stars": "4.5" }
        });
        let matched: RetrievalMatch = serde_json::from_value(value).expect("match");
        assert_eq!(matched.metadata.review, "");
        assert_eq!(matched.metadata.stars, 4.5);

        for stars in [json!("five"), json!(null), json!([5]), json!({ "value": 5 })] {
            let matched: RetrievalMatch = serde_json::from_value(
                json!({ "id": "Prof Z", "metadata": { "stars": stars } }),
            )
            .expect("match");
            assert_eq!(matched.metadata.stars, 0.0);
        }
    }

    #[test]
    fn error_kind_round_trips_through_header_value() {
        for kind in [
            ErrorKind::InputValidation,
            ErrorKind::UpstreamFailure,
            ErrorKind::StreamingFailure,
        ] {
            assert_eq!(ErrorKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ErrorKind::parse("teapot"), None);
    }
}
