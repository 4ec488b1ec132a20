//! Fake vector index.

use crate::calls::CallLog;
use async_trait::async_trait;
use parking_lot::Mutex;
use profchat_core::{PipelineError, VectorIndex, VectorQuery};
use profchat_protocol::{MatchMetadata, RetrievalMatch};
use std::sync::Arc;

/// Returns a fixed match list (truncated to `top_k`) and records queries.
#[derive(Debug, Clone)]
pub struct StaticIndex {
    matches: Vec<RetrievalMatch>,
    failure: Option<String>,
    calls: CallLog,
    pub queries: Arc<Mutex<Vec<VectorQuery>>>,
}

impl StaticIndex {
    pub fn new(matches: Vec<RetrievalMatch>, calls: CallLog) -> Self {
        Self {
            matches,
            failure: None,
            calls,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An index whose every query fails.
    pub fn failing(message: impl Into<String>, calls: CallLog) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(Vec::new(), calls)
        }
    }
}

/// Build a review match with a descriptive snippet.
pub fn review(id: &str, subject: &str, stars: f32, score: f32) -> RetrievalMatch {
    RetrievalMatch {
        id: id.to_string(),
        score,
        metadata: MatchMetadata {
            review: format!("{id} is clear and fair."),
            subject: subject.to_string(),
            stars,
        },
    }
}

#[async_trait]
impl VectorIndex for StaticIndex {
    async fn query(&self, query: VectorQuery) -> Result<Vec<RetrievalMatch>, PipelineError> {
        self.calls.record("query");
        let top_k = query.top_k;
        self.queries.lock().push(query);
        if let Some(message) = &self.failure {
            return Err(PipelineError::VectorQuery(message.clone()));
        }
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }
}
