//! Post-retrieval filtering of index matches.

use log::debug;
use profchat_config::RetrievalConfig;
use profchat_protocol::RetrievalMatch;
use std::collections::HashSet;

/// Filters applied to matches before they reach the prompt.
///
/// The default keeps everything the index returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalPolicy {
    /// Drop matches scoring below this value.
    pub min_score: Option<f32>,
    /// Keep only the first match per document id.
    pub dedupe_by_id: bool,
}

impl RetrievalPolicy {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            min_score: config.min_score,
            dedupe_by_id: config.dedupe_by_id,
        }
    }

    /// Filter matches, preserving the order the index returned them in.
    pub fn apply(&self, matches: Vec<RetrievalMatch>) -> Vec<RetrievalMatch> {
        let before = matches.len();
        let mut seen = HashSet::new();
        let kept: Vec<_> = matches
            .into_iter()
            .filter(|found| self.min_score.is_none_or(|min| found.score >= min))
            .filter(|found| !self.dedupe_by_id || seen.insert(found.id.clone()))
            .collect();
        if kept.len() != before {
            debug!(
                "retrieval policy dropped matches (before={}, after={})",
                before,
                kept.len()
            );
        }
        kept
    }
}
