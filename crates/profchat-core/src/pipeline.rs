//! Request sequencing: validate, embed, retrieve, assemble, generate.

use crate::error::PipelineError;
use crate::policy::RetrievalPolicy;
use crate::prompt::{DEFAULT_SYSTEM_PROMPT, assemble_history};
use crate::services::{DeltaStream, Services, VectorQuery};
use futures_util::future::ready;
use futures_util::{StreamExt, TryStreamExt};
use log::{debug, info, warn};
use profchat_config::ProfchatConfig;
use profchat_protocol::{RetrievalMatch, Turn, split_query};

/// Per-deployment knobs for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub top_k: usize,
    pub system_prompt: String,
    pub policy: RetrievalPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            policy: RetrievalPolicy::default(),
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &ProfchatConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            system_prompt: config
                .prompt
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            policy: RetrievalPolicy::from_config(&config.retrieval),
        }
    }
}

/// Everything computed before generation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Matches that survived the retrieval policy, in index order.
    pub matches: Vec<RetrievalMatch>,
    /// History handed to the generator.
    pub history: Vec<Turn>,
}

/// Retrieval-augmented responder shared by all requests.
#[derive(Clone)]
pub struct RagPipeline {
    services: Services,
    options: PipelineOptions,
}

impl RagPipeline {
    pub fn new(services: Services, options: PipelineOptions) -> Self {
        Self { services, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Validate the transcript, embed the newest turn, retrieve context and
    /// build the augmented history.
    ///
    /// Input errors are reported before any service is called.
    pub async fn prepare(&self, transcript: &[Turn]) -> Result<PreparedRequest, PipelineError> {
        let (history, query) = split_query(transcript)?;
        debug!(
            "preparing answer (turns={}, query_len={})",
            transcript.len(),
            query.content.len()
        );

        let vector = self.services.embedder.embed(&query.content).await?;
        debug!("query embedded (dims={})", vector.len());

        let matches = self
            .services
            .index
            .query(VectorQuery {
                vector,
                top_k: self.options.top_k,
                include_metadata: true,
            })
            .await?;
        let returned = matches.len();
        let matches = self.options.policy.apply(matches);
        info!(
            "retrieved context (top_k={}, returned={}, kept={})",
            self.options.top_k,
            returned,
            matches.len()
        );

        let history = assemble_history(
            &self.options.system_prompt,
            history,
            &query.content,
            &matches,
        );
        Ok(PreparedRequest { matches, history })
    }

    /// Answer a transcript as an ordered stream of non-empty text deltas.
    pub async fn respond(&self, transcript: &[Turn]) -> Result<DeltaStream, PipelineError> {
        let prepared = self.prepare(transcript).await?;
        let turns = prepared.history.len();
        let stream = self
            .services
            .generator
            .stream_generate(prepared.history)
            .await?;
        debug!("generation started (history_turns={})", turns);

        let stream = stream
            .filter(|item| ready(!matches!(item, Ok(delta) if delta.is_empty())))
            .inspect_err(|err| warn!("generation stream failed: {}", err));
        Ok(Box::pin(stream))
    }
}
