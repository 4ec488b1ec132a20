//! Conversation state for the chat client.
//!
//! Holds the transcript shown to the user and guards submissions with an
//! in-flight sequence token so only one request streams at a time.

use log::debug;
use profchat_protocol::{Turn, append_delta};
use thiserror::Error;

/// Opening model turn of every conversation.
pub const GREETING: &str =
    "Hi! I'm the Rate My Professor support assistant. How can I help you today?";

/// Reasons a submission was not started.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The input was blank.
    #[error("message is empty")]
    Empty,
    /// A reply is still streaming.
    #[error("a reply is still streaming")]
    Busy,
}

/// Request produced by [`ChatSession::begin_submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Token that tags every delta of this reply.
    pub seq: u64,
    /// Transcript to POST, ending with the new user turn.
    pub transcript: Vec<Turn>,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    turns: Vec<Turn>,
    in_flight: Option<u64>,
    next_seq: u64,
    last_error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::model(GREETING)],
            in_flight: None,
            next_seq: 1,
            last_error: None,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True once the user has sent anything.
    pub fn has_started(&self) -> bool {
        self.turns.len() > 1
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Append the user turn and an empty model placeholder.
    ///
    /// The returned transcript excludes the placeholder.
    pub fn begin_submission(&mut self, input: &str) -> Result<Submission, SubmitError> {
        if input.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.in_flight.is_some() {
            return Err(SubmitError::Busy);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        self.last_error = None;

        self.turns.push(Turn::user(input));
        let transcript = self.turns.clone();
        self.turns.push(Turn::model(""));
        debug!(
            "submission started (seq={}, turns={})",
            seq,
            transcript.len()
        );
        Ok(Submission { seq, transcript })
    }

    /// Extend the streaming reply. Returns false for stale sequences.
    pub fn apply_delta(&mut self, seq: u64, delta: &str) -> bool {
        if self.in_flight != Some(seq) {
            debug!("dropping stale delta (seq={})", seq);
            return false;
        }
        self.turns = append_delta(std::mem::take(&mut self.turns), delta);
        true
    }

    /// Mark the reply complete.
    pub fn finish(&mut self, seq: u64) -> bool {
        if self.in_flight != Some(seq) {
            return false;
        }
        self.in_flight = None;
        true
    }

    /// Mark the reply failed, keeping whatever content already arrived.
    pub fn fail(&mut self, seq: u64, message: impl Into<String>) -> bool {
        if self.in_flight != Some(seq) {
            return false;
        }
        self.in_flight = None;
        self.last_error = Some(message.into());
        true
    }

    /// Drop the conversation back to the greeting. Refused while busy.
    pub fn reset(&mut self) -> Result<(), SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::Busy);
        }
        self.turns = vec![Turn::model(GREETING)];
        self.last_error = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatSession, GREETING, SubmitError};
    use pretty_assertions::assert_eq;
    use profchat_protocol::{Role, Turn};

    #[test]
    fn starts_with_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.turns(), &[Turn::model(GREETING)]);
        assert!(!session.has_started());
        assert!(!session.is_busy());
    }

    #[test]
    fn submission_excludes_placeholder() {
        let mut session = ChatSession::new();
        let submission = session.begin_submission("Who teaches biology?").expect("submit");

        assert_eq!(
            submission.transcript,
            vec![Turn::model(GREETING), Turn::user("Who teaches biology?")]
        );
        assert_eq!(session.turns().len(), 3);
        assert_eq!(session.turns()[2], Turn::model(""));
        assert!(session.is_busy());
    }

    #[test]
    fn blank_input_is_rejected() {
        let mut session = ChatSession::new();
        assert_eq!(session.begin_submission(" \n "), Err(SubmitError::Empty));
        assert_eq!(session.turns().len(), 1);
    }

    #[test]
    fn second_submission_while_streaming_is_busy() {
        let mut session = ChatSession::new();
        session.begin_submission("one").expect("first");
        assert_eq!(session.begin_submission("two"), Err(SubmitError::Busy));
        assert_eq!(session.turns().len(), 3);
    }

    #[test]
    fn deltas_grow_the_placeholder() {
        let mut session = ChatSession::new();
        let seq = session.begin_submission("q").expect("submit").seq;

        assert!(session.apply_delta(seq, "Prof"));
        assert_eq!(session.turns().last().map(|t| t.content.as_str()), Some("Prof"));
        assert!(session.apply_delta(seq, " X is great"));
        let last = session.turns().last().expect("last");
        assert_eq!(last.role, Role::Model);
        assert_eq!(last.content, "Prof X is great");
        assert_eq!(session.turns().len(), 3);
    }

    #[test]
    fn stale_sequences_are_ignored() {
        let mut session = ChatSession::new();
        let first = session.begin_submission("one").expect("first").seq;
        assert!(session.finish(first));
        let second = session.begin_submission("two").expect("second").seq;

        assert!(second > first);
        assert!(!session.apply_delta(first, "late"));
        assert!(!session.finish(first));
        assert_eq!(session.turns().last(), Some(&Turn::model("")));
        assert!(session.is_busy());
    }

    #[test]
    fn failure_keeps_partial_reply() {
        let mut session = ChatSession::new();
        let seq = session.begin_submission("q").expect("submit").seq;
        session.apply_delta(seq, "partial");

        assert!(session.fail(seq, "connection reset"));
        assert!(!session.is_busy());
        assert_eq!(session.last_error(), Some("connection reset"));
        assert_eq!(session.turns().last(), Some(&Turn::model("partial")));
    }

    #[test]
    fn next_submission_carries_prior_reply() {
        let mut session = ChatSession::new();
        let seq = session.begin_submission("one").expect("first").seq;
        session.apply_delta(seq, "answer");
        session.finish(seq);

        let submission = session.begin_submission("two").expect("second");
        assert_eq!(
            submission.transcript,
            vec![
                Turn::model(GREETING),
                Turn::user("one"),
                Turn::model("answer"),
                Turn::user("two"),
            ]
        );
    }

    #[test]
    fn reset_is_refused_while_busy() {
        let mut session = ChatSession::new();
        let seq = session.begin_submission("q").expect("submit").seq;
        assert_eq!(session.reset(), Err(SubmitError::Busy));
        session.finish(seq);
        session.reset().expect("reset");
        assert_eq!(session.turns(), &[Turn::model(GREETING)]);
    }
}
