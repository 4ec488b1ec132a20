//! Pure operations over an ordered transcript of turns.

use crate::{Role, Turn};
use thiserror::Error;

/// Reasons a transcript cannot be answered.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TranscriptError {
    /// No turns were supplied.
    #[error("transcript is empty")]
    Empty,
    /// The newest turn was not written by the user.
    #[error("last turn must come from the user")]
    NotUser,
    /// The newest turn has no usable content.
    #[error("no content available for embedding")]
    EmptyContent,
}

/// Split a transcript into its history prefix and the newest user turn.
pub fn split_query(transcript: &[Turn]) -> Result<(&[Turn], &Turn), TranscriptError> {
    let (query, history) = transcript.split_last().ok_or(TranscriptError::Empty)?;
    if query.role != Role::User {
        return Err(TranscriptError::NotUser);
    }
    if query.content.trim().is_empty() {
        return Err(TranscriptError::EmptyContent);
    }
    Ok((history, query))
}

/// Append a streamed model delta to the transcript.
///
/// The delta extends the last turn when it is a model turn; otherwise a new
/// model turn is started.
pub fn append_delta(mut transcript: Vec<Turn>, delta: &str) -> Vec<Turn> {
    if let Some(last) = transcript.last_mut()
        && last.role == Role::Model
    {
        last.content.push_str(delta);
        return transcript;
    }
    transcript.push(Turn::model(delta));
    transcript
}

#[cfg(test)]
mod tests {
    use super::{TranscriptError, append_delta, split_query};
    use crate::Turn;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_query_separates_history_from_newest_turn() {
        let transcript = vec![
            Turn::model("greeting"),
            Turn::user("first"),
            Turn::model("answer"),
            Turn::user("second"),
        ];
        let (history, query) = split_query(&transcript).expect("split");
        assert_eq!(history.len(), 3);
        assert_eq!(query.content, "second");
    }

    #[test]
    fn split_query_rejects_empty_transcript() {
        assert_eq!(split_query(&[]).unwrap_err(), TranscriptError::Empty);
    }

    #[test]
    fn split_query_rejects_blank_content() {
        let transcript = vec![Turn::user("   ")];
        assert_eq!(
            split_query(&transcript).unwrap_err(),
            TranscriptError::EmptyContent
        );
    }

    #[test]
    fn split_query_rejects_model_last() {
        let transcript = vec![Turn::user("q"), Turn::model("a")];
        assert_eq!(
            split_query(&transcript).unwrap_err(),
            TranscriptError::NotUser
        );
    }

    #[test]
    fn append_delta_extends_model_placeholder() {
        let transcript = vec![Turn::user("q"), Turn::model("")];
        let transcript = append_delta(transcript, "Prof");
        assert_eq!(transcript[1].content, "Prof");
        let transcript = append_delta(transcript, " X is great");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].content, "Prof X is great");
    }

    #[test]
    fn append_delta_starts_model_turn_after_user() {
        let transcript = append_delta(vec![Turn::user("q")], "a");
        assert_eq!(transcript, vec![Turn::user("q"), Turn::model("a")]);
    }
}
