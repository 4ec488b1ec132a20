//! HTTP client for the streaming chat endpoint.

use crate::decoder::Utf8StreamDecoder;
use futures_util::StreamExt;
use log::{debug, info};
use profchat_protocol::{ERROR_KIND_HEADER, ErrorKind, Turn};
use thiserror::Error;

/// Errors returned while requesting a reply.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, including a body cut off mid-stream.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        status: u16,
        kind: Option<ErrorKind>,
        body: String,
    },
}

/// Posts transcripts to the chat endpoint and relays the streamed reply.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
}

impl ChatClient {
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `transcript` and feed each decoded delta to `sink` in order.
    ///
    /// Returns the full reply. Deltas already handed to `sink` stay
    /// delivered when the stream breaks.
    pub async fn stream_reply<F>(
        &self,
        transcript: &[Turn],
        mut sink: F,
    ) -> Result<String, ClientError>
    where
        F: FnMut(&str),
    {
        debug!(
            "posting transcript (url={}, turns={})",
            self.url,
            transcript.len()
        );
        let response = self.http.post(&self.url).json(transcript).send().await?;
        let status = response.status();
        if !status.is_success() {
            let kind = response
                .headers()
                .get(ERROR_KIND_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(ErrorKind::parse);
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                kind,
                body,
            });
        }

        let mut decoder = Utf8StreamDecoder::new();
        let mut reply = String::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let text = decoder.push(&chunk?);
            if !text.is_empty() {
                sink(&text);
                reply.push_str(&text);
            }
        }
        let tail = decoder.finish();
        if !tail.is_empty() {
            sink(&tail);
            reply.push_str(&tail);
        }
        info!("reply complete (chars={})", reply.chars().count());
        Ok(reply)
    }
}
