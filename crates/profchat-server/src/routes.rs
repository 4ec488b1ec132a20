//! Router and the chat handler.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use log::{info, warn};
use profchat_core::RagPipeline;
use profchat_protocol::{ERROR_KIND_HEADER, ErrorKind, Turn};
use std::sync::Arc;

/// Path of the streaming chat endpoint.
pub const CHAT_PATH: &str = "/api/chat";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Build the application router around a shared pipeline.
pub fn router(pipeline: Arc<RagPipeline>) -> Router {
    Router::new()
        .route(CHAT_PATH, post(chat))
        .with_state(pipeline)
}

/// Answer a transcript with a streamed plain-text body.
///
/// The body is read as raw bytes so malformed JSON maps to the same
/// validation response as an unusable transcript.
async fn chat(State(pipeline): State<Arc<RagPipeline>>, body: Bytes) -> Response {
    let transcript: Vec<Turn> = match serde_json::from_slice(&body) {
        Ok(transcript) => transcript,
        Err(err) => {
            return error_response(
                ErrorKind::InputValidation,
                format!("malformed transcript: {err}"),
            );
        }
    };
    info!(
        "chat request received (turns={}, bytes={})",
        transcript.len(),
        body.len()
    );

    match pipeline.respond(&transcript).await {
        Ok(stream) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
            Body::from_stream(stream),
        )
            .into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

fn error_response(kind: ErrorKind, message: String) -> Response {
    let status = match kind {
        ErrorKind::InputValidation => StatusCode::BAD_REQUEST,
        ErrorKind::UpstreamFailure | ErrorKind::StreamingFailure => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    warn!("chat request failed (status={}, kind={}): {}", status, kind, message);
    (
        status,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN)),
            (
                header::HeaderName::from_static(ERROR_KIND_HEADER),
                HeaderValue::from_static(kind.as_str()),
            ),
        ],
        message,
    )
        .into_response()
}
