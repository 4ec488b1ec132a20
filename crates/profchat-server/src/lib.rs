//! HTTP front end for the profchat answer pipeline.
//!
//! Exposes a single streaming endpoint, `POST /api/chat`, that accepts a JSON
//! transcript and answers with the generated text as a chunked plain-text
//! body.

mod error;
mod routes;

pub use error::ServerError;
pub use routes::{CHAT_PATH, router};

use log::info;
use profchat_core::RagPipeline;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, pipeline: Arc<RagPipeline>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    serve_listener(listener, pipeline).await
}

/// Serve on an already-bound listener.
pub async fn serve_listener(
    listener: TcpListener,
    pipeline: Arc<RagPipeline>,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!("profchat server listening (addr={}, path={})", addr, CHAT_PATH);
    }
    axum::serve(listener, router(pipeline))
        .await
        .map_err(ServerError::Serve)
}
