//! Client behaviour against a live loopback server.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::routing::post;
use futures_util::stream;
use pretty_assertions::assert_eq;
use profchat_core::{PipelineOptions, RagPipeline};
use profchat_protocol::{ErrorKind, Role, Turn};
use profchat_server::{CHAT_PATH, router};
use profchat_test_utils::{
    CallLog, EmbeddingLLM, ScriptedLLM, StaticIndex, fake_services, review,
};
use profchat_tui::{ChatClient, ChatSession, ClientError, GREETING};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}{CHAT_PATH}")
}

fn chat_app(chat: ScriptedLLM, calls: &CallLog) -> Router {
    router(Arc::new(RagPipeline::new(
        fake_services(
            EmbeddingLLM::new(vec![0.1, 0.2], calls.clone()),
            StaticIndex::new(
                vec![review("Dr. Lovelace", "Computer Science", 5.0, 0.93)],
                calls.clone(),
            ),
            chat,
        ),
        PipelineOptions::default(),
    )))
}

#[tokio::test]
async fn deltas_arrive_in_order() {
    let calls = CallLog::new();
    let url = spawn(chat_app(
        ScriptedLLM::new(["Prof", " X is great"], calls.clone()),
        &calls,
    ))
    .await;
    let client = ChatClient::new(url).expect("client");

    let mut seen = String::new();
    let reply = client
        .stream_reply(&[Turn::model(GREETING), Turn::user("Who is best?")], |delta| {
            seen.push_str(delta)
        })
        .await
        .expect("reply");

    assert_eq!(reply, "Prof X is great");
    assert_eq!(seen, reply);
    assert_eq!(calls.entries(), vec!["embed", "query", "generate"]);
}

#[tokio::test]
async fn rejected_input_reports_status_and_kind() {
    let calls = CallLog::new();
    let url = spawn(chat_app(ScriptedLLM::new(["unused"], calls.clone()), &calls)).await;
    let client = ChatClient::new(url).expect("client");

    let err = client
        .stream_reply(&[Turn::user("   ")], |_| {})
        .await
        .expect_err("blank question");

    match err {
        ClientError::Status { status, kind, .. } => {
            assert_eq!(status, 400);
            assert_eq!(kind, Some(ErrorKind::InputValidation));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(calls.is_empty());
}

#[tokio::test]
async fn broken_stream_is_an_error_after_partial_output() {
    let calls = CallLog::new();
    let url = spawn(chat_app(
        ScriptedLLM::new(["partial"], calls.clone()).fail_after(1),
        &calls,
    ))
    .await;
    let client = ChatClient::new(url).expect("client");

    let mut seen = String::new();
    let result = client
        .stream_reply(&[Turn::user("q")], |delta| seen.push_str(delta))
        .await;

    assert!(matches!(result, Err(ClientError::Http(_))));
    assert!("partial".starts_with(&seen));
}

#[tokio::test]
async fn multibyte_characters_split_across_chunks_decode() {
    let text = "café ok";
    let bytes = text.as_bytes();
    let chunks = vec![
        Bytes::copy_from_slice(&bytes[..4]),
        Bytes::copy_from_slice(&bytes[4..]),
    ];
    let app = Router::new().route(
        CHAT_PATH,
        post(move || {
            let chunks = chunks.clone();
            async move {
                Body::from_stream(stream::iter(
                    chunks.into_iter().map(Ok::<_, Infallible>),
                ))
            }
        }),
    );
    let client = ChatClient::new(spawn(app).await).expect("client");

    let reply = client
        .stream_reply(&[Turn::user("q")], |_| {})
        .await
        .expect("reply");

    assert_eq!(reply, text);
}

#[tokio::test]
async fn session_tracks_a_full_exchange() {
    let calls = CallLog::new();
    let url = spawn(chat_app(
        ScriptedLLM::new(["Dr. Lovelace", " is excellent."], calls.clone()),
        &calls,
    ))
    .await;
    let client = ChatClient::new(url).expect("client");
    let mut session = ChatSession::new();

    let submission = session
        .begin_submission("Best CS professor?")
        .expect("submit");
    assert_eq!(submission.transcript.len(), 2);
    let seq = submission.seq;

    client
        .stream_reply(&submission.transcript, |delta| {
            assert!(session.apply_delta(seq, delta));
        })
        .await
        .expect("reply");
    assert!(session.finish(seq));

    let turns = session.turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1], Turn::user("Best CS professor?"));
    assert_eq!(turns[2].role, Role::Model);
    assert_eq!(turns[2].content, "Dr. Lovelace is excellent.");
    assert!(!session.is_busy());
}
