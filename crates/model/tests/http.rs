//! Tests for `HttpBackend` against a local OpenAI-compatible server.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use ocore::{
    Backend, CancellationToken, CompletionRequest, Endpoint, Error, InvocationRequest,
};
use oopilot_model::{HttpBackend, invoke};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
struct Seen {
    auth: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

type Reply = (StatusCode, [(header::HeaderName, &'static str); 1], String);

fn json_reply(status: StatusCode, body: Value) -> Reply {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

async fn models(State(seen): State<Seen>, headers: HeaderMap) -> Reply {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    seen.auth.lock().push(auth.to_owned());
    if auth != "Bearer sk-test" {
        return json_reply(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "invalid api key"}}),
        );
    }
    json_reply(
        StatusCode::OK,
        json!({"object": "list", "data": [{"id": "modelA"}, {"id": "modelB"}]}),
    )
}

async fn completions(State(seen): State<Seen>, body: String) -> Reply {
    let body: Value = serde_json::from_str(&body).unwrap_or_default();
    let slow = body["prompt"] == "slow";
    seen.bodies.lock().push(body);
    if slow {
        std::future::pending::<()>().await;
    }
    json_reply(
        StatusCode::OK,
        json!({
            "id": "cmpl-1",
            "object": "text_completion",
            "choices": [{"text": "  are you doing today", "index": 0, "finish_reason": "length"}],
        }),
    )
}

async fn serve() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v1/models", get(models))
        .route("/beta/completions", post(completions))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

#[tokio::test]
async fn lists_models_with_bearer_token() {
    let (base, seen) = serve().await;
    let backend = HttpBackend::default();

    let models = backend
        .list_models(&Endpoint::new(format!("{base}/v1/"), "sk-test"))
        .await
        .unwrap();

    assert_eq!(models, ["modelA", "modelB"]);
    assert_eq!(*seen.auth.lock(), ["Bearer sk-test"]);
}

#[tokio::test]
async fn error_status_is_transport_error() {
    let (base, _) = serve().await;
    let backend = HttpBackend::default();

    let err = backend
        .list_models(&Endpoint::new(format!("{base}/v1"), "sk-wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    let message = err.to_string();
    assert!(message.contains("401"), "{message}");
    assert!(message.contains("invalid api key"), "{message}");
}

#[tokio::test]
async fn completion_body_uses_wire_names() {
    let (base, seen) = serve().await;
    let backend = HttpBackend::default();
    let request = CompletionRequest {
        model: "modelA".into(),
        prompt: "How".into(),
        suffix: Some("are you?".into()),
        max_tokens: 3,
        stop: None,
        temperature: None,
    };

    let completion = backend
        .complete(&Endpoint::new(format!("{base}/beta"), "sk-test"), &request)
        .await
        .unwrap();

    assert_eq!(completion.first_text().as_deref(), Some("  are you doing today"));
    assert_eq!(
        seen.bodies.lock()[0],
        json!({"model": "modelA", "prompt": "How", "suffix": "are you?", "max_tokens": 3})
    );
}

#[tokio::test]
async fn invoke_returns_text_verbatim() {
    let (base, _) = serve().await;
    let endpoint = Endpoint::new(format!("{base}/beta"), "sk-test");

    let text = invoke(
        &HttpBackend::default(),
        &endpoint,
        "modelA",
        InvocationRequest::new("How", "are you?").with_max_tokens(3),
    )
    .await
    .unwrap();

    assert_eq!(text, "  are you doing today");
}

#[tokio::test]
async fn cancellation_aborts_in_flight_request() {
    let (base, seen) = serve().await;
    let endpoint = Endpoint::new(format!("{base}/beta"), "sk-test");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        invoke(
            &HttpBackend::default(),
            &endpoint,
            "modelA",
            InvocationRequest::new("slow", "").with_cancellation(cancel),
        ),
    )
    .await
    .expect("cancellation should end the call");

    assert!(matches!(result, Err(Error::InvocationCancelled)));
    assert_eq!(seen.bodies.lock().len(), 1);
}
