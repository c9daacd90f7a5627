//! Tests for the mock transport behind the `testing` feature.

use oopilot_core::testing::{MockBackend, Reply};
use oopilot_core::{Backend, CompletionRequest, Endpoint, Error, InvocationRequest};

fn endpoint() -> Endpoint {
    Endpoint::new("https://api.example.com/v1", "sk-test")
}

#[tokio::test]
async fn listing_releases_its_connection() {
    let backend = MockBackend::new().with_models(["modelA", "modelB"]);

    let models = backend.list_models(&endpoint()).await.unwrap();

    assert_eq!(models, ["modelA", "modelB"]);
    assert_eq!(backend.listings(), [endpoint()]);
    assert_eq!(backend.opened(), 1);
    assert_eq!(backend.open_connections(), 0);
}

#[tokio::test]
async fn replies_follow_the_script() {
    let request =
        CompletionRequest::from_invocation("modelA", &InvocationRequest::new("How", "are you?"));

    let backend = MockBackend::new().with_reply(Reply::Text("  doing".into()));
    let completion = backend.complete(&endpoint(), &request).await.unwrap();
    assert_eq!(completion.first_text().as_deref(), Some("  doing"));

    let backend = backend.with_reply(Reply::Empty);
    let completion = backend.complete(&endpoint(), &request).await.unwrap();
    assert_eq!(completion.first_text(), None);

    let backend = backend.with_reply(Reply::Fail("503".into()));
    let err = backend.complete(&endpoint(), &request).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));

    assert_eq!(backend.requests().len(), 3);
    assert_eq!(backend.open_connections(), 0);
}
