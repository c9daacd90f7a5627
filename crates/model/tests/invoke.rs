//! Tests for provider invocation.

use ocore::testing::{MockBackend, Reply};
use ocore::{
    BackendConfig, CancellationToken, DeepSeekConfig, Error, InvocationRequest, MemoryStore,
    OpenAIConfig, Provider, ProviderConfig,
};
use oopilot_model::{DeepSeek, OpenAI};

fn deepseek_config() -> ProviderConfig {
    ProviderConfig {
        nickname: "my-deepseek".into(),
        model: "deepseek-chat".into(),
        context_window: 64000,
        backend: BackendConfig::DeepSeek(DeepSeekConfig {
            api_key: "sk-test".into(),
            base_url: "https://api.example.com/v1".into(),
            beta_url: "https://api.example.com/beta".into(),
        }),
    }
}

fn openai_config() -> ProviderConfig {
    ProviderConfig {
        nickname: "oai".into(),
        model: "gpt-3.5-turbo-instruct".into(),
        context_window: 4096,
        backend: BackendConfig::OpenAI(OpenAIConfig {
            api_key: "sk-oai".into(),
            base_url: "https://api.example.com/v1".into(),
        }),
    }
}

fn deepseek(backend: &MockBackend) -> DeepSeek<MockBackend> {
    DeepSeek::from_config(deepseek_config(), backend.clone()).unwrap()
}

#[tokio::test]
async fn returns_first_choice_verbatim() {
    let backend = MockBackend::new().with_reply(Reply::Text("  are you doing today".into()));
    let provider = deepseek(&backend);
    provider.initialize().await.unwrap();

    let request = InvocationRequest::new("How", "are you?").with_max_tokens(3);
    let text = provider.invoke(request).await.unwrap();

    assert_eq!(text, "  are you doing today");
}

#[tokio::test]
async fn maps_request_onto_completion_body() {
    let backend = MockBackend::new().with_reply(Reply::Text("x".into()));
    let provider = deepseek(&backend);

    let request = InvocationRequest::new("fn main() {", "}")
        .with_max_tokens(64)
        .with_stop(vec!["\n\n".into()])
        .with_temperature(0.2);
    provider.invoke(request).await.unwrap();

    let requests = backend.requests();
    let (endpoint, body) = &requests[0];
    assert_eq!(endpoint.base_url, "https://api.example.com/beta");
    assert_eq!(endpoint.api_key, "sk-test");
    assert_eq!(body.model, "deepseek-chat");
    assert_eq!(body.prompt, "fn main() {");
    assert_eq!(body.suffix.as_deref(), Some("}"));
    assert_eq!(body.max_tokens, 64);
    assert_eq!(body.stop.as_deref(), Some(&["\n\n".to_owned()][..]));
    assert_eq!(body.temperature, Some(0.2));
}

#[tokio::test]
async fn openai_completes_on_base_url() {
    let backend = MockBackend::new().with_reply(Reply::Text("done".into()));
    let provider = OpenAI::from_config(openai_config(), backend.clone()).unwrap();

    let text = provider
        .invoke(InvocationRequest::new("a", "b"))
        .await
        .unwrap();

    assert_eq!(text, "done");
    assert_eq!(backend.requests()[0].0.base_url, "https://api.example.com/v1");
}

#[tokio::test]
async fn cancellation_releases_connection() {
    let backend = MockBackend::new().with_reply(Reply::Pending);
    let provider = deepseek(&backend);
    let cancel = CancellationToken::new();
    let request = InvocationRequest::new("How", "are you?").with_cancellation(cancel.clone());

    let (result, ()) = tokio::join!(provider.invoke(request), async {
        while backend.opened() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(backend.open_connections(), 1);
        cancel.cancel();
    });

    assert!(matches!(result, Err(Error::InvocationCancelled)));
    assert_eq!(backend.opened(), 1);
    assert_eq!(backend.open_connections(), 0);
}

#[tokio::test]
async fn cancelled_before_start_makes_no_call() {
    let backend = MockBackend::new().with_reply(Reply::Text("unused".into()));
    let provider = deepseek(&backend);
    let request = InvocationRequest::new("How", "are you?");
    request.cancel.cancel();

    let err = provider.invoke(request).await.unwrap_err();

    assert!(err.is_cancellation());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn transport_error_surfaces_unchanged() {
    let backend = MockBackend::new().with_reply(Reply::Fail("503 Service Unavailable".into()));
    let provider = deepseek(&backend);

    let err = provider
        .invoke(InvocationRequest::new("How", "are you?"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("503 Service Unavailable"));
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn load_without_record_is_not_found() {
    let store = MemoryStore::new();
    let backend = MockBackend::new();

    let err = DeepSeek::load("missing", &store, backend.clone()).err().unwrap();

    assert!(matches!(err, Error::ConfigNotFound(ref nickname) if nickname == "missing"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn load_of_other_variant_is_mismatch() {
    let store = MemoryStore::with([openai_config()]);

    let err = DeepSeek::load("oai", &store, MockBackend::new()).err().unwrap();

    assert!(matches!(
        err,
        Error::ConfigMismatch {
            expected: "deepseek-completion",
            found: "openai-completion",
            ..
        }
    ));
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let backend = MockBackend::new();
    let store = MemoryStore::with([deepseek_config()]);
    let provider = DeepSeek::load("my-deepseek", &store, backend.clone()).unwrap();

    provider.initialize().await.unwrap();
    provider.initialize().await.unwrap();

    assert_eq!(provider.config(), &deepseek_config());
    assert_eq!(backend.calls(), 0);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn initialize_rejects_malformed_endpoint() {
    let mut config = openai_config();
    config.backend = BackendConfig::OpenAI(OpenAIConfig {
        api_key: "sk".into(),
        base_url: "not a url".into(),
    });
    let provider = OpenAI::from_config(config, MockBackend::new()).unwrap();

    let err = provider.initialize().await.unwrap_err();
    assert!(matches!(err, Error::ValidationFailed { .. }));
}
