//! Backend HTTP contract (OpenAI-compatible completions).
//!
//! A backend exposes model discovery and single-shot completion. Both are
//! plain futures: dropping one aborts the underlying call, which is how
//! cancellation reaches the transport.

use crate::{InvocationRequest, Result};
use serde::{Deserialize, Serialize};

/// Base URL plus credentials for one backend endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Base URL, e.g. `https://api.deepseek.com/beta`.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Join `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// The request body for the completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// The model to use.
    pub model: String,
    /// Text before the insertion point.
    pub prompt: String,
    /// Text after the insertion point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// The maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// The temperature to use for the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Map an invocation onto the wire body for `model`.
    pub fn from_invocation(model: &str, request: &InvocationRequest) -> Self {
        Self {
            model: model.to_owned(),
            prompt: request.prefix.clone(),
            suffix: Some(request.suffix.clone()),
            max_tokens: request.max_tokens,
            stop: request.stop.clone(),
            temperature: request.temperature,
        }
    }
}

/// The response body of the completions endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Completion {
    /// Generated choices, in backend order.
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

impl Completion {
    /// Text of the first choice.
    pub fn first_text(self) -> Option<String> {
        self.choices.into_iter().next().map(|choice| choice.text)
    }
}

/// One generated choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChoice {
    /// The generated text.
    pub text: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The response body of the model listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

/// One listed model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

impl From<ModelList> for Vec<String> {
    fn from(list: ModelList) -> Self {
        list.data.into_iter().map(|model| model.id).collect()
    }
}

/// Transport for an OpenAI-compatible backend.
pub trait Backend: Clone + Send + Sync + 'static {
    /// List the model identifiers served at `endpoint`.
    fn list_models(&self, endpoint: &Endpoint) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Issue one non-streaming completion.
    fn complete(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<Completion>> + Send;
}
