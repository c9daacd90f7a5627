//! Shared HTTP transport for OpenAI-compatible completion backends.
//!
//! `HttpBackend` wraps a `reqwest::Client` and builds bearer-authenticated
//! requests per endpoint. Dropping a pending call drops the underlying
//! connection, which is what invocation cancellation relies on.

use ocore::{Backend, Completion, CompletionRequest, Endpoint, Error, ModelList, Result};
use reqwest::{
    Client, Method, Response,
    header::{self, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;

/// Shared HTTP transport.
#[derive(Clone, Default)]
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    /// Create a backend over an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn headers(endpoint: &Endpoint) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", endpoint.api_key)
            .parse::<HeaderValue>()
            .map_err(Error::transport)?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }
}

impl Backend for HttpBackend {
    async fn list_models(&self, endpoint: &Endpoint) -> Result<Vec<String>> {
        let url = endpoint.url("models");
        tracing::debug!("fetching models from {url}");
        let response = self
            .client
            .request(Method::GET, &url)
            .headers(Self::headers(endpoint)?)
            .send()
            .await
            .map_err(Error::transport)?;

        let list: ModelList = parse(response).await?;
        Ok(list.into())
    }

    async fn complete(&self, endpoint: &Endpoint, request: &CompletionRequest) -> Result<Completion> {
        if let Ok(body) = serde_json::to_string(request) {
            tracing::trace!("request: {}", body);
        }
        let response = self
            .client
            .request(Method::POST, endpoint.url("completions"))
            .headers(Self::headers(endpoint)?)
            .json(request)
            .send()
            .await
            .map_err(Error::transport)?;

        parse(response).await
    }
}

/// Read the body and decode it, mapping non-success statuses to transport
/// errors carrying the backend's message.
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await.map_err(Error::transport)?;
    tracing::trace!("response ({status}): {text}");
    if !status.is_success() {
        return Err(Error::transport(anyhow::anyhow!("{status}: {text}")));
    }
    serde_json::from_str(&text).map_err(Error::transport)
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend").finish_non_exhaustive()
    }
}
