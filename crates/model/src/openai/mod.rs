//! OpenAI legacy completions provider.
//!
//! One endpoint serves both the model listing and `/completions`; only the
//! instruct models accept a `suffix`.

use crate::configure::{Credentials, Field, Setup};
use ocore::{BackendConfig, Endpoint, OpenAIConfig, ProviderConfig, ProviderInfo};
use std::sync::OnceLock;

mod provider;

/// Identity of the OpenAI variant.
pub const INFO: ProviderInfo = ProviderInfo {
    name: "OpenAI",
    id: "openai-completion",
    kind: "completion",
};

const CONTEXT_WINDOW: u32 = 4_096;

const HELP: &str =
    "Click [here](https://platform.openai.com/docs/api-reference/completions) for more information";

const FIELDS: &[Field] = &[
    Field {
        key: "apiKey",
        label: "OpenAI API key",
        default: None,
        placeholder: "e.g., sk-proj-mFzPtn4QYHOSJ...",
        help: HELP,
        url: false,
    },
    Field {
        key: "baseUrl",
        label: "OpenAI base URL",
        default: Some("https://api.openai.com/v1"),
        placeholder: "e.g., https://api.openai.com/v1",
        help: HELP,
        url: true,
    },
];

/// Configuration workflow knowledge for OpenAI.
pub static SETUP: OpenAISetup = OpenAISetup;

/// The OpenAI provider, wrapping one validated record.
pub struct OpenAI<B> {
    config: ProviderConfig,
    settings: OpenAIConfig,
    backend: B,
    endpoint: OnceLock<Endpoint>,
}

/// [`Setup`] for the OpenAI variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAISetup;

impl Setup for OpenAISetup {
    fn info(&self) -> ProviderInfo {
        INFO
    }

    fn fields(&self) -> &'static [Field] {
        FIELDS
    }

    fn existing(&self, config: &ProviderConfig) -> Option<Credentials> {
        match &config.backend {
            BackendConfig::OpenAI(settings) => Some(Credentials::from([
                ("apiKey", settings.api_key.clone()),
                ("baseUrl", settings.base_url.clone()),
            ])),
            _ => None,
        }
    }

    fn listing_endpoint(&self, credentials: &Credentials) -> Endpoint {
        Endpoint::new(credentials.get("baseUrl"), credentials.get("apiKey"))
    }

    fn completion_endpoint(&self, credentials: &Credentials) -> Endpoint {
        self.listing_endpoint(credentials)
    }

    fn build(&self, nickname: &str, model: &str, credentials: Credentials) -> ProviderConfig {
        ProviderConfig {
            nickname: nickname.to_owned(),
            model: model.to_owned(),
            context_window: CONTEXT_WINDOW,
            backend: BackendConfig::OpenAI(OpenAIConfig {
                api_key: credentials.get("apiKey").to_owned(),
                base_url: credentials.get("baseUrl").to_owned(),
            }),
        }
    }
}
