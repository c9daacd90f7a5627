//! DeepSeek fill-in-middle completion provider.
//!
//! Models are discovered on the primary endpoint; completions with a
//! `suffix` are only served by the beta endpoint.

use crate::configure::{Credentials, Field, Setup};
use ocore::{
    BackendConfig, DeepSeekConfig, Endpoint, ProviderConfig, ProviderInfo,
};
use std::sync::OnceLock;

mod provider;

/// Identity of the DeepSeek variant.
pub const INFO: ProviderInfo = ProviderInfo {
    name: "DeepSeek",
    id: "deepseek-completion",
    kind: "completion",
};

/// https://api-docs.deepseek.com/quick_start/pricing
const CONTEXT_WINDOW: u32 = 64_000;

const HELP: &str =
    "Click [here](https://api-docs.deepseek.com/guides/fim_completion) for more information";

const FIELDS: &[Field] = &[
    Field {
        key: "apiKey",
        label: "DeepSeek API key",
        default: None,
        placeholder: "e.g., sk-mFzPtn4QYHOSJ...",
        help: HELP,
        url: false,
    },
    Field {
        key: "baseUrl",
        label: "DeepSeek base URL",
        default: Some("https://api.deepseek.com/v1"),
        placeholder: "e.g., https://api.deepseek.com/v1",
        help: HELP,
        url: true,
    },
    Field {
        key: "betaUrl",
        label: "DeepSeek completion base URL",
        default: Some("https://api.deepseek.com/beta"),
        placeholder: "e.g., https://api.deepseek.com/beta",
        help: HELP,
        url: true,
    },
];

/// Configuration workflow knowledge for DeepSeek.
pub static SETUP: DeepSeekSetup = DeepSeekSetup;

/// The DeepSeek provider, wrapping one validated record.
pub struct DeepSeek<B> {
    config: ProviderConfig,
    settings: DeepSeekConfig,
    backend: B,
    /// Completion endpoint, resolved by `initialize`.
    endpoint: OnceLock<Endpoint>,
}

/// [`Setup`] for the DeepSeek variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepSeekSetup;

impl Setup for DeepSeekSetup {
    fn info(&self) -> ProviderInfo {
        INFO
    }

    fn fields(&self) -> &'static [Field] {
        FIELDS
    }

    fn existing(&self, config: &ProviderConfig) -> Option<Credentials> {
        match &config.backend {
            BackendConfig::DeepSeek(settings) => Some(Credentials::from([
                ("apiKey", settings.api_key.clone()),
                ("baseUrl", settings.base_url.clone()),
                ("betaUrl", settings.beta_url.clone()),
            ])),
            _ => None,
        }
    }

    fn listing_endpoint(&self, credentials: &Credentials) -> Endpoint {
        Endpoint::new(credentials.get("baseUrl"), credentials.get("apiKey"))
    }

    fn completion_endpoint(&self, credentials: &Credentials) -> Endpoint {
        Endpoint::new(credentials.get("betaUrl"), credentials.get("apiKey"))
    }

    fn build(&self, nickname: &str, model: &str, credentials: Credentials) -> ProviderConfig {
        ProviderConfig {
            nickname: nickname.to_owned(),
            model: model.to_owned(),
            context_window: CONTEXT_WINDOW,
            backend: BackendConfig::DeepSeek(DeepSeekConfig {
                api_key: credentials.get("apiKey").to_owned(),
                base_url: credentials.get("baseUrl").to_owned(),
                beta_url: credentials.get("betaUrl").to_owned(),
            }),
        }
    }
}
