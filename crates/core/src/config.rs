//! Persisted provider configuration and the store contract.
//!
//! One `ProviderConfig` record lives under each nickname. The variant
//! specific fields are flattened next to the common ones and discriminated
//! by `providerId`, so a stored record reads as a single flat table.

use crate::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fully validated provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// User-chosen unique key for this record.
    pub nickname: String,
    /// Selected model identifier.
    pub model: String,
    /// Maximum input plus output tokens accepted by the backend.
    pub context_window: u32,
    /// Variant-specific settings, discriminated by `providerId`.
    #[serde(flatten)]
    pub backend: BackendConfig,
}

impl ProviderConfig {
    /// Stable id of the variant this record belongs to.
    pub fn provider_id(&self) -> &'static str {
        self.backend.provider_id()
    }
}

/// Variant-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "providerId")]
pub enum BackendConfig {
    /// DeepSeek fill-in-middle completion.
    #[serde(rename = "deepseek-completion")]
    DeepSeek(DeepSeekConfig),
    /// OpenAI legacy completions API.
    #[serde(rename = "openai-completion")]
    OpenAI(OpenAIConfig),
}

impl BackendConfig {
    /// Stable id of the variant.
    pub fn provider_id(&self) -> &'static str {
        match self {
            Self::DeepSeek(_) => "deepseek-completion",
            Self::OpenAI(_) => "openai-completion",
        }
    }
}

/// Settings for the DeepSeek variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepSeekConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Primary endpoint, used for model discovery.
    pub base_url: String,
    /// Beta endpoint, the only one serving fill-in-middle completions.
    pub beta_url: String,
}

/// Settings for the OpenAI variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAIConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Endpoint for both discovery and completion.
    pub base_url: String,
}

/// Keyed persistence of provider records.
///
/// `set` must be atomic: a reader never observes a half-written record.
pub trait ConfigStore: Send + Sync {
    /// Load the record stored under `nickname`.
    fn get(&self, nickname: &str) -> Result<Option<ProviderConfig>>;

    /// Replace the record stored under `nickname`.
    fn set(&self, nickname: &str, config: &ProviderConfig) -> Result<()>;

    /// Every stored record, ordered by nickname.
    fn list(&self) -> Result<Vec<ProviderConfig>>;
}

/// In-memory [`ConfigStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, ProviderConfig>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `configs`, keyed by their nicknames.
    pub fn with(configs: impl IntoIterator<Item = ProviderConfig>) -> Self {
        let records = configs
            .into_iter()
            .map(|config| (config.nickname.clone(), config))
            .collect();
        Self {
            records: Mutex::new(records),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `set` calls served so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, nickname: &str) -> Result<Option<ProviderConfig>> {
        Ok(self.records.lock().get(nickname).cloned())
    }

    fn set(&self, nickname: &str, config: &ProviderConfig) -> Result<()> {
        if config.nickname != nickname {
            return Err(Error::store(anyhow::anyhow!(
                "record nickname {} does not match key {nickname}",
                config.nickname
            )));
        }
        self.records
            .lock()
            .insert(nickname.to_owned(), config.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn list(&self) -> Result<Vec<ProviderConfig>> {
        Ok(self.records.lock().values().cloned().collect())
    }
}
