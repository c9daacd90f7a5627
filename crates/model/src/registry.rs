//! Provider registry.
//!
//! Maps `providerId` to a constructor, caches loaded instances per nickname
//! and serializes configuration runs per nickname. Cached instances are
//! dropped, never patched, when their record changes.

use crate::configure::{Setup, Workflow};
use crate::provider::{self, Instance};
use crate::{deepseek, openai};
use ocore::{
    Backend, ConfigStore, Error, Event, EventBus, EventName, InvocationRequest, Prompter,
    ProviderConfig, ProviderInfo, Result,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Constructor for one registered variant.
pub struct Entry<B: Backend> {
    /// Static identity of the variant.
    pub info: ProviderInfo,
    /// Build an instance from a record of this variant.
    pub build: fn(ProviderConfig, B) -> Result<Instance<B>>,
    /// Configuration workflow knowledge.
    pub setup: &'static dyn Setup,
}

impl<B: Backend> Clone for Entry<B> {
    fn clone(&self) -> Self {
        Self {
            info: self.info,
            build: self.build,
            setup: self.setup,
        }
    }
}

/// Registry of provider variants and loaded instances.
pub struct ProviderRegistry<B: Backend> {
    store: Arc<dyn ConfigStore>,
    backend: B,
    events: Arc<EventBus>,
    entries: BTreeMap<&'static str, Entry<B>>,
    cache: Mutex<BTreeMap<String, Arc<Instance<B>>>>,
    locks: Mutex<BTreeMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<B: Backend> ProviderRegistry<B> {
    /// Create a registry with every built-in variant registered.
    pub fn new(store: Arc<dyn ConfigStore>, backend: B) -> Self {
        let mut registry = Self {
            store,
            backend,
            events: Arc::new(EventBus::new()),
            entries: BTreeMap::new(),
            cache: Mutex::new(BTreeMap::new()),
            locks: Mutex::new(BTreeMap::new()),
        };
        registry.register(Entry {
            info: deepseek::INFO,
            build: provider::build_deepseek,
            setup: &deepseek::SETUP,
        });
        registry.register(Entry {
            info: openai::INFO,
            build: provider::build_openai,
            setup: &openai::SETUP,
        });
        registry
    }

    /// Register `entry`, replacing any variant with the same id.
    pub fn register(&mut self, entry: Entry<B>) {
        tracing::debug!("registering provider {}", entry.info.id);
        self.entries.insert(entry.info.id, entry);
    }

    /// Registered variants, ordered by id.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.entries.values().map(|entry| entry.info).collect()
    }

    /// Notification bus shared with dependents.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Every persisted record.
    pub fn list(&self) -> Result<Vec<ProviderConfig>> {
        self.store.list()
    }

    fn entry(&self, provider_id: &str) -> Result<&Entry<B>> {
        self.entries
            .get(provider_id)
            .ok_or_else(|| Error::UnknownProvider(provider_id.to_owned()))
    }

    /// The initialized instance for `nickname`, loading it on first use.
    pub async fn get(&self, nickname: &str) -> Result<Arc<Instance<B>>> {
        let cached = self.cache.lock().get(nickname).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }

        let instance = Arc::new(self.load(nickname).await?);
        Ok(self
            .cache
            .lock()
            .entry(nickname.to_owned())
            .or_insert(instance)
            .clone())
    }

    async fn load(&self, nickname: &str) -> Result<Instance<B>> {
        let config = self
            .store
            .get(nickname)?
            .ok_or_else(|| Error::ConfigNotFound(nickname.to_owned()))?;
        let entry = self.entry(config.provider_id())?;
        tracing::debug!("loading {} provider for {nickname}", entry.info.name);
        let instance = (entry.build)(config, self.backend.clone())?;
        instance.initialize().await?;
        Ok(instance)
    }

    /// Run the configuration workflow of `provider_id` for `nickname`.
    ///
    /// Runs for the same nickname are serialized. On success the cached
    /// instance is dropped and `modelProvidersUpdated` is published.
    pub async fn configure<P: Prompter>(
        &self,
        provider_id: &str,
        nickname: &str,
        prompter: &P,
    ) -> Result<ProviderConfig> {
        let setup = self.entry(provider_id)?.setup;
        let lock = self
            .locks
            .lock()
            .entry(nickname.to_owned())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        let mut workflow = Workflow::new(nickname, &*self.store, prompter, &self.backend);
        let config = workflow.run(setup).await?;

        self.invalidate(nickname);
        self.events
            .publish(Event::now(EventName::ModelProvidersUpdated));
        Ok(config)
    }

    /// Drop the cached instance of `nickname`. Returns whether one was
    /// cached.
    pub fn invalidate(&self, nickname: &str) -> bool {
        let removed = self.cache.lock().remove(nickname).is_some();
        if removed {
            tracing::debug!("invalidated cached provider {nickname}");
        }
        removed
    }

    /// Rebuild every cached instance from the store and notify dependents.
    ///
    /// Instances that fail to rebuild are logged and left out of the cache.
    /// Returns how many were rebuilt.
    pub async fn reload(&self) -> usize {
        let stale: Vec<String> = std::mem::take(&mut *self.cache.lock())
            .into_keys()
            .collect();
        tracing::info!("reloading {} providers", stale.len());

        let mut rebuilt = 0;
        for nickname in stale {
            match self.load(&nickname).await {
                Ok(instance) => {
                    self.cache.lock().insert(nickname, Arc::new(instance));
                    rebuilt += 1;
                }
                Err(e) => tracing::warn!("failed to reload provider {nickname}: {e}"),
            }
        }

        self.events
            .publish(Event::now(EventName::InlineCompletionProviderUpdated));
        self.events
            .publish(Event::now(EventName::ModelProvidersUpdated));
        rebuilt
    }

    /// Complete `request` with the provider configured as `nickname`.
    pub async fn complete(&self, nickname: &str, request: InvocationRequest) -> Result<String> {
        self.get(nickname).await?.invoke(request).await
    }

    /// Nicknames with a loaded instance.
    pub fn cached(&self) -> Vec<String> {
        self.cache.lock().keys().cloned().collect()
    }

    /// Release every instance and subscriber.
    pub fn dispose(self) {
        let cached = std::mem::take(&mut *self.cache.lock());
        tracing::debug!("disposing registry with {} cached providers", cached.len());
        self.events.clear();
    }
}

impl<B: Backend> std::fmt::Debug for ProviderRegistry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.entries.keys().collect::<Vec<_>>())
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}
