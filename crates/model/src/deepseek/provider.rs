//! Provider contract implementation for DeepSeek.

use super::{DeepSeek, INFO, SETUP};
use crate::configure::Workflow;
use ocore::{
    Backend, BackendConfig, ConfigStore, Endpoint, Error, InvocationRequest, Prompter, Provider,
    ProviderConfig, ProviderInfo, Result,
};
use std::sync::OnceLock;
use url::Url;

impl<B: Backend> DeepSeek<B> {
    /// Wrap an already loaded record. Fails with `ConfigMismatch` if it
    /// belongs to another variant.
    pub fn from_config(config: ProviderConfig, backend: B) -> Result<Self> {
        let settings = match &config.backend {
            BackendConfig::DeepSeek(settings) => settings.clone(),
            other => {
                return Err(Error::ConfigMismatch {
                    nickname: config.nickname.clone(),
                    expected: INFO.id,
                    found: other.provider_id(),
                });
            }
        };
        tracing::debug!("DeepSeek provider built for {}", config.nickname);
        Ok(Self {
            config,
            settings,
            backend,
            endpoint: OnceLock::new(),
        })
    }

    fn endpoint(&self) -> Result<&Endpoint> {
        if let Some(endpoint) = self.endpoint.get() {
            return Ok(endpoint);
        }
        Url::parse(&self.settings.beta_url).map_err(|e| Error::ValidationFailed {
            field: "betaUrl".into(),
            reason: e.to_string(),
        })?;
        Ok(self.endpoint.get_or_init(|| {
            Endpoint::new(&self.settings.beta_url, &self.settings.api_key)
        }))
    }
}

impl<B: Backend> Provider for DeepSeek<B> {
    type Backend = B;

    const INFO: ProviderInfo = INFO;

    fn load(nickname: &str, store: &dyn ConfigStore, backend: B) -> Result<Self> {
        tracing::info!("initializing DeepSeek provider with nickname: {nickname}");
        let config = store
            .get(nickname)?
            .ok_or_else(|| Error::ConfigNotFound(nickname.to_owned()))?;
        Self::from_config(config, backend)
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn initialize(&self) -> Result<()> {
        self.endpoint().map(|_| ())
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<String> {
        tracing::info!("invoking DeepSeek model: {}", self.config.model);
        let endpoint = self.endpoint()?;
        crate::invoke(&self.backend, endpoint, &self.config.model, request).await
    }

    /// Unlocked and uncached. [`crate::ProviderRegistry::configure`] is the
    /// serialized form.
    async fn configure<P: Prompter>(
        nickname: &str,
        store: &dyn ConfigStore,
        prompter: &P,
        backend: &B,
    ) -> Result<ProviderConfig> {
        let mut workflow = Workflow::new(nickname, store, prompter, backend);
        workflow.run(&SETUP).await
    }
}
