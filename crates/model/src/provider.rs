//! Provider instances.
//!
//! `Instance` is an enum over the concrete variants. Callers holding a
//! nickname never see the variant; the registry picks it from the record's
//! `providerId`.

use crate::deepseek::DeepSeek;
use crate::openai::OpenAI;
use ocore::{Backend, InvocationRequest, Provider, ProviderConfig, ProviderInfo, Result};

/// A loaded provider of any variant.
pub enum Instance<B: Backend> {
    /// DeepSeek FIM completions on the beta endpoint.
    DeepSeek(DeepSeek<B>),
    /// OpenAI legacy completions.
    OpenAI(OpenAI<B>),
}

impl<B: Backend> Instance<B> {
    /// Static identity of the wrapped variant.
    pub fn info(&self) -> ProviderInfo {
        match self {
            Self::DeepSeek(_) => <DeepSeek<B> as Provider>::INFO,
            Self::OpenAI(_) => <OpenAI<B> as Provider>::INFO,
        }
    }

    /// The record this instance was built from.
    pub fn config(&self) -> &ProviderConfig {
        match self {
            Self::DeepSeek(p) => p.config(),
            Self::OpenAI(p) => p.config(),
        }
    }

    /// Nickname of the record.
    pub fn nickname(&self) -> &str {
        &self.config().nickname
    }

    /// Prepare the instance for use. Idempotent.
    pub async fn initialize(&self) -> Result<()> {
        match self {
            Self::DeepSeek(p) => p.initialize().await,
            Self::OpenAI(p) => p.initialize().await,
        }
    }

    /// Run one completion.
    pub async fn invoke(&self, request: InvocationRequest) -> Result<String> {
        match self {
            Self::DeepSeek(p) => p.invoke(request).await,
            Self::OpenAI(p) => p.invoke(request).await,
        }
    }
}

impl<B: Backend> std::fmt::Debug for Instance<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("provider", &self.info().id)
            .field("nickname", &self.nickname())
            .field("model", &self.config().model)
            .finish()
    }
}

/// Build a DeepSeek instance from a loaded record.
pub(crate) fn build_deepseek<B: Backend>(config: ProviderConfig, backend: B) -> Result<Instance<B>> {
    DeepSeek::from_config(config, backend).map(Instance::DeepSeek)
}

/// Build an OpenAI instance from a loaded record.
pub(crate) fn build_openai<B: Backend>(config: ProviderConfig, backend: B) -> Result<Instance<B>> {
    OpenAI::from_config(config, backend).map(Instance::OpenAI)
}
