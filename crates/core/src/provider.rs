//! Provider capability contract.

use crate::{Backend, ConfigStore, InvocationRequest, Prompter, ProviderConfig, Result};

/// Static identity of a provider variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Human-readable vendor name.
    pub name: &'static str,
    /// Stable id stored in every record of this variant.
    pub id: &'static str,
    /// Capability class, e.g. `"completion"`.
    pub kind: &'static str,
}

/// The operation set every provider variant implements.
///
/// Instances wrap one validated `ProviderConfig` and are rebuilt, never
/// mutated, when that config changes. `configure` is the static
/// interactive workflow producing such a config.
pub trait Provider: Sized + Send + Sync {
    /// Transport the variant talks through.
    type Backend: Backend;

    /// Name, id and type of the variant.
    const INFO: ProviderInfo;

    /// Load the record stored under `nickname`.
    ///
    /// Fails with `ConfigNotFound` if there is none and `ConfigMismatch` if
    /// it belongs to another variant. Performs no network call.
    fn load(nickname: &str, store: &dyn ConfigStore, backend: Self::Backend) -> Result<Self>;

    /// The record this instance was built from.
    fn config(&self) -> &ProviderConfig;

    /// One-time setup. Repeat calls are no-ops.
    fn initialize(&self) -> impl Future<Output = Result<()>> + Send;

    /// Run one completion and return the generated text verbatim.
    fn invoke(&self, request: InvocationRequest) -> impl Future<Output = Result<String>> + Send;

    /// Interactively create or update the record stored under `nickname`.
    ///
    /// This takes no lock and touches no cache. Callers must serialize runs
    /// for one nickname and drop any instance built from the old record;
    /// the model registry's `configure` does both.
    fn configure<P: Prompter>(
        nickname: &str,
        store: &dyn ConfigStore,
        prompter: &P,
        backend: &Self::Backend,
    ) -> impl Future<Output = Result<ProviderConfig>> + Send;
}
