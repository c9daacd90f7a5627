//! Core abstractions for the oopilot provider pipeline.
//!
//! Holds the persisted `ProviderConfig` record, the error taxonomy, the
//! collaborator contracts the pipeline consumes (`ConfigStore`, `Prompter`,
//! `Backend`), the `Provider` capability contract every variant implements,
//! the compatibility gate and the change-notification bus.

pub use {
    backend::{Backend, Completion, CompletionChoice, CompletionRequest, Endpoint, ModelList},
    config::{BackendConfig, ConfigStore, DeepSeekConfig, MemoryStore, OpenAIConfig, ProviderConfig},
    error::{Error, Result},
    event::{Event, EventBus, EventName, Payload},
    prompt::{PickItem, PickOptions, ProgressOptions, ProgressReporter, PromptOptions, Prompter},
    provider::{Provider, ProviderInfo},
    request::InvocationRequest,
};
pub use tokio_util::sync::CancellationToken;

pub mod backend;
pub mod config;
mod error;
pub mod event;
pub mod gate;
pub mod prompt;
mod provider;
mod request;
#[cfg(feature = "testing")]
pub mod testing;
