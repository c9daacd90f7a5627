//! Provider variants, HTTP backend, configuration workflow and registry.
//!
//! `Instance` wraps the concrete variants (DeepSeek, OpenAI) behind enum
//! dispatch. `ProviderRegistry` maps provider ids to constructors, caches
//! instances by nickname and drops them whenever their config changes.

pub mod configure;
pub mod deepseek;
mod http;
mod invoke;
pub mod openai;
mod provider;
mod registry;

pub use {
    configure::{Credentials, Field, Setup, State, Workflow},
    deepseek::DeepSeek,
    http::HttpBackend,
    invoke::invoke,
    openai::OpenAI,
    provider::Instance,
    registry::{Entry, ProviderRegistry},
};
