//! Interactive configuration workflow.
//!
//! ```text
//! CollectCredentials -> ValidateCredentials -> DiscoverModels
//!   -> SelectModel -> TestConnection -> Persist -> Done
//! ```
//!
//! Any step may move to `Aborted`. The record is built in memory and written
//! with a single `ConfigStore::set` after the test call succeeded, so a
//! nickname never points at unverified credentials.

use ocore::{
    Backend, ConfigStore, Endpoint, Error, InvocationRequest, PickItem, PickOptions,
    ProgressOptions, ProgressReporter, PromptOptions, Prompter, ProviderConfig, ProviderInfo,
    Result,
};
use std::collections::BTreeMap;
use url::Url;

const TEST_PROMPT: &str = "How";
const TEST_SUFFIX: &str = "are you?";
const TEST_MAX_TOKENS: u32 = 3;
const PROGRESS_TITLE: &str = "oopilot";

/// One credential prompted for by the workflow.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Key in [`Credentials`], matching the record field name.
    pub key: &'static str,
    /// Human-readable name, e.g. "DeepSeek API key".
    pub label: &'static str,
    /// Value offered when no record exists yet.
    pub default: Option<&'static str>,
    pub placeholder: &'static str,
    pub help: &'static str,
    /// Whether the value must parse as an http(s) URL.
    pub url: bool,
}

/// Collected credential values keyed by [`Field::key`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<&'static str, String>);

impl Credentials {
    /// Value of `key`, empty if missing.
    pub fn get(&self, key: &str) -> &str {
        self.value(key).unwrap_or_default()
    }

    /// Value of `key`, if collected.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set `key` to `value`.
    pub fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }
}

impl<const N: usize> From<[(&'static str, String); N]> for Credentials {
    fn from(values: [(&'static str, String); N]) -> Self {
        Self(values.into_iter().collect())
    }
}

/// Variant-specific knowledge the workflow needs.
pub trait Setup: Send + Sync {
    /// Identity of the variant being configured.
    fn info(&self) -> ProviderInfo;

    /// Credentials to prompt for, in prompt order.
    fn fields(&self) -> &'static [Field];

    /// Credentials of an existing record, if it belongs to this variant.
    fn existing(&self, config: &ProviderConfig) -> Option<Credentials>;

    /// Endpoint serving the model listing.
    fn listing_endpoint(&self, credentials: &Credentials) -> Endpoint;

    /// Endpoint serving completions.
    fn completion_endpoint(&self, credentials: &Credentials) -> Endpoint;

    /// The full record, including static metadata such as the context
    /// window.
    fn build(&self, nickname: &str, model: &str, credentials: Credentials) -> ProviderConfig;
}

/// Workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    CollectCredentials,
    ValidateCredentials,
    DiscoverModels,
    SelectModel,
    TestConnection,
    Persist,
    Done,
    Aborted,
}

/// One configuration run for one nickname.
pub struct Workflow<'a, P, B> {
    nickname: &'a str,
    store: &'a dyn ConfigStore,
    prompter: &'a P,
    backend: &'a B,
    state: State,
    trail: Vec<State>,
}

impl<'a, P: Prompter, B: Backend> Workflow<'a, P, B> {
    /// Prepare a run. Nothing is prompted until [`Workflow::run`].
    pub fn new(
        nickname: &'a str,
        store: &'a dyn ConfigStore,
        prompter: &'a P,
        backend: &'a B,
    ) -> Self {
        Self {
            nickname,
            store,
            prompter,
            backend,
            state: State::CollectCredentials,
            trail: vec![State::CollectCredentials],
        }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Every state entered so far, in order.
    pub fn trail(&self) -> &[State] {
        &self.trail
    }

    /// Drive the workflow to `Done` or `Aborted`.
    pub async fn run(&mut self, setup: &dyn Setup) -> Result<ProviderConfig> {
        tracing::info!(
            "configuring {} provider with nickname: {}",
            setup.info().name,
            self.nickname
        );
        match self.drive(setup).await {
            Ok(config) => {
                self.enter(State::Done);
                tracing::info!("successfully configured provider: {}", self.nickname);
                Ok(config)
            }
            Err(e) => {
                let from = self.state;
                self.enter(State::Aborted);
                if e.is_cancellation() {
                    tracing::debug!("configuration of {} aborted in {from:?}: {e}", self.nickname);
                } else {
                    tracing::warn!("configuration of {} failed in {from:?}: {e}", self.nickname);
                }
                Err(e)
            }
        }
    }

    async fn drive(&mut self, setup: &dyn Setup) -> Result<ProviderConfig> {
        let existing = self
            .store
            .get(self.nickname)?
            .and_then(|config| setup.existing(&config))
            .unwrap_or_default();
        let collected = self.collect(setup.fields(), &existing).await?;

        self.enter(State::ValidateCredentials);
        let credentials = validate(setup.fields(), collected)?;

        self.enter(State::DiscoverModels);
        let models = self.discover(&setup.listing_endpoint(&credentials)).await?;

        self.enter(State::SelectModel);
        let model = self.select(models).await?;

        self.enter(State::TestConnection);
        self.test(&setup.completion_endpoint(&credentials), &model)
            .await?;

        self.enter(State::Persist);
        let config = setup.build(self.nickname, &model, credentials);
        tracing::info!("saving provider configuration for: {}", self.nickname);
        self.store.set(self.nickname, &config)?;
        Ok(config)
    }

    fn enter(&mut self, state: State) {
        tracing::debug!("{}: {:?} -> {:?}", self.nickname, self.state, state);
        self.state = state;
        self.trail.push(state);
    }

    async fn collect(&self, fields: &[Field], existing: &Credentials) -> Result<Credentials> {
        let mut collected = Credentials::default();
        for field in fields {
            tracing::debug!("prompting user for {}", field.label);
            let mut options = PromptOptions::non_empty(
                format!("oopilot: Enter your {}", field.label),
                format!("{} cannot be empty", field.label),
            );
            options.initial_value = existing
                .value(field.key)
                .or(field.default)
                .map(str::to_owned);
            options.placeholder = Some(field.placeholder.to_owned());
            options.help = Some(field.help.to_owned());

            let value = self
                .prompter
                .prompt_string(options)
                .await
                .ok_or_else(|| Error::UserCancelled(format!("{} input", field.label)))?;
            tracing::debug!("{} input received", field.label);
            collected.insert(field.key, value.trim());
        }
        Ok(collected)
    }

    async fn discover(&self, endpoint: &Endpoint) -> Result<Vec<String>> {
        let progress = self.prompter.progress(ProgressOptions {
            title: PROGRESS_TITLE.into(),
            cancellable: true,
        });
        progress.report("Fetching available models");
        let cancel = progress.cancellation();

        let models = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(Error::UserCancelled("model discovery".into()));
            }
            models = self.backend.list_models(endpoint) => models?,
        };
        tracing::debug!("fetched {} models", models.len());
        if models.is_empty() {
            return Err(Error::NoModelsAvailable);
        }
        Ok(models)
    }

    async fn select(&self, models: Vec<String>) -> Result<String> {
        let items: Vec<PickItem> = models.iter().cloned().map(PickItem::from).collect();
        let options = PickOptions {
            title: "oopilot: Select the completion model".into(),
            placeholder: Some("Select a completion model".into()),
        };
        let index = self
            .prompter
            .pick_one(&items, options)
            .await
            .ok_or_else(|| Error::UserCancelled("model selection".into()))?;

        models
            .into_iter()
            .nth(index)
            .ok_or_else(|| Error::ValidationFailed {
                field: "model".into(),
                reason: format!("no model at index {index}"),
            })
    }

    async fn test(&self, endpoint: &Endpoint, model: &str) -> Result<()> {
        let progress = self.prompter.progress(ProgressOptions {
            title: PROGRESS_TITLE.into(),
            cancellable: false,
        });
        progress.report("Testing connection credentials");
        tracing::debug!("testing connection credentials against {model}");

        let request =
            InvocationRequest::new(TEST_PROMPT, TEST_SUFFIX).with_max_tokens(TEST_MAX_TOKENS);
        crate::invoke(self.backend, endpoint, model, request)
            .await
            .map_err(|e| Error::CredentialTestFailed(Box::new(e)))?;
        tracing::info!("connection credentials test successful");
        Ok(())
    }
}

fn validate(fields: &[Field], credentials: Credentials) -> Result<Credentials> {
    for field in fields {
        let value = credentials.get(field.key);
        let rejected = |reason: String| Error::ValidationFailed {
            field: field.label.into(),
            reason,
        };
        if value.is_empty() {
            return Err(rejected("cannot be empty".into()));
        }
        if field.url {
            let url = Url::parse(value).map_err(|e| rejected(format!("invalid URL: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(rejected(format!("unsupported scheme {}", url.scheme())));
            }
        }
    }
    Ok(credentials)
}
