//! Prompt and progress collaborator contract.
//!
//! The pipeline never touches UI primitives; the host injects a `Prompter`
//! that asks the user for strings, single choices, and shows progress.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Field validator. Returns the message to show for a rejected value.
pub type Validator = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Options for a free-text prompt.
#[derive(Clone)]
pub struct PromptOptions {
    /// Prompt title.
    pub title: String,
    /// Pre-filled value.
    pub initial_value: Option<String>,
    /// Example value shown while the input is empty.
    pub placeholder: Option<String>,
    /// Additional guidance shown next to the input.
    pub help: Option<String>,
    /// Rejects values the host must not accept.
    pub validator: Validator,
}

impl PromptOptions {
    /// A prompt that rejects empty-after-trim input with `message`.
    pub fn non_empty(title: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            title: title.into(),
            initial_value: None,
            placeholder: None,
            help: None,
            validator: Arc::new(move |value: &str| {
                value.trim().is_empty().then(|| message.clone())
            }),
        }
    }

    /// Run the validator against `value`.
    pub fn validate(&self, value: &str) -> Option<String> {
        (self.validator)(value)
    }
}

impl std::fmt::Debug for PromptOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptOptions")
            .field("title", &self.title)
            .field("initial_value", &self.initial_value)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

/// One entry of a single-choice list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
}

impl From<String> for PickItem {
    fn from(label: String) -> Self {
        Self { label }
    }
}

/// Options for a single-choice list.
#[derive(Debug, Clone, Default)]
pub struct PickOptions {
    pub title: String,
    pub placeholder: Option<String>,
}

/// Options for a progress indication.
#[derive(Debug, Clone)]
pub struct ProgressOptions {
    pub title: String,
    /// Whether the user may abort the work in progress.
    pub cancellable: bool,
}

/// Live progress indication. Dropping it ends the indication.
pub trait ProgressReporter: Send {
    /// Update the progress message.
    fn report(&self, message: &str);

    /// Fires when the user aborts a cancellable progress. Never fires for
    /// a non-cancellable one.
    fn cancellation(&self) -> CancellationToken;
}

/// Host-side interactive prompts.
pub trait Prompter: Send + Sync {
    /// Progress indication handed out by [`Prompter::progress`].
    type Reporter: ProgressReporter;

    /// Ask for a string. `None` means the user cancelled.
    fn prompt_string(&self, options: PromptOptions) -> impl Future<Output = Option<String>> + Send;

    /// Ask the user to pick one of `items`. Returns the chosen index, or
    /// `None` if the user cancelled.
    fn pick_one(
        &self,
        items: &[PickItem],
        options: PickOptions,
    ) -> impl Future<Output = Option<usize>> + Send;

    /// Start a progress indication.
    fn progress(&self, options: ProgressOptions) -> Self::Reporter;
}
