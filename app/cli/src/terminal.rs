//! Terminal prompts and progress.
//!
//! dialoguer blocks on stdin, so every prompt runs on the blocking pool.
//! Any prompt failure, including Esc and a closed stdin, counts as a
//! cancellation.

use console::style;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use ocore::{
    CancellationToken, PickItem, PickOptions, ProgressOptions, ProgressReporter, PromptOptions,
    Prompter,
};
use std::time::Duration;
use tokio::task::JoinHandle;

/// [`Prompter`] backed by dialoguer and indicatif.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    type Reporter = CliProgress;

    async fn prompt_string(&self, options: PromptOptions) -> Option<String> {
        if let Some(help) = &options.help {
            eprintln!("{}", style(help).dim());
        }
        if let Some(placeholder) = &options.placeholder {
            eprintln!("{}", style(placeholder).dim().italic());
        }

        let answer = tokio::task::spawn_blocking(move || {
            let theme = ColorfulTheme::default();
            let mut input = Input::<String>::with_theme(&theme).with_prompt(options.title.clone());
            if let Some(initial) = options.initial_value.clone() {
                input = input.with_initial_text(initial);
            }
            input
                .validate_with(move |value: &String| match options.validate(value) {
                    Some(message) => Err(message),
                    None => Ok(()),
                })
                .interact_text()
        })
        .await;

        match answer {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::debug!("prompt aborted: {e}");
                None
            }
            Err(e) => {
                tracing::warn!("prompt task failed: {e}");
                None
            }
        }
    }

    async fn pick_one(&self, items: &[PickItem], options: PickOptions) -> Option<usize> {
        let labels: Vec<String> = items.iter().map(|item| item.label.clone()).collect();
        let choice = tokio::task::spawn_blocking(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(options.title)
                .items(&labels)
                .default(0)
                .interact_opt()
        })
        .await;

        match choice {
            Ok(Ok(index)) => index,
            Ok(Err(e)) => {
                tracing::debug!("selection aborted: {e}");
                None
            }
            Err(e) => {
                tracing::warn!("selection task failed: {e}");
                None
            }
        }
    }

    fn progress(&self, options: ProgressOptions) -> CliProgress {
        CliProgress::start(options)
    }
}

/// Spinner on stderr. Ctrl-C aborts it when it is cancellable.
#[derive(Debug)]
pub struct CliProgress {
    bar: ProgressBar,
    cancel: CancellationToken,
    interrupt: Option<JoinHandle<()>>,
}

impl CliProgress {
    /// Start spinning.
    pub fn start(options: ProgressOptions) -> Self {
        let bar = ProgressBar::new_spinner();
        let template = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(template);
        bar.set_prefix(options.title);
        bar.enable_steady_tick(Duration::from_millis(100));

        let cancel = CancellationToken::new();
        let interrupt = options.cancellable.then(|| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!("progress interrupted");
                    cancel.cancel();
                }
            })
        });

        Self {
            bar,
            cancel,
            interrupt,
        }
    }
}

impl ProgressReporter for CliProgress {
    fn report(&self, message: &str) {
        self.bar.set_message(message.to_owned());
    }

    fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
        if let Some(interrupt) = self.interrupt.take() {
            interrupt.abort();
        }
    }
}
