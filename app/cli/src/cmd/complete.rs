//! One-shot completion.

use anyhow::{Context, Result};
use clap::Args;
use model::ProviderRegistry;
use ocore::{Backend, Error, InvocationRequest};
use std::io::Write;

/// Complete the text between a prefix and a suffix
#[derive(Debug, Args)]
pub struct CompleteCmd {
    /// Nickname of the configured provider
    pub nickname: String,

    /// Text before the cursor
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Text after the cursor
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Generation budget in tokens
    #[arg(long, default_value_t = 128)]
    pub max_tokens: u32,

    /// Sequence that halts generation (repeatable)
    #[arg(long)]
    pub stop: Vec<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,
}

impl CompleteCmd {
    /// The invocation request described by the arguments.
    pub fn request(&self) -> InvocationRequest {
        let mut request = InvocationRequest::new(&self.prefix, &self.suffix)
            .with_max_tokens(self.max_tokens);
        if !self.stop.is_empty() {
            request = request.with_stop(self.stop.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }

    /// Run the completion, printing the generated text. Ctrl-C cancels.
    pub async fn run<B: Backend>(self, registry: &ProviderRegistry<B>) -> Result<()> {
        let request = self.request();
        let cancel = request.cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let result = registry.complete(&self.nickname, request).await;
        interrupt.abort();

        match result {
            Ok(text) => {
                let mut stdout = std::io::stdout();
                writeln!(stdout, "{text}")?;
                stdout.flush()?;
                Ok(())
            }
            Err(Error::InvocationCancelled) => {
                eprintln!("Completion cancelled");
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("completion with {} failed", self.nickname)),
        }
    }
}
