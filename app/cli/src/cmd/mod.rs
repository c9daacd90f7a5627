//! Command dispatch.

use crate::{Cli, Command, EditorHost, TerminalPrompter, TomlStore};
use anyhow::{Context, Result};
use console::style;
use model::{HttpBackend, ProviderRegistry};
use ocore::{Backend, ConfigStore, EventName, gate};
use std::sync::Arc;

pub use complete::CompleteCmd;

mod complete;

impl Cli {
    /// Run the selected command.
    pub async fn run(self) -> Result<()> {
        let config = self.config_path();
        tracing::info!(
            "oopilot {} on {}/{}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        tracing::info!("provider config: {}", config.display());

        let host = EditorHost::new(self.editor_dir());
        if self.command.needs_gate() {
            gate::enforce(&host)
                .await
                .context("compatibility check failed")?;
        }

        let store: Arc<dyn ConfigStore> = Arc::new(TomlStore::new(config));
        let registry = ProviderRegistry::new(store, HttpBackend::default());
        for name in [
            EventName::InlineCompletionProviderUpdated,
            EventName::ModelProvidersUpdated,
        ] {
            registry.events().subscribe(name, |event| {
                tracing::info!(
                    "{} at {}",
                    event.name.as_str(),
                    event.payload.updated_at
                );
                Ok(())
            });
        }

        let result = match self.command {
            Command::Check => {
                println!("{} oopilot can run in this editor", style("✓").green());
                Ok(())
            }
            Command::Configure { provider, nickname } => {
                configure(&registry, &provider, &nickname).await
            }
            Command::Complete(cmd) => cmd.run(&registry).await,
            Command::Reload => reload(&registry).await,
            Command::List => list(&registry),
            Command::Providers => {
                providers(&registry);
                Ok(())
            }
        };
        registry.dispose();
        result
    }
}

impl Command {
    /// Whether the command needs a compatible editor.
    pub fn needs_gate(&self) -> bool {
        !matches!(self, Self::List | Self::Providers)
    }
}

async fn configure<B: Backend>(
    registry: &ProviderRegistry<B>,
    provider: &str,
    nickname: &str,
) -> Result<()> {
    match registry.configure(provider, nickname, &TerminalPrompter).await {
        Ok(config) => {
            println!(
                "{} {nickname} configured with {} ({})",
                style("✓").green(),
                config.model,
                config.provider_id()
            );
            Ok(())
        }
        Err(e) if e.is_cancellation() => {
            eprintln!("Configuration cancelled");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("failed to configure {nickname}")),
    }
}

async fn reload<B: Backend>(registry: &ProviderRegistry<B>) -> Result<()> {
    let configs = registry.list().context("reading provider records")?;
    for config in &configs {
        if let Err(e) = registry.get(&config.nickname).await {
            tracing::warn!("skipping {}: {e}", config.nickname);
        }
    }
    let rebuilt = registry.reload().await;
    println!("Reloaded {rebuilt} of {} providers", configs.len());
    Ok(())
}

fn list<B: Backend>(registry: &ProviderRegistry<B>) -> Result<()> {
    let configs = registry.list().context("reading provider records")?;
    if configs.is_empty() {
        println!("No providers configured.");
        return Ok(());
    }
    for config in configs {
        println!(
            "  {} — {} ({})",
            style(&config.nickname).bold(),
            config.model,
            config.provider_id()
        );
    }
    Ok(())
}

fn providers<B: Backend>(registry: &ProviderRegistry<B>) {
    for info in registry.providers() {
        println!("  {:<22} {} [{}]", info.id, info.name, info.kind);
    }
}
