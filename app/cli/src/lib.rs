//! oopilot command-line host.
//!
//! Wires the provider registry to a TOML config store, terminal prompts and
//! the editor's data directory, which stands in for the host environment
//! probed by the compatibility gate.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};
pub use {
    cmd::CompleteCmd,
    host::EditorHost,
    store::TomlStore,
    terminal::{CliProgress, TerminalPrompter},
};

mod cmd;
pub mod host;
pub mod store;
pub mod terminal;

/// Inline completion providers for the editor
#[derive(Debug, Parser)]
#[command(name = "oopilot", version, about)]
pub struct Cli {
    /// Provider config file [default: ~/.config/oopilot/providers.toml]
    #[arg(long, global = true, env = "OOPILOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Editor data directory holding argv.json and extensions/ [default: ~/.vscode]
    #[arg(long, global = true, env = "OOPILOT_EDITOR_DIR")]
    pub editor_dir: Option<PathBuf>,

    /// Verbosity level (use -v, -vv, -vvv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the compatibility check
    Check,

    /// Configure a provider under a nickname
    Configure {
        /// Provider id, e.g. deepseek-completion
        provider: String,
        /// Nickname the record is stored under
        nickname: String,
    },

    /// Complete the text between a prefix and a suffix
    Complete(CompleteCmd),

    /// Rebuild loaded providers and notify dependents
    Reload,

    /// List configured providers
    List,

    /// List available provider variants
    Providers,
}

impl Cli {
    /// Initialize tracing subscriber based on verbosity
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let directive = match self.verbose {
                0 => "info",
                1 => "oopilot=debug",
                2 => "oopilot=trace",
                _ => "trace",
            };
            EnvFilter::new(directive)
        });

        fmt()
            .without_time()
            .with_env_filter(filter)
            .with_target(self.verbose != 0)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Path of the provider config file.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(TomlStore::default_path)
    }

    /// Editor data directory.
    pub fn editor_dir(&self) -> PathBuf {
        self.editor_dir.clone().unwrap_or_else(EditorHost::default_dir)
    }
}
