//! Editor host probed by the compatibility gate.
//!
//! The capability probe reads the editor's `argv.json`; the feature needs
//! its id listed under `enable-proposed-api`. The conflict probe scans the
//! installed extensions for GitHub Copilot.
//!
//! `argv.json` is JSONC: comments and trailing commas are allowed.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Select, theme::ColorfulTheme};
use jsonc_parser::ParseOptions;
use ocore::gate::{Environment, Remediation, Verdict};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::PathBuf;

/// Identifier the editor must allow proposed API access for.
pub const FEATURE_ID: &str = "oopilot.oopilot";

/// Display identifier of the conflicting extension.
pub const CONFLICTING_EXTENSION: &str = "GitHub.copilot";

const PROPOSED_API_KEY: &str = "enable-proposed-api";

/// The editor installation rooted at its data directory.
#[derive(Debug, Clone)]
pub struct EditorHost {
    dir: PathBuf,
}

impl EditorHost {
    /// A host rooted at `dir`, e.g. `~/.vscode`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default data directory: `~/.vscode`.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vscode")
    }

    /// Path of the runtime arguments file.
    pub fn argv_path(&self) -> PathBuf {
        self.dir.join("argv.json")
    }

    /// Path the original `argv.json` is copied to before it is rewritten.
    pub fn backup_path(&self) -> PathBuf {
        self.dir.join("argv.json.bak")
    }

    fn read_argv(&self) -> Result<Map<String, Value>> {
        let path = self.argv_path();
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let value = jsonc_parser::parse_to_serde_value(&contents, &ParseOptions::default())
            .with_context(|| format!("parsing {}", path.display()))?;
        match value {
            None => Ok(Map::new()),
            Some(Value::Object(argv)) => Ok(argv),
            Some(_) => anyhow::bail!("{} is not a JSON object", path.display()),
        }
    }

    /// Whether `argv.json` lists [`FEATURE_ID`] under `enable-proposed-api`.
    pub fn proposed_api_enabled(&self) -> Result<bool> {
        let argv = self.read_argv()?;
        Ok(argv
            .get(PROPOSED_API_KEY)
            .and_then(Value::as_array)
            .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(FEATURE_ID))))
    }

    /// Add [`FEATURE_ID`] to `enable-proposed-api`, creating `argv.json` if
    /// needed. Returns whether the file changed.
    ///
    /// The rewrite is plain JSON, so comments are lost; the previous file is
    /// kept at [`backup_path`](Self::backup_path). The new file replaces the
    /// old one atomically.
    pub fn enable_proposed_api(&self) -> Result<bool> {
        let path = self.argv_path();
        let mut argv = if path.exists() {
            self.read_argv()?
        } else {
            Map::new()
        };

        let ids = argv
            .entry(PROPOSED_API_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        let Some(ids) = ids.as_array_mut() else {
            anyhow::bail!("{PROPOSED_API_KEY} in {} is not a list", path.display());
        };
        if ids.iter().any(|id| id.as_str() == Some(FEATURE_ID)) {
            return Ok(false);
        }
        ids.push(Value::String(FEATURE_ID.into()));

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        if path.exists() {
            let backup = self.backup_path();
            std::fs::copy(&path, &backup)
                .with_context(|| format!("backing up {} to {}", path.display(), backup.display()))?;
        }

        let contents = serde_json::to_string_pretty(&argv)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("creating temp file in {}", self.dir.display()))?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("added {FEATURE_ID} to {PROPOSED_API_KEY} in {}", path.display());
        Ok(true)
    }

    fn apply(&self, remediation: Remediation) {
        match remediation {
            Remediation::Restart => match self.enable_proposed_api() {
                Ok(_) => eprintln!(
                    "Proposed API enabled in {}. Restart the editor to apply it.",
                    self.argv_path().display()
                ),
                Err(e) => tracing::error!("failed to enable proposed API: {e:#}"),
            },
            Remediation::ReloadWindow => eprintln!(
                "Disable {CONFLICTING_EXTENSION}, then run \"Developer: Reload Window\" in the editor."
            ),
            Remediation::ViewLogs => {
                eprintln!("Re-run with -v, or set RUST_LOG=oopilot=debug, to see detailed logs.")
            }
        }
    }
}

impl Default for EditorHost {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl Environment for EditorHost {
    async fn probe_capability(&self) -> Result<()> {
        anyhow::ensure!(
            self.proposed_api_enabled()?,
            "{FEATURE_ID} is not listed in {PROPOSED_API_KEY} of {}",
            self.argv_path().display()
        );
        Ok(())
    }

    fn conflicting_extension(&self) -> Option<String> {
        let entries = std::fs::read_dir(self.dir.join("extensions")).ok()?;
        entries
            .flatten()
            .any(|entry| is_conflicting(&entry.file_name().to_string_lossy()))
            .then(|| CONFLICTING_EXTENSION.to_owned())
    }

    async fn offer_remediation(&self, verdict: &Verdict, options: &[Remediation]) {
        let message = verdict.message();
        eprintln!("{}", style(&message).yellow().bold());
        if options.is_empty() || !console::user_attended_stderr() {
            return;
        }

        let labels: Vec<&'static str> = options.iter().map(|option| option.label()).collect();
        let choice = tokio::task::spawn_blocking(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(message)
                .items(&labels)
                .default(0)
                .interact_opt()
        })
        .await;

        match choice {
            Ok(Ok(Some(index))) => self.apply(options[index]),
            Ok(Ok(None)) => tracing::debug!("remediation dismissed"),
            Ok(Err(e)) => tracing::warn!("remediation prompt failed: {e}"),
            Err(e) => tracing::warn!("remediation prompt panicked: {e}"),
        }
    }
}

/// Whether an extension directory is the Copilot completion extension,
/// e.g. `github.copilot-1.250.0` but not `github.copilot-chat-0.24.0`.
fn is_conflicting(dir_name: &str) -> bool {
    dir_name
        .to_ascii_lowercase()
        .strip_prefix("github.copilot-")
        .and_then(|version| version.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::is_conflicting;

    #[test]
    fn matches_copilot_but_not_chat() {
        assert!(is_conflicting("github.copilot-1.250.0"));
        assert!(is_conflicting("GitHub.copilot-1.0.0-universal"));
        assert!(!is_conflicting("github.copilot-chat-0.24.0"));
        assert!(!is_conflicting("oopilot.oopilot-1.0.0"));
    }
}
