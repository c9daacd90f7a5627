//! Provider records stored at `~/.config/oopilot/providers.toml`.
//!
//! One table per nickname. Every write replaces the whole file through a
//! temp file in the same directory, so readers never see a partial record.
//! Concurrent processes coordinate through an advisory lock on a sidecar
//! `.lock` file: shared for reads, exclusive around read-modify-write.

use anyhow::{Context, Result};
use fs2::FileExt;
use ocore::{ConfigStore, Error, ProviderConfig};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

type Records = BTreeMap<String, ProviderConfig>;

/// TOML-file backed [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
}

impl TomlStore {
    /// A store backed by the file at `path`. The file is created on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default path: `~/.config/oopilot/providers.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("oopilot")
            .join("providers.toml")
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.dir().join(name)
    }

    /// Open the sidecar lock file and lock it. Released when the returned
    /// file is dropped.
    fn lock(&self, exclusive: bool) -> Result<File> {
        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.with_context(|| format!("locking {}", path.display()))?;
        Ok(file)
    }

    fn read(&self) -> Result<Records> {
        if !self.dir().exists() {
            return Ok(Records::new());
        }
        let _lock = self.lock(false)?;
        self.read_locked()
    }

    fn read_locked(&self) -> Result<Records> {
        if !self.path.exists() {
            return Ok(Records::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", self.path.display()))
    }

    /// Apply `update` to the records under the exclusive lock.
    fn update(&self, update: impl FnOnce(&mut Records)) -> Result<()> {
        let dir = self.dir();
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let _lock = self.lock(true)?;
        let mut records = self.read_locked()?;
        update(&mut records);
        self.write(&records)
    }

    fn write(&self, records: &Records) -> Result<()> {
        let dir = self.dir();
        let contents = toml::to_string_pretty(records)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        file.write_all(contents.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path)
            .with_context(|| format!("writing {}", self.path.display()))?;
        tracing::debug!("saved {} provider records to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl Default for TomlStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl ConfigStore for TomlStore {
    fn get(&self, nickname: &str) -> ocore::Result<Option<ProviderConfig>> {
        let mut records = self.read().map_err(Error::store)?;
        Ok(records.remove(nickname))
    }

    fn set(&self, nickname: &str, config: &ProviderConfig) -> ocore::Result<()> {
        if config.nickname != nickname {
            return Err(Error::store(anyhow::anyhow!(
                "record for {} stored under {nickname}",
                config.nickname
            )));
        }
        self.update(|records| {
            records.insert(nickname.to_owned(), config.clone());
        })
        .map_err(Error::store)
    }

    fn list(&self) -> ocore::Result<Vec<ProviderConfig>> {
        Ok(self.read().map_err(Error::store)?.into_values().collect())
    }
}
