//! Persisted grader settings behind a small key-value interface.

use crate::error::SettingsError;
use crate::grading::Provider;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const PROVIDER_KEY: &str = "grader.provider";
pub const API_KEY_KEY: &str = "grader.api_key";

/// Minimal string store the settings are kept in.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        Ok(())
    }
}

/// JSON object of strings on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store, starting empty if the file does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    /// `~/.config/land-audit/settings.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("land-audit").join("settings.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Provider choice and credential handed to the grading collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraderSettings {
    pub provider: Provider,
    pub api_key: Option<String>,
}

impl GraderSettings {
    /// Reads the settings, using `fallback` for anything not stored.
    pub fn load(store: &dyn KeyValueStore, fallback: &Self) -> Result<Self, SettingsError> {
        let provider = match store.get(PROVIDER_KEY)? {
            Some(value) => value
                .parse::<Provider>()
                .map_err(|_| SettingsError::InvalidValue {
                    key: PROVIDER_KEY.to_string(),
                    value,
                })?,
            None => fallback.provider,
        };

        let api_key = store
            .get(API_KEY_KEY)?
            .filter(|key| !key.is_empty())
            .or_else(|| fallback.api_key.clone());

        Ok(Self { provider, api_key })
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), SettingsError> {
        store.set(PROVIDER_KEY, self.provider.as_str())?;
        match &self.api_key {
            Some(key) => store.set(API_KEY_KEY, key),
            None => store.remove(API_KEY_KEY),
        }
    }
}
