//! Persisted contact configuration.
//!
//! Key/value layout: the contact number is stored as a plain string under
//! `emergency_number`, the recipients as a JSON array under `receiver_emails`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use lifeline_core::EmergencyConfig;

pub const NUMBER_KEY: &str = "emergency_number";
pub const EMAILS_KEY: &str = "receiver_emails";

pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Write every entry or none of them.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }
    /// Remove every key.
    fn clear(&self) -> Result<()>;
}

/// Read the configuration snapshot. `None` when nothing was ever stored.
pub fn load_emergency_config(store: &dyn ConfigStore) -> Result<Option<EmergencyConfig>> {
    let number = store.get(NUMBER_KEY)?;
    let emails = match store.get(EMAILS_KEY)? {
        Some(raw) => Some(
            serde_json::from_str::<Vec<String>>(&raw)
                .with_context(|| format!("parse stored {EMAILS_KEY}"))?,
        ),
        None => None,
    };

    if number.is_none() && emails.is_none() {
        return Ok(None);
    }
    Ok(Some(EmergencyConfig {
        contact_number: number.unwrap_or_default(),
        recipient_emails: emails.unwrap_or_default(),
    }))
}

pub fn save_emergency_config(store: &dyn ConfigStore, config: &EmergencyConfig) -> Result<()> {
    let emails = serde_json::to_string(&config.recipient_emails).context("serialize recipients")?;
    store.set_many(&[
        (NUMBER_KEY, config.contact_number.as_str()),
        (EMAILS_KEY, emails.as_str()),
    ])
}

/// Process-local store. Forgets everything on restart.
#[derive(Default)]
pub struct MemoryConfigStore {
    inner: Mutex<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            inner.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clear();
        Ok(())
    }
}

/// JSON object on disk, rewritten on every change.
pub struct FileConfigStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let s = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        if s.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let s = serde_json::to_string_pretty(map).context("serialize config store")?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, s).with_context(|| format!("write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename into {}", self.path.display()))?;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_all()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        self.write_all(&map)
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("remove {}", self.path.display()))?;
        }
        Ok(())
    }
}
