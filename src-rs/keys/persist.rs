use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::types::PersistedState;
use crate::error::{Result, RotatorError};

/// Host-side persisted settings: one record per storage key.
pub trait SettingsBackend: Send + Sync {
    fn load(&self, storage_key: &str) -> Result<Option<PersistedState>>;
    fn save(&self, storage_key: &str, state: &PersistedState) -> Result<()>;
}

/// A JSON object on disk mapping storage keys to records. Entries owned by
/// other extensions are left as they are.
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str::<Map<String, Value>>(&data)?)
    }
}

impl SettingsBackend for JsonFileSettings {
    fn load(&self, storage_key: &str) -> Result<Option<PersistedState>> {
        let mut all = self.read_all()?;
        match all.remove(storage_key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn save(&self, storage_key: &str, state: &PersistedState) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(storage_key.to_string(), serde_json::to_value(state)?);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(&all)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettings {
    entries: RwLock<HashMap<String, PersistedState>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for MemorySettings {
    fn load(&self, storage_key: &str) -> Result<Option<PersistedState>> {
        let map = self
            .entries
            .read()
            .map_err(|_| RotatorError::LockPoisoned("settings"))?;
        Ok(map.get(storage_key).cloned())
    }

    fn save(&self, storage_key: &str, state: &PersistedState) -> Result<()> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| RotatorError::LockPoisoned("settings"))?;
        map.insert(storage_key.to_string(), state.clone());
        Ok(())
    }
}
