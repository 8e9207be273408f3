use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A configuration value. The store is heterogeneous, so every entry is one
/// of a closed set of kinds; callers recover the type at read time and fall
/// back to their own default on a mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Process-wide key/value configuration, shared by every caller.
///
/// A single mutex guards the map. Operations are one lookup or one insert, so
/// the critical sections stay short; calling back into the store while
/// holding a guard is not possible through this API.
#[derive(Debug, Default)]
pub struct ConfigStore {
    entries: Mutex<HashMap<String, ConfigValue>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a JSON object file, or start empty when no path is
    /// given.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::read_from_file(p), // propagate errors unchanged
            None => Ok(Self::new()),
        }
    }

    fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {:?}", path.as_ref()))?;
        let entries: HashMap<String, ConfigValue> =
            serde_json::from_str(&raw).with_context(|| "parsing config JSON")?;
        Ok(Self {
            entries: Mutex::new(entries),
        })
    }

    /// Insert or overwrite the entry for `key`.
    pub fn set(&self, key: impl Into<String>, value: ConfigValue) {
        self.guard().insert(key.into(), value);
    }

    /// Current value for `key`, or `None` if unset.
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        self.guard().get(key).cloned()
    }

    /// String value for `key`; `None` when absent or of another kind.
    pub fn str_value(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(ConfigValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer value for `key`; `None` when absent or of another kind.
    pub fn int_value(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(ConfigValue::Int(i)) => Some(i),
            _ => None,
        }
    }

    /// Boolean value for `key`; `None` when absent or of another kind.
    pub fn bool_value(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(ConfigValue::Bool(b)) => Some(b),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    // Every critical section is a single map call, so a guard poisoned by a
    // panicking thread still protects a structurally sound map.
    fn guard(&self) -> MutexGuard<'_, HashMap<String, ConfigValue>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
