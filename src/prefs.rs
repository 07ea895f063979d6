//! Flat string key/value persistence.
//!
//! Everything the app remembers between runs (session, custom channels, id
//! counter) is stored as plain strings under fixed keys, so the on-disk format
//! stays a single readable JSON object.

use crate::errors::{IptvError, Result};
use crate::config::project_dirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub trait Preferences: Send {
    fn get_string(&self, key: &str) -> Option<String>;
    fn put_string(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);

    /// Persist pending changes
    fn flush(&mut self) -> Result<()>;

    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get_string(key).as_deref(), Some("true"))
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.put_string(key, value.to_string());
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_string(key).and_then(|v| v.trim().parse().ok())
    }

    fn put_i64(&mut self, key: &str, value: i64) {
        self.put_string(key, value.to_string());
    }
}

/// In-memory store, used by tests and `--ephemeral` runs
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put_string(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// JSON file backed store
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
    dirty: bool,
}

impl FilePreferences {
    /// Open the default store at `<config_dir>/prefs.json`
    pub fn open_default() -> Result<Self> {
        let proj = project_dirs()
            .ok_or_else(|| IptvError::Storage("Cannot determine config directory".into()))?;
        Self::open(proj.config_dir().join("prefs.json"))
    }

    /// Open (or lazily create) a store at `path`. A corrupt file is treated as
    /// empty rather than failing startup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "preferences file is corrupt, starting empty"
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = values.len(), "opened preferences");
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Preferences for FilePreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put_string(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
    }

    fn clear(&mut self) {
        self.values.clear();
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.values)?)?;
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        Ok(())
    }
}
