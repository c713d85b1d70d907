//! Persistent key-value slots backing the session.
//!
//! The session lives in a handful of string keys, the same shape a browser's
//! local storage offers. Each backend guarantees atomicity per key only.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Keychain service name for the keyring backend
const SERVICE_NAME: &str = "eyesonasset";

pub trait KeyValueStorage: Send + Sync {
    /// Read a key. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local storage. Used in tests and as a throwaway session.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

/// A JSON object of string keys in `<dir>/session.json`.
///
/// Every call re-reads the file, so two processes sharing a directory see
/// each other's writes on their next access.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write within this process
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read session file")?;
        let map = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;
        Ok(map)
    }

    fn store(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if map.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove session file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, &self.path).context("Failed to replace session file")?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        // A corrupt file is replaced rather than blocking new sessions
        let mut map = self.load().unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        self.store(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = match self.load() {
            Ok(map) => map,
            Err(_) => {
                // Unreadable file: drop it entirely
                return self.store(&BTreeMap::new());
            }
        };
        if map.remove(key).is_some() {
            self.store(&map)?;
        }
        Ok(())
    }
}

// ============================================================================
// OS keychain
// ============================================================================

/// One keychain entry per key under the `eyesonasset` service.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStorage;

impl KeyringStorage {
    pub fn new() -> Self {
        Self
    }

    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }
}

impl KeyValueStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read session from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .context("Failed to store session in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}
