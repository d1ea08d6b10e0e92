//! # Ledger Backends
//!
//! The `LedgerBackend` trait is a minimal storage surface: string keys,
//! string values, synchronous access. A backend knows nothing about
//! collections or entities; it stores whatever JSON text the
//! [`Ledger`](crate::store::Ledger) facade hands it.
//!
//! ## Thread Safety
//! Backends are wrapped in `Arc` and shared across the terminal components
//! (catalog, stock engine, checkout all hold the same ledger). A `Mutex`
//! guards the map; operations hold it only for the duration of one
//! read/write, and the deployment model is one writer at a time anyway.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{LedgerError, LedgerResult};

/// Synchronous string-keyed storage.
///
/// `write` must be durable before it returns; there is no flush step and
/// no notion of a transaction below this trait. Multi-collection
/// atomicity is the caller's problem (and with a single synchronous
/// writer, sequential writes are never observed half-applied).
pub trait LedgerBackend: Send + Sync {
    /// Reads the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> LedgerResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> LedgerResult<()>;

    /// Stores several key/value pairs as one step: either every entry is
    /// applied and durable, or none are.
    fn write_many(&self, entries: &[(&str, &str)]) -> LedgerResult<()>;

    /// Removes `key` entirely. Removing a missing key is a no-op.
    fn remove(&self, key: &str) -> LedgerResult<()>;
}

// =============================================================================
// Memory Backend
// =============================================================================

/// In-memory backend. The default for tests and the reference semantics
/// for every other backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerBackend for MemoryBackend {
    fn read(&self, key: &str) -> LedgerResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| LedgerError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> LedgerResult<()> {
        let mut entries = self.entries.lock().map_err(|_| LedgerError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn write_many(&self, new_entries: &[(&str, &str)]) -> LedgerResult<()> {
        let mut entries = self.entries.lock().map_err(|_| LedgerError::Poisoned)?;
        for (key, value) in new_entries {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> LedgerResult<()> {
        let mut entries = self.entries.lock().map_err(|_| LedgerError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// File Backend
// =============================================================================

/// Single-file backend: the whole ledger is one JSON object on disk,
/// key → raw JSON text, exactly the shape of a storage dump.
///
/// The file is loaded once on open and rewritten in full on every write:
/// a small blob, one writer, durable-on-write. Not a storage engine.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Opens (or creates) a ledger file at `path`.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&text)
                    .map_err(|e| LedgerError::deserialize("<ledger file>", e))?
            }
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened ledger file");

        Ok(FileBackend {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Serializes the full map and rewrites the file.
    fn persist(&self, entries: &HashMap<String, String>) -> LedgerResult<()> {
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| LedgerError::serialize("<ledger file>", e))?;

        // Write-then-rename so a crash mid-write never truncates the blob.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LedgerBackend for FileBackend {
    fn read(&self, key: &str) -> LedgerResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| LedgerError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> LedgerResult<()> {
        let mut entries = self.entries.lock().map_err(|_| LedgerError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn write_many(&self, new_entries: &[(&str, &str)]) -> LedgerResult<()> {
        let mut entries = self.entries.lock().map_err(|_| LedgerError::Poisoned)?;

        // Persist the merged map before swapping it in, so a failed
        // persist leaves the in-memory view matching the file.
        let mut updated = entries.clone();
        for (key, value) in new_entries {
            updated.insert((*key).to_string(), (*value).to_string());
        }
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> LedgerResult<()> {
        let mut entries = self.entries.lock().map_err(|_| LedgerError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();

        assert_eq!(backend.read("products").unwrap(), None);

        backend.write("products", "[]").unwrap();
        assert_eq!(backend.read("products").unwrap().as_deref(), Some("[]"));

        backend.write("products", r#"[{"x":1}]"#).unwrap();
        assert_eq!(
            backend.read("products").unwrap().as_deref(),
            Some(r#"[{"x":1}]"#)
        );

        backend.remove("products").unwrap();
        assert_eq!(backend.read("products").unwrap(), None);
        // Removing again is a no-op
        backend.remove("products").unwrap();
    }

    #[test]
    fn test_write_many_applies_every_entry() {
        let backend = MemoryBackend::new();
        backend
            .write_many(&[("products", "[1]"), ("stock_logs", "[2]")])
            .unwrap();

        assert_eq!(backend.read("products").unwrap().as_deref(), Some("[1]"));
        assert_eq!(backend.read("stock_logs").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_file_backend_write_many_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "vela-ledger-pair-test-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        {
            let backend = FileBackend::open(&path).unwrap();
            backend
                .write_many(&[("products", "[1]"), ("sales", "[2]")])
                .unwrap();
        }

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(reopened.read("products").unwrap().as_deref(), Some("[1]"));
        assert_eq!(reopened.read("sales").unwrap().as_deref(), Some("[2]"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_backend_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "vela-ledger-test-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.write("sales", r#"["receipt"]"#).unwrap();
        }

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(
            reopened.read("sales").unwrap().as_deref(),
            Some(r#"["receipt"]"#)
        );

        let _ = fs::remove_file(&path);
    }
}
