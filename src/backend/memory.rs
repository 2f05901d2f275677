//! In-memory backend
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, StashError};

use super::KvBackend;

/// In-process key-value store
///
/// Many concurrent readers, one writer at a time. When `max_entry_bytes`
/// is set, `set` rejects values longer than the limit, the way browser
/// and mobile storage reject oversized items.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
    max_entry_bytes: Option<usize>,
}

impl MemoryBackend {
    /// Create an empty, unbounded backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that rejects values over `limit` bytes
    pub fn with_max_entry_bytes(limit: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            max_entry_bytes: Some(limit),
        }
    }

    /// Create an empty backend honoring `config.max_entry_bytes`
    pub fn from_config(config: &Config) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            max_entry_bytes: config.max_entry_bytes,
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Keys starting with `prefix`, in sorted order
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .read()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Per-entry ceiling, if any
    pub fn max_entry_bytes(&self) -> Option<usize> {
        self.max_entry_bytes
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(limit) = self.max_entry_bytes {
            if value.len() > limit {
                return Err(StashError::EntryTooLarge {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                });
            }
        }

        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
