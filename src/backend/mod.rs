//! Backend Module
//!
//! The key-value capability the artifact store is written against.
//!
//! ## Responsibilities
//! - `get` / `set` / `delete` of text values by string key
//! - Deleting a missing key is not an error
//! - Enforcing (or at least modelling) a per-entry size ceiling
//!
//! ## Implementations
//! - [`MemoryBackend`]: BTreeMap behind a RwLock, optional size ceiling.
//!   Doubles as the test backend.
//! - [`FileBackend`]: durable append-only record log, replayed on open.

mod memory;
pub mod file;

use std::sync::Arc;

use crate::error::Result;

pub use memory::MemoryBackend;
pub use file::FileBackend;

/// Text key-value storage with independently bounded entries
pub trait KvBackend: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; succeeds when the key is already absent
    fn delete(&self, key: &str) -> Result<()>;
}

impl<B: KvBackend + ?Sized> KvBackend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

impl<B: KvBackend + ?Sized> KvBackend for &B {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}
