//! File backend
//!
//! Ties the log writer and an in-memory index together.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::backend::KvBackend;
use crate::config::{Config, SyncStrategy};
use crate::error::Result;

use super::{LogEntry, LogRecovery, LogWriter, Operation};

/// Durable key-value backend
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader
///
/// - **Writes** (set/delete/compact): serialized by the `writer` mutex.
///   The record is appended before the index is touched, so a crash never
///   leaves the index ahead of the log.
/// - **Reads** (get): index read lock only, never touch the file.
pub struct FileBackend {
    /// Path of the record log
    log_path: PathBuf,

    /// Live view of the log (tombstones removed)
    index: RwLock<BTreeMap<String, String>>,

    /// Append handle (exclusive access needed)
    writer: Mutex<LogWriter>,

    sync_strategy: SyncStrategy,
}

impl FileBackend {
    const LOG_FILENAME: &'static str = "kvstash.log";
    const COMPACT_SUFFIX: &'static str = "compact";

    /// Open or create a backend under `config.data_dir`
    ///
    /// On startup:
    /// 1. Create data directory
    /// 2. Replay the log (repairing a torn tail)
    /// 3. Rebuild the index
    /// 4. Reopen the log for appending
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;
        let log_path = config.data_dir.join(Self::LOG_FILENAME);

        let (entries, recovery) = LogRecovery::recover(&log_path)?;
        if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
            info!(
                recovered = recovery.entries_recovered,
                corrupted = recovery.entries_corrupted,
                last_lsn = recovery.last_lsn,
                "log replay finished"
            );
        }

        let mut index = BTreeMap::new();
        for entry in entries {
            match entry.operation {
                Operation::Set { key, value } => {
                    index.insert(key, value);
                }
                Operation::Delete { key } => {
                    index.remove(&key);
                }
            }
        }

        let writer = LogWriter::open(&log_path, config.sync_strategy, recovery.last_lsn)?;

        Ok(Self {
            log_path,
            index: RwLock::new(index),
            writer: Mutex::new(writer),
            sync_strategy: config.sync_strategy,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(&config)
    }

    /// Rewrite the log so it holds exactly one record per live key
    ///
    /// Artifact saves rewrite the same keys over and over; without
    /// compaction the log grows by the full payload on every save.
    pub fn compact(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        let index = self.index.read();

        let tmp_path = self.log_path.with_extension(Self::COMPACT_SUFFIX);
        let mut out = BufWriter::new(File::create(&tmp_path)?);
        let mut lsn = 0u64;
        for (key, value) in index.iter() {
            lsn += 1;
            let operation = Operation::Set {
                key: key.clone(),
                value: value.clone(),
            };
            out.write_all(&LogEntry::new(lsn, operation).serialize()?)?;
        }
        out.flush()?;
        out.get_ref().sync_all()?;
        drop(out);

        fs::rename(&tmp_path, &self.log_path)?;
        *writer = LogWriter::open(&self.log_path, self.sync_strategy, lsn)?;

        debug!(live_keys = index.len(), "log compacted");
        Ok(())
    }

    /// Force pending records to disk
    pub fn sync(&self) -> Result<()> {
        self.writer.lock().sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Path of the record log
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// LSN of the most recent record
    pub fn current_lsn(&self) -> u64 {
        self.writer.lock().current_lsn()
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.index.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut writer = self.writer.lock();

        writer.append(Operation::Set {
            key: key.to_string(),
            value: value.to_string(),
        })?;

        self.index.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut writer = self.writer.lock();

        // Nothing to tombstone
        if !self.index.read().contains_key(key) {
            return Ok(());
        }

        writer.append(Operation::Delete {
            key: key.to_string(),
        })?;

        self.index.write().remove(key);
        Ok(())
    }
}
