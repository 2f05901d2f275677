//! Configuration for kvstash
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, StashError};

/// Number of equal slices the encoded weight text is cut into.
/// One extra slot (index `DEFAULT_PARTITION_COUNT`) holds the remainder.
pub const DEFAULT_PARTITION_COUNT: usize = 100;

/// Key prefix shared by every artifact
pub const DEFAULT_NAMESPACE: &str = "tensorflowjs_models";

/// Main configuration for a kvstash instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Artifact Configuration
    // -------------------------------------------------------------------------
    /// First path segment of every derived key
    pub namespace: String,

    /// Number of weight partitions (keys `0..=partition_count` are owned)
    pub partition_count: usize,

    // -------------------------------------------------------------------------
    // File Backend Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the file backend
    /// Internal structure:
    ///   {data_dir}/
    ///     └── kvstash.log      (append-only record log)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync the record log
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Memory Backend Configuration
    // -------------------------------------------------------------------------
    /// Per-entry value ceiling in bytes (None = unbounded)
    pub max_entry_bytes: Option<usize>,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced records (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            partition_count: DEFAULT_PARTITION_COUNT,
            data_dir: PathBuf::from("./kvstash_data"),
            sync_strategy: SyncStrategy::EveryNEntries { count: 100 },
            max_entry_bytes: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings that would make key derivation meaningless
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(StashError::Config("namespace must not be empty".to_string()));
        }
        if self.partition_count == 0 {
            return Err(StashError::Config(
                "partition_count must be at least 1".to_string(),
            ));
        }
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(StashError::Config(
                "sync strategy count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the key namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the number of weight partitions
    pub fn partition_count(mut self, count: usize) -> Self {
        self.config.partition_count = count;
        self
    }

    /// Set the data directory (root for the file backend)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the log sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the per-entry size ceiling for the memory backend
    pub fn max_entry_bytes(mut self, limit: usize) -> Self {
        self.config.max_entry_bytes = Some(limit);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
