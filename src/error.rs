//! Error types for kvstash
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StashError
pub type Result<T> = std::result::Result<T, StashError>;

/// Unified error type for kvstash operations
#[derive(Debug, Error)]
pub enum StashError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Artifact Errors
    // -------------------------------------------------------------------------
    #[error("Invalid artifact name: {0:?} (must not be empty)")]
    InvalidName(String),

    #[error("Artifact '{0}': binary model topology is not supported by this store")]
    UnsupportedTopology(String),

    #[error("No artifact named '{0}' in storage")]
    ArtifactNotFound(String),

    #[error("Artifact '{0}': structure record is missing")]
    MissingStructure(String),

    #[error("Artifact '{0}': binary weight data is missing")]
    MissingWeightData(String),

    #[error("Artifact '{name}': weight data is not valid base64: {reason}")]
    CorruptWeightData { name: String, reason: String },

    #[error("Artifact '{name}': expected {expected} weight bytes, found {actual}")]
    WeightLengthMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("Failed to save artifact '{name}': {source}")]
    SaveFailed {
        name: String,
        #[source]
        source: Box<StashError>,
    },

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("Entry for key '{key}' is {size} bytes, over the {limit} byte limit")]
    EntryTooLarge {
        key: String,
        size: usize,
        limit: usize,
    },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Log corruption detected: {0}")]
    LogCorruption(String),

    // -------------------------------------------------------------------------
    // Pixel Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported channel layout: expected 4 channels per pixel, got {0}")]
    UnsupportedChannelLayout(u8),

    #[error("Raster buffer holds {actual} bytes, expected {expected}")]
    RasterSizeMismatch { expected: usize, actual: usize },

    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for StashError {
    fn from(err: serde_json::Error) -> Self {
        StashError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for StashError {
    fn from(err: bincode::Error) -> Self {
        StashError::Serialization(err.to_string())
    }
}
