//! # kvstash
//!
//! Two small storage-side building blocks for an on-device image classifier:
//! - **Artifact store**: persists a trained model (JSON structure + weight
//!   bytes) into a key-value backend whose entries have a size ceiling, by
//!   slicing the base64 weight text across a fixed set of keys
//! - **Pixel transcoder**: turns a decoded RGBA raster into the packed RGB
//!   buffer a classifier expects
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │        ArtifactStore         │   │         transcode()          │
//! │  save / load / exists / del  │   │   RasterBuffer (RGBA, 4 B)   │
//! └──────────────┬───────────────┘   │              │               │
//!                │                   │              ▼               │
//!   info → structure → parts 0..N    │   TensorBuffer (RGB, 3 B)    │
//!                │                   └──────────────────────────────┘
//! ┌──────────────▼───────────────┐
//! │      KvBackend (trait)       │
//! │   get / set / delete (text)  │
//! └──────┬────────────────┬──────┘
//!        │                │
//!        ▼                ▼
//! ┌─────────────┐  ┌─────────────┐
//! │MemoryBackend│  │ FileBackend │
//! │  (RwLock)   │  │ (CRC32 log) │
//! └─────────────┘  └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod backend;
pub mod artifact;
pub mod transcode;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StashError, Result};
pub use config::Config;
pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use artifact::{ArtifactInfo, ArtifactPayload, ArtifactStore, Structure};
pub use transcode::{transcode, RasterBuffer, TensorBuffer};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvstash
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
