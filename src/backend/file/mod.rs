//! File Backend Module
//!
//! Durable key-value backend built on an append-only record log.
//!
//! ## Responsibilities
//! - Append a record for every set/delete before updating the index
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Replay on open; torn tails are truncated, bad records skipped
//! - Compaction: rewrite the log with only live entries
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌─────────┬──────────┬────────────────┐ │
//! │ │ CRC (4) │ Len (4)  │ bincode(entry) │ │
//! │ └─────────┴──────────┴────────────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ┌─────────┬──────────┬────────────────┐ │
//! │ │ CRC (4) │ Len (4)  │ bincode(entry) │ │
//! │ └─────────┴──────────┴────────────────┘ │
//! └─────────────────────────────────────────┘
//! ```

mod entry;
mod writer;
mod recovery;
mod backend;

pub use entry::{LogEntry, Operation, HEADER_SIZE};
pub use writer::{LogSink, LogWriter};
pub use recovery::{LogRecovery, RecoveryResult};
pub use backend::FileBackend;
