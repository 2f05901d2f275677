//! Log Writer
//!
//! Handles appending records to the log file.
//!
//! Every append is all-or-nothing: if a frame cannot be written (or
//! synced) in full, the sink is cut back to its length before the append.
//! If even that fails the writer refuses further appends, since anything
//! written after a torn frame would be unreachable on replay.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{error, warn};

use crate::config::SyncStrategy;
use crate::error::{Result, StashError};

use super::{LogEntry, Operation};

/// Byte destination for log frames
pub trait LogSink: Write {
    /// Current length in bytes
    fn byte_len(&self) -> io::Result<u64>;

    /// Cut the sink back to `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;

    /// Make written bytes durable
    fn sync(&mut self) -> io::Result<()>;
}

impl LogSink for File {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Appends framed records to the log
pub struct LogWriter<S = File> {
    sink: S,
    /// Sink length after the last complete frame
    len: u64,
    /// LSN assigned to the most recent append (0 = nothing written yet)
    current_lsn: u64,
    sync_strategy: SyncStrategy,
    /// Records appended since the last fsync
    unsynced: usize,
    /// Set when a torn frame could not be rolled back
    failed: bool,
}

impl LogWriter<File> {
    /// Open or create a log file for appending
    ///
    /// `last_lsn` is the highest LSN already present in the file
    /// (as reported by recovery), so numbering continues from there.
    pub fn open(path: &Path, sync_strategy: SyncStrategy, last_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::with_sink(file, sync_strategy, last_lsn)
    }
}

impl<S: LogSink> LogWriter<S> {
    /// Append to an already-open sink, continuing after `last_lsn`
    pub fn with_sink(sink: S, sync_strategy: SyncStrategy, last_lsn: u64) -> Result<Self> {
        let len = sink.byte_len()?;

        Ok(Self {
            sink,
            len,
            current_lsn: last_lsn,
            sync_strategy,
            unsynced: 0,
            failed: false,
        })
    }

    /// Append an operation, returning the LSN it was written under
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        if self.failed {
            return Err(StashError::Backend(
                "log writer failed to roll back a partial write; reopen the backend".to_string(),
            ));
        }

        let lsn = self.current_lsn + 1;
        let frame = LogEntry::new(lsn, operation).serialize()?;
        let sync_due = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.unsynced + 1 >= count,
        };

        if let Err(e) = self.write_frame(&frame, sync_due) {
            self.roll_back();
            return Err(e.into());
        }

        self.len += frame.len() as u64;
        self.current_lsn = lsn;
        self.unsynced = if sync_due { 0 } else { self.unsynced + 1 };
        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.sink.flush()?;
        self.sink.sync()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Get the current LSN
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    /// Sink length covered by complete frames
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once a rollback has failed; appends are rejected from then on
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn write_frame(&mut self, frame: &[u8], sync_due: bool) -> io::Result<()> {
        self.sink.write_all(frame)?;
        self.sink.flush()?;
        if sync_due {
            self.sink.sync()?;
        }
        Ok(())
    }

    /// Drop whatever part of the last frame reached the sink
    fn roll_back(&mut self) {
        match self.sink.truncate(self.len) {
            Ok(()) => warn!(len = self.len, "rolled back partial log append"),
            Err(e) => {
                self.failed = true;
                error!(len = self.len, error = %e, "could not roll back partial log append");
            }
        }
    }
}
