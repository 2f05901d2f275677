//! Log Recovery
//!
//! Rebuilds state after a restart (or crash) by replaying the log.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::error::Result;

use super::entry::read_header;
use super::{LogEntry, HEADER_SIZE};

/// Handles log replay and repair
pub struct LogRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupted entries skipped
    pub entries_corrupted: u64,

    /// Last valid LSN
    pub last_lsn: u64,

    /// Whether a partial record at the tail was cut off
    pub was_truncated: bool,
}

impl LogRecovery {
    /// Recover entries from a log file
    ///
    /// This will:
    /// 1. Read all valid entries
    /// 2. Skip damaged entries, resuming at the next intact frame
    /// 3. Truncate a partial write at the end
    /// 4. Return all valid entries in order
    ///
    /// A missing file recovers as empty.
    pub fn recover(path: &Path) -> Result<(Vec<LogEntry>, RecoveryResult)> {
        let (entries, result, valid_len) = Self::scan(path)?;

        if result.was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len)?;
            file.sync_all()?;
            warn!(
                path = %path.display(),
                valid_len,
                "truncated partial record at log tail"
            );
        }

        Ok((entries, result))
    }

    /// Verify integrity of a log file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let (_, result, _) = Self::scan(path)?;
        Ok(result)
    }

    /// Walk every frame; returns entries, stats and the byte length of the
    /// well-formed prefix
    fn scan(path: &Path) -> Result<(Vec<LogEntry>, RecoveryResult, u64)> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok((Vec::new(), RecoveryResult::default(), 0));
            }
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();
        let mut offset = 0usize;

        while offset < bytes.len() {
            if let Some((entry, frame_len)) = Self::frame_at(&bytes, offset) {
                result.entries_recovered += 1;
                result.last_lsn = result.last_lsn.max(entry.lsn);
                entries.push(entry);
                offset += frame_len;
                continue;
            }

            // A damaged frame's declared length cannot be trusted; look for
            // the next offset where a complete, checksummed frame decodes.
            let next_frame = (offset + 1..bytes.len())
                .find(|&next| Self::frame_at(&bytes, next).is_some());
            match next_frame {
                Some(next) => {
                    result.entries_corrupted += 1;
                    warn!(offset, skipped = next - offset, "skipping corrupted log record");
                    offset = next;
                }
                None => {
                    result.was_truncated = true;
                    break;
                }
            }
        }

        Ok((entries, result, offset as u64))
    }

    /// Decode the frame starting at `offset`; returns it with its byte length
    fn frame_at(bytes: &[u8], offset: usize) -> Option<(LogEntry, usize)> {
        let (_, len) = read_header(&bytes[offset..])?;
        let frame_len = HEADER_SIZE.checked_add(len as usize)?;
        let frame = bytes.get(offset..offset.checked_add(frame_len)?)?;
        LogEntry::deserialize(frame).ok().map(|entry| (entry, frame_len))
    }
}
