//! Tests for log entries and LogRecovery
//!
//! These tests verify:
//! - Frame encode/decode and checksum detection
//! - Recovery from a missing or empty log
//! - Recovery with partial writes (truncated tail)
//! - Recovery with corrupted entries (CRC mismatch)
//! - Verify mode (stats only, file untouched)
//! - FileBackend open on a damaged log

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use kvstash::backend::file::{LogEntry, LogRecovery, LogSink, LogWriter, Operation, HEADER_SIZE};
use kvstash::backend::{FileBackend, KvBackend};
use kvstash::config::SyncStrategy;
use kvstash::StashError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("kvstash.log");
    (temp_dir, log_path)
}

fn set_op(i: usize) -> Operation {
    Operation::Set {
        key: format!("key{}", i),
        value: format!("value{}", i),
    }
}

/// Write entries using LogWriter (produces a well-formed log)
fn write_entries_via_writer(path: &PathBuf, count: usize) {
    let mut writer = LogWriter::open(path, SyncStrategy::EveryWrite, 0).unwrap();
    for i in 0..count {
        writer.append(set_op(i)).unwrap();
    }
}

/// Write raw framed entries directly to a file (for crafting corruption)
fn write_raw_frames(path: &PathBuf, frames: &[Vec<u8>]) {
    let mut file = File::create(path).unwrap();
    for frame in frames {
        file.write_all(frame).unwrap();
    }
    file.sync_all().unwrap();
}

/// In-memory sink that accepts `budget` more bytes, then fails writes
struct FlakySink {
    data: Vec<u8>,
    budget: usize,
    truncate_fails: bool,
}

impl FlakySink {
    fn new(budget: usize) -> Self {
        Self {
            data: Vec::new(),
            budget,
            truncate_fails: false,
        }
    }
}

impl Write for FlakySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        let n = buf.len().min(self.budget);
        self.data.extend_from_slice(&buf[..n]);
        self.budget -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogSink for FlakySink {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        if self.truncate_fails {
            return Err(io::Error::new(io::ErrorKind::Other, "truncate refused"));
        }
        self.data.truncate(len as usize);
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn large_op(i: usize) -> Operation {
    Operation::Set {
        key: format!("weight_data_{}", i),
        value: "A".repeat(20_000),
    }
}

// =============================================================================
// Entry Tests
// =============================================================================

#[test]
fn test_entry_frame_layout() {
    let entry = LogEntry::new(7, set_op(1));

    let frame = entry.serialize().unwrap();
    let len = u32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]) as usize;

    assert_eq!(frame.len(), HEADER_SIZE + len);
    assert_eq!(LogEntry::deserialize(&frame).unwrap(), entry);
}

#[test]
fn test_entry_detects_flipped_byte() {
    let mut frame = LogEntry::new(1, set_op(1)).serialize().unwrap();
    let last = frame.len() - 1;
    frame[last] ^= 0xFF;

    assert!(matches!(
        LogEntry::deserialize(&frame).unwrap_err(),
        StashError::LogCorruption(_)
    ));
}

#[test]
fn test_entry_rejects_short_frame() {
    assert!(matches!(
        LogEntry::deserialize(&[1, 2, 3]).unwrap_err(),
        StashError::LogCorruption(_)
    ));
}

#[test]
fn test_operation_key() {
    assert_eq!(set_op(3).key(), "key3");
    assert_eq!(Operation::Delete { key: "gone".into() }.key(), "gone");
}

// =============================================================================
// Recover: Clean Log Tests
// =============================================================================

#[test]
fn test_recover_missing_file() {
    let (_temp, log_path) = setup_temp_log();

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result.entries_recovered, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_empty_file() {
    let (_temp, log_path) = setup_temp_log();
    File::create(&log_path).unwrap();

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(entries.len(), 0);
    assert_eq!(result.last_lsn, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_multiple_entries_in_order() {
    let (_temp, log_path) = setup_temp_log();
    write_entries_via_writer(&log_path, 5);

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(result.entries_recovered, 5);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(result.last_lsn, 5);
    let lsns: Vec<u64> = entries.iter().map(|e| e.lsn).collect();
    assert_eq!(lsns, vec![1, 2, 3, 4, 5]);
    assert_eq!(entries[2].operation, set_op(2));
}

// =============================================================================
// Recover: Damaged Log Tests
// =============================================================================

#[test]
fn test_recover_truncates_partial_tail() {
    let (_temp, log_path) = setup_temp_log();
    write_entries_via_writer(&log_path, 3);
    let clean_len = fs::metadata(&log_path).unwrap().len();

    // Half of a fourth frame
    let partial = LogEntry::new(4, set_op(4)).serialize().unwrap();
    let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
    file.write_all(&partial[..partial.len() / 2]).unwrap();
    drop(file);

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(entries.len(), 3);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&log_path).unwrap().len(), clean_len);
}

#[test]
fn test_recover_truncates_partial_header() {
    let (_temp, log_path) = setup_temp_log();
    let frame = LogEntry::new(1, set_op(1)).serialize().unwrap();
    write_raw_frames(&log_path, &[frame.clone(), vec![0xAB, 0xCD]]);

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(entries.len(), 1);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&log_path).unwrap().len(), frame.len() as u64);
}

#[test]
fn test_recover_skips_crc_mismatch() {
    let (_temp, log_path) = setup_temp_log();
    let good1 = LogEntry::new(1, set_op(1)).serialize().unwrap();
    let mut bad = LogEntry::new(2, set_op(2)).serialize().unwrap();
    bad[0] ^= 0xFF; // corrupt the stored CRC
    let good3 = LogEntry::new(3, set_op(3)).serialize().unwrap();
    write_raw_frames(&log_path, &[good1, bad, good3]);

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(result.entries_recovered, 2);
    assert_eq!(result.entries_corrupted, 1);
    assert_eq!(result.last_lsn, 3);
    assert!(!result.was_truncated);
    assert_eq!(entries[1].lsn, 3);
}

#[test]
fn test_verify_does_not_modify_file() {
    let (_temp, log_path) = setup_temp_log();
    write_entries_via_writer(&log_path, 2);
    let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
    file.write_all(&[1, 2, 3, 4, 5]).unwrap();
    drop(file);
    let len = fs::metadata(&log_path).unwrap().len();

    let result = LogRecovery::verify(&log_path).unwrap();

    assert_eq!(result.entries_recovered, 2);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&log_path).unwrap().len(), len);
}

#[test]
fn test_recover_resumes_after_torn_frame_mid_log() {
    let (_temp, log_path) = setup_temp_log();
    let torn = LogEntry::new(2, large_op(2)).serialize().unwrap();
    write_raw_frames(
        &log_path,
        &[
            LogEntry::new(1, set_op(1)).serialize().unwrap(),
            torn[..torn.len() / 2].to_vec(),
            LogEntry::new(3, set_op(3)).serialize().unwrap(),
            LogEntry::new(4, set_op(4)).serialize().unwrap(),
        ],
    );
    let len = fs::metadata(&log_path).unwrap().len();

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    let lsns: Vec<u64> = entries.iter().map(|e| e.lsn).collect();
    assert_eq!(lsns, vec![1, 3, 4]);
    assert_eq!(result.entries_corrupted, 1);
    assert!(!result.was_truncated);
    assert_eq!(fs::metadata(&log_path).unwrap().len(), len);
}

// =============================================================================
// Writer Rollback Tests
// =============================================================================

#[test]
fn test_failed_append_leaves_no_partial_frame() {
    let mut writer =
        LogWriter::with_sink(FlakySink::new(usize::MAX), SyncStrategy::EveryWrite, 0).unwrap();
    writer.append(set_op(1)).unwrap();
    let clean_len = writer.get_ref().data.len();

    // Room for part of a large frame only
    writer.get_mut().budget = 5_000;
    assert!(writer.append(large_op(2)).is_err());
    assert_eq!(writer.get_ref().data.len(), clean_len);
    assert_eq!(writer.len(), clean_len as u64);
    assert_eq!(writer.current_lsn(), 1);

    // Later appends land directly after the last complete frame
    writer.get_mut().budget = usize::MAX;
    assert_eq!(writer.append(set_op(3)).unwrap(), 2);
    assert!(!writer.is_failed());

    let (_temp, log_path) = setup_temp_log();
    write_raw_frames(&log_path, &[writer.get_ref().data.clone()]);
    let (entries, result) = LogRecovery::recover(&log_path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].operation, set_op(3));
    assert_eq!(result.entries_corrupted, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_writer_rejects_appends_after_failed_rollback() {
    let mut sink = FlakySink::new(10);
    sink.truncate_fails = true;
    let mut writer = LogWriter::with_sink(sink, SyncStrategy::EveryWrite, 0).unwrap();

    assert!(writer.append(set_op(1)).is_err());
    assert!(writer.is_failed());

    writer.get_mut().budget = usize::MAX;
    assert!(matches!(
        writer.append(set_op(2)).unwrap_err(),
        StashError::Backend(_)
    ));
    assert_eq!(writer.get_ref().data.len(), 10);
}

// =============================================================================
// Backend Open Tests
// =============================================================================

#[test]
fn test_backend_opens_damaged_log_and_keeps_writing() {
    let (temp, log_path) = setup_temp_log();
    write_entries_via_writer(&log_path, 3);
    let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
    file.write_all(&[9; 11]).unwrap();
    drop(file);

    let backend = FileBackend::open_path(temp.path()).unwrap();
    assert_eq!(backend.len(), 3);
    assert_eq!(backend.current_lsn(), 3);
    backend.set("key99", "value99").unwrap();
    drop(backend);

    let reopened = FileBackend::open_path(temp.path()).unwrap();
    assert_eq!(reopened.len(), 4);
    assert_eq!(reopened.get("key99").unwrap(), Some("value99".to_string()));
}
