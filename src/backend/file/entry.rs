//! Log entry definitions
//!
//! Defines the structure and framing of individual log records.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StashError};

/// Frame header: CRC32 (4) + payload length (4)
pub const HEADER_SIZE: usize = 8;

/// A single record in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to apply
    pub operation: Operation,

    /// Timestamp (unix millis) when the entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Store a value under a key
    Set { key: String, value: String },

    /// Remove a key
    Delete { key: String },
}

impl Operation {
    pub fn key(&self) -> &str {
        match self {
            Operation::Set { key, .. } | Operation::Delete { key } => key,
        }
    }
}

impl LogEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            lsn,
            operation,
            timestamp,
        }
    }

    /// Encode as a framed record: [crc][len][payload]
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        let len = u32::try_from(payload.len()).map_err(|_| {
            StashError::Serialization(format!(
                "log record of {} bytes exceeds frame limit",
                payload.len()
            ))
        })?;

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode one framed record, verifying its checksum
    ///
    /// `bytes` must hold exactly one frame.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let (crc, len) = read_header(bytes).ok_or_else(|| {
            StashError::LogCorruption(format!("frame of {} bytes has no header", bytes.len()))
        })?;

        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != len as usize {
            return Err(StashError::LogCorruption(format!(
                "frame declares {} payload bytes, found {}",
                len,
                payload.len()
            )));
        }

        if crc32fast::hash(payload) != crc {
            return Err(StashError::LogCorruption("CRC mismatch".to_string()));
        }

        Ok(bincode::deserialize(payload)?)
    }
}

/// Parse a frame header into (crc, payload_len)
pub(crate) fn read_header(bytes: &[u8]) -> Option<(u32, u32)> {
    let header = bytes.get(..HEADER_SIZE)?;
    let crc = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    Some((crc, len))
}
