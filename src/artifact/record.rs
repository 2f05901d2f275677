//! Records persisted for an artifact

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// How the structural part of an artifact is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyKind {
    /// Structured (JSON) topology; the only kind the store accepts
    #[serde(rename = "JSON")]
    Structured,

    /// Topology as an opaque binary blob; rejected on save
    #[serde(rename = "ArrayBuffer")]
    OpaqueBinary,
}

/// Metadata record written under the info key
///
/// Field names on disk match records written by existing clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    #[serde(rename = "dateSaved")]
    pub saved_at: DateTime<Utc>,

    #[serde(rename = "modelTopologyType")]
    pub topology_kind: TopologyKind,

    #[serde(rename = "weightDataBytes")]
    pub weight_byte_length: u64,
}

impl ArtifactInfo {
    /// Info for a structured artifact carrying `weight_bytes`, stamped now
    pub fn for_weights(weight_bytes: &[u8]) -> Self {
        Self {
            saved_at: Utc::now(),
            topology_kind: TopologyKind::Structured,
            weight_byte_length: weight_bytes.len() as u64,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Structural (non-weight) part of an artifact
#[derive(Debug, Clone, PartialEq)]
pub enum Structure {
    Structured(Value),
    Binary(Vec<u8>),
}

impl Structure {
    pub fn kind(&self) -> TopologyKind {
        match self {
            Structure::Structured(_) => TopologyKind::Structured,
            Structure::Binary(_) => TopologyKind::OpaqueBinary,
        }
    }
}

/// A complete artifact: structure plus raw weight bytes
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPayload {
    pub structure: Structure,
    pub weight_bytes: Vec<u8>,
}

impl ArtifactPayload {
    /// Payload with a structured (JSON) topology
    pub fn new(structure: Value, weight_bytes: Vec<u8>) -> Self {
        Self {
            structure: Structure::Structured(structure),
            weight_bytes,
        }
    }
}
