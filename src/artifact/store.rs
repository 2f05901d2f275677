//! Artifact Store
//!
//! Save/load/exists/delete of one named artifact.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::KvBackend;
use crate::config::Config;
use crate::error::{Result, StashError};

use super::{ArtifactInfo, ArtifactKeySet, ArtifactName, ArtifactPayload, PartitionPlan, Structure};

/// Handle for one artifact in a key-value backend
///
/// Calls are serial: every backend request of a `save` or `load` is issued
/// in a fixed order and completes before the next. Two concurrent saves of
/// the same name race on shared keys; callers wanting single-writer
/// semantics must serialize above this type.
pub struct ArtifactStore<B> {
    backend: B,
    name: ArtifactName,
    keys: ArtifactKeySet,
    partition_count: usize,
}

impl<B: KvBackend> ArtifactStore<B> {
    /// Handle using the default namespace and partition count
    pub fn new(backend: B, name: impl Into<String>) -> Result<Self> {
        Self::with_config(backend, name, &Config::default())
    }

    /// Handle using `config.namespace` and `config.partition_count`
    pub fn with_config(backend: B, name: impl Into<String>, config: &Config) -> Result<Self> {
        config.validate()?;
        let name = ArtifactName::new(name)?;
        let keys = ArtifactKeySet::new(&config.namespace, &name);

        Ok(Self {
            backend,
            name,
            keys,
            partition_count: config.partition_count,
        })
    }

    /// Persist `payload`, replacing any earlier artifact of this name
    ///
    /// A binary structure is rejected before anything is written. On any
    /// backend failure every owned key is deleted (best effort) and the
    /// original failure is returned wrapped in `SaveFailed`.
    pub fn save(&self, payload: &ArtifactPayload) -> Result<ArtifactInfo> {
        let structure = match &payload.structure {
            Structure::Structured(value) => value,
            Structure::Binary(_) => {
                return Err(StashError::UnsupportedTopology(self.name.to_string()));
            }
        };

        let info = ArtifactInfo::for_weights(&payload.weight_bytes);
        let encoded = STANDARD.encode(&payload.weight_bytes);

        match self.write_records(&info, structure, &encoded) {
            Ok(partitions) => {
                debug!(
                    artifact = %self.name,
                    weight_bytes = info.weight_byte_length,
                    encoded_len = encoded.len(),
                    partitions,
                    "artifact saved"
                );
                Ok(info)
            }
            Err(cause) => {
                self.cleanup();
                Err(StashError::SaveFailed {
                    name: self.name.to_string(),
                    source: Box::new(cause),
                })
            }
        }
    }

    /// Reassemble the artifact from its records
    pub fn load(&self) -> Result<ArtifactPayload> {
        let info = self
            .info()?
            .ok_or_else(|| StashError::ArtifactNotFound(self.name.to_string()))?;

        let structure_text = self
            .backend
            .get(&self.keys.structure_key)?
            .ok_or_else(|| StashError::MissingStructure(self.name.to_string()))?;
        let structure: Value = serde_json::from_str(&structure_text)?;

        let mut encoded = String::new();
        for key in self.keys.partition_keys(self.partition_count) {
            if let Some(part) = self.backend.get(&key)? {
                encoded.push_str(&part);
            }
        }

        if encoded.is_empty() {
            return Err(StashError::MissingWeightData(self.name.to_string()));
        }

        let weight_bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| StashError::CorruptWeightData {
                name: self.name.to_string(),
                reason: e.to_string(),
            })?;

        if weight_bytes.len() as u64 != info.weight_byte_length {
            return Err(StashError::WeightLengthMismatch {
                name: self.name.to_string(),
                expected: info.weight_byte_length,
                actual: weight_bytes.len() as u64,
            });
        }

        debug!(
            artifact = %self.name,
            weight_bytes = weight_bytes.len(),
            "artifact loaded"
        );

        Ok(ArtifactPayload {
            structure: Structure::Structured(structure),
            weight_bytes,
        })
    }

    /// True iff the info record is present
    pub fn exists(&self) -> Result<bool> {
        Ok(self.backend.get(&self.keys.info_key)?.is_some())
    }

    /// Read only the metadata record
    pub fn info(&self) -> Result<Option<ArtifactInfo>> {
        self.backend
            .get(&self.keys.info_key)?
            .map(|text| ArtifactInfo::from_json(&text))
            .transpose()
    }

    /// Remove every key this artifact owns; missing keys are fine
    pub fn delete(&self) -> Result<()> {
        self.backend.delete(&self.keys.info_key)?;
        self.backend.delete(&self.keys.structure_key)?;
        for key in self.keys.partition_keys(self.partition_count) {
            self.backend.delete(&key)?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &ArtifactName {
        &self.name
    }

    pub fn keys(&self) -> &ArtifactKeySet {
        &self.keys
    }

    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// info → structure → partitions; returns the number of partitions written
    fn write_records(
        &self,
        info: &ArtifactInfo,
        structure: &Value,
        encoded: &str,
    ) -> Result<usize> {
        self.backend.set(&self.keys.info_key, &info.to_json()?)?;
        self.backend
            .set(&self.keys.structure_key, &serde_json::to_string(structure)?)?;

        let plan = PartitionPlan::new(encoded.len(), self.partition_count);
        let mut written = 0;
        for (index, range) in plan.slots() {
            let key = self.keys.partition_key(index);
            match range {
                Some(range) => {
                    self.backend.set(&key, &encoded[range])?;
                    written += 1;
                }
                // Stale slot from an earlier, longer save
                None => self.backend.delete(&key)?,
            }
        }

        Ok(written)
    }

    /// Delete every owned key, logging (never returning) failures
    fn cleanup(&self) {
        let keys = std::iter::once(self.keys.info_key.clone())
            .chain(self.keys.partition_keys(self.partition_count))
            .chain(std::iter::once(self.keys.structure_key.clone()));

        let mut failures = 0usize;
        for key in keys {
            if let Err(e) = self.backend.delete(&key) {
                failures += 1;
                warn!(artifact = %self.name, key = %key, error = %e, "cleanup delete failed");
            }
        }

        if failures > 0 {
            warn!(artifact = %self.name, failures, "cleanup after failed save was incomplete");
        }
    }
}
