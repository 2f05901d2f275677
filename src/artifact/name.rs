//! Artifact names and the keys derived from them

use std::fmt;

use crate::error::{Result, StashError};

const PATH_SEPARATOR: &str = "/";
const INFO_SUFFIX: &str = "info";
const STRUCTURE_SUFFIX: &str = "model_without_weight";
const WEIGHT_DATA_SUFFIX: &str = "weight_data";

/// Non-empty identifier an artifact is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Fails with `InvalidName` for empty input; any other string is kept
    /// verbatim so existing keys stay reachable
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StashError::InvalidName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Storage keys owned by one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKeySet {
    pub info_key: String,
    pub structure_key: String,
    pub weight_key_prefix: String,
}

impl ArtifactKeySet {
    pub fn new(namespace: &str, name: &ArtifactName) -> Self {
        let join = |suffix: &str| [namespace, name.as_str(), suffix].join(PATH_SEPARATOR);

        Self {
            info_key: join(INFO_SUFFIX),
            structure_key: join(STRUCTURE_SUFFIX),
            weight_key_prefix: join(WEIGHT_DATA_SUFFIX),
        }
    }

    /// "…/weight_data" + index → "…/weight_data_7"
    pub fn partition_key(&self, index: usize) -> String {
        format!("{}_{}", self.weight_key_prefix, index)
    }

    /// Every partition key in `0..=partition_count`
    pub fn partition_keys(&self, partition_count: usize) -> impl Iterator<Item = String> + '_ {
        (0..=partition_count).map(move |index| self.partition_key(index))
    }
}
