//! Artifact Module
//!
//! Saves and restores one named artifact (metadata + structure + weight
//! bytes) against a [`KvBackend`](crate::backend::KvBackend) whose entries
//! are too small to hold the weights in one piece.
//!
//! ## Key Layout
//! ```text
//! <namespace>/<name>/info                    ArtifactInfo (JSON)
//! <namespace>/<name>/model_without_weight    structure (JSON)
//! <namespace>/<name>/weight_data_0           ┐
//! ...                                        ├ base64 weight text, sliced
//! <namespace>/<name>/weight_data_<N>         ┘ (slot N holds the remainder)
//! ```
//!
//! ## Write Order
//! info → structure → partitions ascending. Any failure triggers a
//! best-effort delete of every owned key before the error is returned.

mod name;
mod record;
mod partition;
mod store;

pub use name::{ArtifactKeySet, ArtifactName};
pub use record::{ArtifactInfo, ArtifactPayload, Structure, TopologyKind};
pub use partition::PartitionPlan;
pub use store::ArtifactStore;
