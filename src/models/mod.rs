//! Data models for planet patrol.
//!
//! Candidate records as stored in the document store, the reviewer keys
//! that index their dispositions, and the folder/file shapes of the
//! evidence hierarchy.

mod candidate;
mod folder;
pub mod glossary;
mod reviewer;
mod snapshot;

pub use candidate::{
    AttributeValue, CANDIDATE_PARTITION, CandidateDocument, CandidateId, CandidateRecord,
    KnownField,
};
pub use folder::{FileReference, FolderIndex, FolderNode};
pub use reviewer::{Disposition, ReviewerKey};
pub use snapshot::CandidateSnapshot;

use serde::{Deserialize, Deserializer};

/// Deserializes `null` as the type's default value.
///
/// Older candidate documents carry `"dispositions": null` and
/// `"comments": null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
