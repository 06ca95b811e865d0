//! Point-in-time view of every candidate record.

use super::{CandidateId, CandidateRecord};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// An immutable, fully materialized list of candidate records.
///
/// Snapshots are only ever replaced wholesale; see [`crate::state`].
#[derive(Debug, Clone, Default)]
pub struct CandidateSnapshot {
    records: Vec<CandidateRecord>,
    positions: HashMap<CandidateId, usize>,
    fetched_at: Option<DateTime<Utc>>,
}

impl CandidateSnapshot {
    /// The snapshot served before the first refresh completes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self::with_timestamp(records, Utc::now())
    }

    /// Creates a snapshot with an explicit fetch time.
    #[must_use]
    pub fn with_timestamp(records: Vec<CandidateRecord>, fetched_at: DateTime<Utc>) -> Self {
        let positions = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.id.clone(), i))
            .collect();
        Self {
            records,
            positions,
            fetched_at: Some(fetched_at),
        }
    }

    /// Records in store order.
    #[must_use]
    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn get(&self, id: &CandidateId) -> Option<&CandidateRecord> {
        self.positions.get(id).and_then(|&i| self.records.get(i))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When the snapshot was fetched; `None` for the startup placeholder.
    #[must_use]
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Iterates over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, CandidateRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a CandidateSnapshot {
    type Item = &'a CandidateRecord;
    type IntoIter = std::slice::Iter<'a, CandidateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
