//! Process-wide read-mostly state.
//!
//! Each refresh loop is the single writer of one cell; request handlers are
//! readers. A reader takes an `Arc` of the current value and keeps using it
//! even if a newer value is published meanwhile.

use crate::models::{CandidateSnapshot, FolderIndex};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Atomically replaceable shared value.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    inner: ArcSwap<T>,
}

impl<T> SnapshotCell<T> {
    /// Creates a cell holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn load(&self) -> Arc<T> {
        self.inner.load_full()
    }

    /// Publishes a new value, returning the one it replaced.
    pub fn replace(&self, value: T) -> Arc<T> {
        self.inner.swap(Arc::new(value))
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// The two views the request path reads.
#[derive(Debug)]
pub struct ReviewState {
    /// Latest candidate snapshot.
    pub candidates: Arc<SnapshotCell<CandidateSnapshot>>,
    /// Latest folder index.
    pub folders: Arc<SnapshotCell<FolderIndex>>,
}

impl ReviewState {
    /// Creates state with an empty snapshot and an empty index rooted at
    /// `root_id`.
    #[must_use]
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            candidates: Arc::new(SnapshotCell::new(CandidateSnapshot::empty())),
            folders: Arc::new(SnapshotCell::new(FolderIndex::empty(root_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateRecord;
    use crate::models::CandidateId;

    #[test]
    fn test_reader_keeps_old_value_after_replace() {
        let cell = SnapshotCell::new(CandidateSnapshot::empty());
        let before = cell.load();

        let previous = cell.replace(CandidateSnapshot::new(vec![CandidateRecord::empty(
            CandidateId::new("1"),
        )]));

        assert!(before.is_empty());
        assert!(previous.is_empty());
        assert_eq!(cell.load().len(), 1);
    }

    #[test]
    fn test_review_state_starts_empty() {
        let state = ReviewState::new("root");
        assert!(state.candidates.load().is_empty());
        assert!(state.candidates.load().fetched_at().is_none());
        assert_eq!(state.folders.load().root_id(), "root");
        assert!(state.folders.load().is_empty());
    }
}
