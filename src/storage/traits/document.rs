//! Document store trait.

use crate::Result;
use serde_json::Value;
use std::future::Future;

/// Options for a partitioned listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionQuery {
    /// Whether rows should carry their full documents.
    pub include_docs: bool,
    /// Inclusive lower bound on document keys.
    pub start_key: Option<String>,
    /// Maximum rows to return; `None` lets the store decide.
    pub limit: Option<usize>,
}

impl PartitionQuery {
    /// Query for the first page, with documents.
    #[must_use]
    pub const fn first_page() -> Self {
        Self {
            include_docs: true,
            start_key: None,
            limit: None,
        }
    }

    /// Query for the page after `last_key`, with documents.
    ///
    /// Appends a NUL sentinel so the bound excludes `last_key` itself.
    #[must_use]
    pub fn after(last_key: &str) -> Self {
        Self {
            include_docs: true,
            start_key: Some(format!("{last_key}\0")),
            limit: None,
        }
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// A row of a partitioned listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionRow {
    /// Document key.
    pub id: String,
    /// Full document, when requested.
    pub doc: Option<Value>,
}

/// A page of a partitioned listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionPage {
    /// Rows in key order.
    pub rows: Vec<PartitionRow>,
    /// Number of documents in the whole partition.
    pub total_rows: usize,
}

/// A partitioned JSON document store.
///
/// Implementations must return rows in ascending key order so the
/// exclusive-cursor pagination in the snapshot builder visits each document
/// once.
pub trait DocumentStore: Send + Sync {
    /// Lists documents of a partition.
    fn partitioned_list(
        &self,
        partition: &str,
        query: &PartitionQuery,
    ) -> impl Future<Output = Result<PartitionPage>> + Send;

    /// Reads a document; `Ok(None)` when it does not exist.
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Value>>> + Send;

    /// Creates or updates a document (keyed by its `_id`).
    fn insert(&self, document: &Value) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_appends_sentinel() {
        let query = PartitionQuery::after("tic:100");
        assert_eq!(query.start_key.as_deref(), Some("tic:100\0"));
        assert!(query.include_docs);
        assert!(query.start_key.as_deref() > Some("tic:100"));
        assert!(query.start_key.as_deref() < Some("tic:1000"));
    }
}
