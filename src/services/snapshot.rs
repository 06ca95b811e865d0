//! Candidate snapshot builder.

use super::with_timeout;
use crate::models::{
    CANDIDATE_PARTITION, CandidateDocument, CandidateId, CandidateRecord, CandidateSnapshot,
};
use crate::storage::{DocumentStore, PartitionQuery, PartitionRow};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Tuning for snapshot builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Partition holding candidate documents.
    pub partition: String,
    /// Pause between consecutive page requests.
    pub page_delay: Duration,
    /// Deadline for each page request.
    pub request_timeout: Duration,
    /// Rows requested per page; `None` lets the store decide.
    pub page_limit: Option<usize>,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            partition: CANDIDATE_PARTITION.to_string(),
            page_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            page_limit: None,
        }
    }
}

impl SnapshotOptions {
    /// Sets the inter-page delay.
    #[must_use]
    pub const fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Sets the per-request deadline.
    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_limit(mut self, page_limit: Option<usize>) -> Self {
        self.page_limit = page_limit;
        self
    }
}

/// Pages the candidate partition into a [`CandidateSnapshot`].
pub struct CandidateSnapshotBuilder<D> {
    store: Arc<D>,
    options: SnapshotOptions,
}

impl<D: DocumentStore> CandidateSnapshotBuilder<D> {
    /// Creates a builder.
    #[must_use]
    pub const fn new(store: Arc<D>, options: SnapshotOptions) -> Self {
        Self { store, options }
    }

    /// Returns the build options.
    #[must_use]
    pub const fn options(&self) -> &SnapshotOptions {
        &self.options
    }

    /// Fetches every candidate record.
    ///
    /// Pages use an exclusive cursor (`startkey = last id + NUL`) and stop
    /// once the rows seen reach the reported total. Rows that cannot be
    /// decoded are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first page failure (including timeouts), or a transient
    /// error when a page comes back empty before the reported total. Nothing
    /// built so far is returned.
    #[instrument(skip(self), fields(partition = %self.options.partition))]
    pub async fn fetch(&self) -> Result<CandidateSnapshot> {
        let start = Instant::now();
        let mut records = Vec::new();
        let mut seen = 0usize;
        let mut pages = 0usize;
        let mut query = PartitionQuery::first_page().with_limit(self.options.page_limit);

        loop {
            if pages > 0 && !self.options.page_delay.is_zero() {
                tokio::time::sleep(self.options.page_delay).await;
            }
            let page = with_timeout(
                self.options.request_timeout,
                "list_partition",
                self.store.partitioned_list(&self.options.partition, &query),
            )
            .await?;
            pages += 1;

            let total = page.total_rows;
            let Some(last_key) = page.rows.last().map(|row| row.id.clone()) else {
                if seen < total {
                    return Err(Error::transient(
                        "list_partition",
                        format!("empty page after {seen} of {total} rows"),
                    ));
                }
                break;
            };
            seen += page.rows.len();
            records.extend(page.rows.into_iter().filter_map(decode_row));

            if seen >= total {
                break;
            }
            query = PartitionQuery::after(&last_key).with_limit(self.options.page_limit);
        }

        tracing::debug!(
            records = records.len(),
            pages,
            elapsed_ms = start.elapsed().as_millis(),
            "Fetched candidate snapshot"
        );
        Ok(CandidateSnapshot::new(records))
    }
}

fn decode_row(row: PartitionRow) -> Option<CandidateRecord> {
    let skip = |reason: &str| {
        tracing::warn!(key = %row.id, reason, "Skipping candidate row");
        metrics::counter!("candidate_rows_skipped_total").increment(1);
    };

    let id = match CandidateId::from_document_key(&row.id) {
        Ok(id) => id,
        Err(e) => {
            skip(&e.to_string());
            return None;
        },
    };
    let Some(doc) = row.doc.clone() else {
        skip("row carries no document");
        return None;
    };
    match CandidateDocument::from_value(doc) {
        Ok(document) => Some(CandidateRecord::new(id, document)),
        Err(e) => {
            skip(&e.to_string());
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{RefreshTask, RetryPolicy};
    use crate::state::SnapshotCell;
    use crate::storage::{MemoryDocumentStore, PartitionPage};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn options() -> SnapshotOptions {
        SnapshotOptions::default().with_page_delay(Duration::ZERO)
    }

    fn store_with(n: usize, page_size: usize) -> Arc<MemoryDocumentStore> {
        let store = MemoryDocumentStore::new().with_page_size(page_size);
        for i in 0..n {
            store.put(json!({"_id": format!("tic:{i:04}"), "sectors": "1"}));
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_fetch_all_pages() {
        let store = store_with(7, 3);
        let snapshot = CandidateSnapshotBuilder::new(Arc::clone(&store), options())
            .fetch()
            .await
            .unwrap();
        assert_eq!(snapshot.len(), 7);
        assert_eq!(store.list_calls(), 3);
        assert_eq!(snapshot.records()[0].id.as_str(), "0000");
        assert!(snapshot.fetched_at().is_some());
    }

    #[tokio::test]
    async fn test_empty_partition() {
        let store = Arc::new(MemoryDocumentStore::new());
        let snapshot = CandidateSnapshotBuilder::new(Arc::clone(&store), options())
            .fetch()
            .await
            .unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_row_is_skipped() {
        let store = store_with(2, 10);
        store.put(json!({"_id": "tic:bad", "dispositions": "not a map"}));
        let snapshot = CandidateSnapshotBuilder::new(store, options())
            .fetch()
            .await
            .unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get(&CandidateId::new("bad")).is_none());
    }

    #[tokio::test]
    async fn test_page_failure_aborts() {
        let store = store_with(5, 2);
        store.fail_list_call(2);
        let err = CandidateSnapshotBuilder::new(store, options())
            .fetch()
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_timeout_is_transient() {
        let store = Arc::new(
            MemoryDocumentStore::new().with_latency(Duration::from_secs(60)),
        );
        let builder = CandidateSnapshotBuilder::new(
            store,
            options().with_request_timeout(Duration::from_secs(1)),
        );
        let err = builder.fetch().await.unwrap_err();
        assert!(matches!(err, Error::Transient { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_pages_only() {
        let store = store_with(4, 2);
        let builder = CandidateSnapshotBuilder::new(
            store,
            SnapshotOptions::default().with_page_delay(Duration::from_secs(1)),
        );
        let started = tokio::time::Instant::now();
        builder.fetch().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    /// Store whose partition shrinks mid-walk: the first page reports five
    /// rows but carries two, every later page is empty.
    #[derive(Default)]
    struct ShrinkingStore {
        calls: AtomicUsize,
    }

    impl DocumentStore for ShrinkingStore {
        async fn partitioned_list(
            &self,
            _partition: &str,
            _query: &PartitionQuery,
        ) -> Result<PartitionPage> {
            let rows = if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                (0..2)
                    .map(|i| PartitionRow {
                        id: format!("tic:{i}"),
                        doc: Some(json!({"_id": format!("tic:{i}")})),
                    })
                    .collect()
            } else {
                Vec::new()
            };
            Ok(PartitionPage {
                rows,
                total_rows: 5,
            })
        }

        async fn get(&self, _id: &str) -> Result<Option<Value>> {
            Ok(None)
        }

        async fn insert(&self, _document: &Value) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_empty_page_before_total_is_transient() {
        let builder = CandidateSnapshotBuilder::new(Arc::new(ShrinkingStore::default()), options());
        let err = builder.fetch().await.unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("empty page after 2 of 5 rows"));
    }

    #[tokio::test]
    async fn test_short_walk_keeps_published_snapshot() {
        let cell = Arc::new(SnapshotCell::new(CandidateSnapshot::new(vec![
            CandidateRecord::empty(CandidateId::new("100")),
        ])));
        let published = cell.load();
        let task = RefreshTask::new(
            CandidateSnapshotBuilder::new(Arc::new(ShrinkingStore::default()), options()),
            Arc::clone(&cell),
            Duration::from_secs(300),
        )
        .with_retry(RetryPolicy::single_attempt());

        assert!(task.refresh_once().await.is_err());
        assert!(Arc::ptr_eq(&published, &cell.load()));
    }
}
