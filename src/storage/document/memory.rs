//! In-memory document store for tests and offline runs.

use crate::storage::acquire_lock;
use crate::storage::traits::{DocumentStore, PartitionPage, PartitionQuery, PartitionRow};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Document store holding documents in key order.
///
/// Listing honors the query limit and an optional server-side page size, so
/// callers see the same multi-page behavior as the real store. Individual
/// list calls can be made to fail for retry tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<String, Value>>,
    page_size: Option<usize>,
    latency: Option<Duration>,
    failing_list_calls: Mutex<HashSet<usize>>,
    list_calls: AtomicUsize,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps every listing page at `page_size` rows.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the `call`-th listing (1-based, counted across the store's
    /// lifetime) fail with a transient error.
    pub fn fail_list_call(&self, call: usize) {
        acquire_lock(&self.failing_list_calls).insert(call);
    }

    /// Returns the number of listing calls served so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Stores a document under its `_id`, replacing any existing one.
    ///
    /// Documents without a string `_id` are ignored.
    pub fn put(&self, document: Value) {
        if let Some(id) = document.get("_id").and_then(Value::as_str) {
            let id = id.to_string();
            acquire_lock(&self.documents).insert(id, document);
        }
    }

    /// Removes a document.
    pub fn remove(&self, id: &str) -> Option<Value> {
        acquire_lock(&self.documents).remove(id)
    }

    /// Returns a copy of a stored document.
    #[must_use]
    pub fn document(&self, id: &str) -> Option<Value> {
        acquire_lock(&self.documents).get(id).cloned()
    }

    /// Returns the number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        acquire_lock(&self.documents).len()
    }

    /// Returns true if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn list_now(&self, partition: &str, query: &PartitionQuery) -> Result<PartitionPage> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if acquire_lock(&self.failing_list_calls).contains(&call) {
            return Err(Error::transient(
                "list_partition",
                format!("injected failure on call {call}"),
            ));
        }

        let prefix = format!("{partition}:");
        let documents = acquire_lock(&self.documents);
        let in_partition = documents.range(prefix.clone()..).take_while(|(k, _)| k.starts_with(&prefix));
        let total_rows = in_partition.clone().count();

        let limit = match (query.limit, self.page_size) {
            (Some(limit), Some(size)) => limit.min(size),
            (Some(limit), None) => limit,
            (None, Some(size)) => size,
            (None, None) => usize::MAX,
        };
        let rows = in_partition
            .filter(|(key, _)| query.start_key.as_ref().is_none_or(|start| *key >= start))
            .take(limit)
            .map(|(key, doc)| PartitionRow {
                id: key.clone(),
                doc: query.include_docs.then(|| doc.clone()),
            })
            .collect();

        Ok(PartitionPage { rows, total_rows })
    }

    fn insert_now(&self, document: &Value) -> Result<()> {
        let id = document
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidInput("document has no _id".to_string()))?
            .to_string();
        let mut documents = acquire_lock(&self.documents);
        let generation = documents
            .get(&id)
            .and_then(|existing| existing.get("_rev"))
            .and_then(Value::as_str)
            .and_then(|rev| rev.split_once('-'))
            .and_then(|(n, _)| n.parse::<u64>().ok())
            .unwrap_or(0);
        let mut stored = document.clone();
        if let Some(object) = stored.as_object_mut() {
            object.insert(
                "_rev".to_string(),
                Value::String(format!("{}-mem", generation + 1)),
            );
        }
        documents.insert(id, stored);
        Ok(())
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn partitioned_list(&self, partition: &str, query: &PartitionQuery) -> Result<PartitionPage> {
        self.simulate_latency().await;
        self.list_now(partition, query)
    }

    async fn get(&self, id: &str) -> Result<Option<Value>> {
        self.simulate_latency().await;
        Ok(self.document(id))
    }

    async fn insert(&self, document: &Value) -> Result<()> {
        self.simulate_latency().await;
        self.insert_now(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded(ids: &[&str]) -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        for id in ids {
            store.put(json!({"_id": id}));
        }
        store
    }

    #[tokio::test]
    async fn test_list_filters_partition_and_orders_keys() {
        let store = seeded(&["tic:3", "user:a", "tic:1", "tic:2", "tid:9"]);
        let page = store
            .partitioned_list("tic", &PartitionQuery::first_page())
            .await
            .unwrap();
        let ids: Vec<_> = page.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["tic:1", "tic:2", "tic:3"]);
        assert_eq!(page.total_rows, 3);
        assert!(page.rows.iter().all(|r| r.doc.is_some()));
    }

    #[tokio::test]
    async fn test_page_size_and_start_key() {
        let store = seeded(&["tic:1", "tic:2", "tic:3"]).with_page_size(2);
        let first = store
            .partitioned_list("tic", &PartitionQuery::first_page())
            .await
            .unwrap();
        assert_eq!(first.rows.len(), 2);

        let next = store
            .partitioned_list("tic", &PartitionQuery::after(&first.rows[1].id))
            .await
            .unwrap();
        assert_eq!(next.rows.len(), 1);
        assert_eq!(next.rows[0].id, "tic:3");
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = seeded(&["tic:1"]);
        store.fail_list_call(1);
        let err = store
            .partitioned_list("tic", &PartitionQuery::first_page())
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(
            store
                .partitioned_list("tic", &PartitionQuery::first_page())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_insert_bumps_revision() {
        let store = MemoryDocumentStore::new();
        store.insert(&json!({"_id": "tic:1"})).await.unwrap();
        store.insert(&json!({"_id": "tic:1", "x": 1})).await.unwrap();
        let doc = store.get("tic:1").await.unwrap().unwrap();
        assert_eq!(doc["_rev"], "2-mem");
        assert_eq!(doc["x"], 1);

        let err = store.insert(&json!({"x": 1})).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
