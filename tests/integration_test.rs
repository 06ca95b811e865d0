//! End-to-end tests over the in-memory stores.
//!
//! Covers the full path from store contents through the builders and the
//! shared state to the request-path answers:
//! - Folder index size for synthetic trees, cycles and shared folders
//! - File lookup against a built index
//! - Answered/unanswered split and CSV export over a fetched snapshot
//! - Refresh failures leave the published views untouched

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use planet_patrol::io::{ExportMode, HEADER};
use planet_patrol::models::{CandidateId, CandidateSnapshot, FolderIndex, ReviewerKey};
use planet_patrol::services::{
    CandidateSnapshotBuilder, FolderIndexBuilder, FolderIndexOptions, RefreshTask, RetryPolicy,
    ReviewService, SnapshotOptions, split_answered_unanswered,
};
use planet_patrol::state::{ReviewState, SnapshotCell};
use planet_patrol::storage::{
    DocumentIdentityResolver, MemoryDocumentStore, MemoryFileStore, StaticGroupPolicy,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;

// ============================================================================
// Helpers
// ============================================================================

fn no_delay() -> SnapshotOptions {
    SnapshotOptions::default().with_page_delay(Duration::ZERO)
}

/// Builds a complete tree of `depth` levels below `root` with `branching`
/// sub-folders per folder.
fn synthetic_tree(store: &MemoryFileStore, root: &str, branching: usize, depth: usize) {
    let mut level = vec![root.to_string()];
    for _ in 0..depth {
        let mut next = Vec::with_capacity(level.len() * branching);
        for parent in &level {
            for i in 0..branching {
                let id = format!("{parent}/{i}");
                store.add_folder(parent, &id, &format!("folder {i}"));
                next.push(id);
            }
        }
        level = next;
    }
}

async fn build_index(store: MemoryFileStore, root: &str) -> FolderIndex {
    FolderIndexBuilder::new(Arc::new(store), FolderIndexOptions::new(root))
        .build()
        .await
        .unwrap()
}

type Service = ReviewService<
    MemoryDocumentStore,
    MemoryFileStore,
    StaticGroupPolicy,
    DocumentIdentityResolver<MemoryDocumentStore>,
>;

fn review_service(documents: &Arc<MemoryDocumentStore>, files: Arc<MemoryFileStore>) -> Service {
    ReviewService::new(
        Arc::clone(documents),
        files,
        Arc::new(ReviewState::new("root")),
        StaticGroupPolicy::default(),
        DocumentIdentityResolver::new(Arc::clone(documents)),
    )
}

// ============================================================================
// Folder index
// ============================================================================

#[test_case(2, 1 ; "binary one level")]
#[test_case(2, 3 ; "binary three levels")]
#[test_case(3, 2 ; "ternary two levels")]
#[test_case(4, 3 ; "quaternary three levels")]
#[test_case(10, 2 ; "wide shallow")]
#[tokio::test]
async fn test_folder_count_matches_complete_tree(branching: usize, depth: usize) {
    let store = MemoryFileStore::new().with_page_size(3);
    synthetic_tree(&store, "root", branching, depth);

    let index = build_index(store, "root").await;

    let b = u32::try_from(branching).unwrap();
    let d = u32::try_from(depth).unwrap();
    let expected = (b.pow(d + 1) - 1) / (b - 1) - 1;
    assert_eq!(index.len(), usize::try_from(expected).unwrap());
    assert!(!index.ids().contains("root"));
}

#[tokio::test]
async fn test_cycle_and_shared_folder_listed_once() {
    let store = MemoryFileStore::new();
    store.add_folder("root", "a", "A");
    store.add_folder("root", "b", "B");
    store.add_folder("a", "shared", "Shared");
    store.add_folder("b", "shared", "Shared");
    store.add_folder("shared", "a", "A again");
    store.add_folder("shared", "root", "Root again");

    let index = build_index(store, "root").await;

    let mut ids: Vec<_> = index.ids().into_iter().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b", "shared"]);
}

// ============================================================================
// File locator
// ============================================================================

#[tokio::test]
async fn test_locate_finds_single_match_in_second_folder() {
    let files = Arc::new(MemoryFileStore::new());
    files.add_folder("root", "folder-a", "A");
    files.add_folder("root", "folder-b", "B");
    files.add_file("folder-a", "x", "unrelated.pdf", "application/pdf");
    files.add_file("folder-b", "f-100", "matches-TIC100.pdf", "application/pdf");

    let documents = Arc::new(MemoryDocumentStore::new());
    let service = review_service(&documents, Arc::clone(&files));
    let index = FolderIndexBuilder::new(files, FolderIndexOptions::new("root"))
        .build()
        .await
        .unwrap();
    assert_eq!(index.len(), 2);
    service.state().folders.replace(index);

    let found = service.files(&CandidateId::new("100")).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "f-100");
    assert_eq!(found[0].name, "matches-TIC100.pdf");

    assert!(service.files(&CandidateId::new("999")).await.is_empty());
}

// ============================================================================
// Snapshot, split and export
// ============================================================================

fn seed_split_example(store: &MemoryDocumentStore) {
    store.put(json!({"_id": "tic:100", "dispositions": {}}));
    store.put(json!({
        "_id": "tic:200",
        "dispositions": {"user:a": {"disposition": "PC", "comments": ""}}
    }));
}

#[tokio::test]
async fn test_split_over_fetched_snapshot() {
    let store = MemoryDocumentStore::new();
    seed_split_example(&store);
    let snapshot = CandidateSnapshotBuilder::new(Arc::new(store), no_delay())
        .fetch()
        .await
        .unwrap();

    let split = split_answered_unanswered(&snapshot, &ReviewerKey::new("user:a"));

    assert_eq!(split.answered.len(), 1);
    assert_eq!(split.answered[0].id, CandidateId::new("200"));
    assert_eq!(split.answered[0].length, 1);
    assert_eq!(split.unanswered.len(), 1);
    assert_eq!(split.unanswered[0].id, CandidateId::new("100"));
    assert_eq!(split.unanswered[0].length, 0);
}

#[tokio::test]
async fn test_export_designated_only_emits_one_row() {
    let documents = Arc::new(MemoryDocumentStore::new());
    documents.put(json!({
        "_id": "tic:100",
        "sectors": "1,2",
        "dispositions": {"user:paper": {"disposition": "PC", "comments": "clear \"U\" shape"}}
    }));
    documents.put(json!({
        "_id": "tic:200",
        "dispositions": {"user:a": {"disposition": "EB", "comments": ""}}
    }));
    documents.put(json!({"_id": "tic:300"}));

    let service = review_service(&documents, Arc::new(MemoryFileStore::new()));
    let snapshot = CandidateSnapshotBuilder::new(Arc::clone(&documents), no_delay())
        .fetch()
        .await
        .unwrap();
    service.state().candidates.replace(snapshot);

    let export = service.export_csv(ExportMode::DesignatedOnly).unwrap();
    let text = String::from_utf8(export.content).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(export.rows, 1);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER.join(","));
    assert!(lines[1].starts_with("\"100\",\"https://exofop.ipac.caltech.edu/tess/target.php?id=100\",\"1,2\""));
    assert!(lines[1].ends_with("\"PC\",\"clear \"\"U\"\" shape\""));

    let all = service.export_csv(ExportMode::All).unwrap();
    assert_eq!(all.rows, 3);
}

// ============================================================================
// Refresh failures
// ============================================================================

#[tokio::test]
async fn test_failed_refresh_keeps_published_snapshot() {
    let store = Arc::new(MemoryDocumentStore::new().with_page_size(1));
    seed_split_example(&store);
    let cell = Arc::new(SnapshotCell::new(CandidateSnapshot::empty()));
    let task = RefreshTask::new(
        CandidateSnapshotBuilder::new(Arc::clone(&store), no_delay()),
        Arc::clone(&cell),
        Duration::from_secs(300),
    )
    .with_retry(RetryPolicy::single_attempt());

    assert_eq!(task.refresh_once().await.unwrap(), 2);
    let published = cell.load();

    // Second page of the next fetch fails after the first succeeded.
    store.put(json!({"_id": "tic:300"}));
    let next_call = store.list_calls() + 2;
    store.fail_list_call(next_call);
    assert!(task.refresh_once().await.is_err());

    let current = cell.load();
    assert!(Arc::ptr_eq(&published, &current));
    assert_eq!(current.len(), 2);
}

#[tokio::test]
async fn test_failed_folder_build_keeps_published_index() {
    let files = Arc::new(MemoryFileStore::new());
    files.add_folder("root", "a", "A");
    files.add_folder("a", "b", "B");
    let cell = Arc::new(SnapshotCell::new(FolderIndex::empty("root")));
    let task = RefreshTask::new(
        FolderIndexBuilder::new(Arc::clone(&files), FolderIndexOptions::new("root")),
        Arc::clone(&cell),
        Duration::from_secs(3600),
    )
    .with_retry(RetryPolicy::single_attempt());

    assert_eq!(task.refresh_once().await.unwrap(), 2);
    files.fail_parent("b");
    assert!(task.refresh_once().await.is_err());
    assert_eq!(cell.load().len(), 2);
}
