//! Remote store access.
//!
//! Two external systems feed the engine:
//! - **Document store**: a partitioned JSON store holding candidate and
//!   identity documents (Cloudant over HTTP, or in-memory for tests)
//! - **File store**: a folder tree of light-curve files queried by parent
//!   (Google Drive over HTTP, or in-memory for tests)

// Allow significant_drop_tightening - the in-memory backends hold their lock
// for the whole (short) operation.
#![allow(clippy::significant_drop_tightening)]

pub mod document;
pub mod files;
pub mod http;
pub mod traits;

pub use document::{CloudantStore, MemoryDocumentStore};
pub use files::{DriveStore, MemoryFileStore};
pub use http::Credentials;
pub use traits::{
    AnyGroupPolicy, ChildFilter, ChildPage, ChildQuery, DocumentIdentityResolver, DocumentStore,
    FOLDER_MIME_TYPE, FileItem, FileStore, GroupPolicy, IdentityResolver, PartitionPage,
    PartitionQuery, PartitionRow, PredicateGroupPolicy, StaticGroupPolicy,
    UserDocumentGroupPolicy,
};

use std::sync::{Mutex, MutexGuard};

/// Locks a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("In-memory store mutex was poisoned, recovering");
            poisoned.into_inner()
        },
    }
}
