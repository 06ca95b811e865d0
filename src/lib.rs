//! # Planet Patrol
//!
//! Background synchronization and aggregation engine for the Planet Patrol
//! citizen-science review tool.
//!
//! Reviewers log dispositions against TESS candidates ("TICs") stored in a
//! partitioned Cloudant database, while supporting evidence (light curves,
//! reports) lives in a Google Drive folder hierarchy. This crate keeps two
//! in-memory views fresh and answers request-path questions from them:
//!
//! - **Candidate snapshot** - every candidate record, paged out of the
//!   document store every few minutes with retry on failure.
//! - **Folder index** - every folder under the evidence root, rebuilt hourly.
//!
//! ## Layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`models`] | Candidate records, reviewer keys, folder nodes |
//! | [`storage`] | Remote store traits, HTTP and in-memory backends |
//! | [`services`] | Builders, locator, aggregator, scheduler, review facade |
//! | [`state`] | Atomically swapped snapshot cells |
//! | [`io`] | CSV export |
//! | [`config`] | TOML + environment configuration |
//! | [`observability`] | Logging and metrics setup |
//! | [`cli`] | Command implementations behind the binary |
//!
//! ## Example
//!
//! ```rust,ignore
//! use planet_patrol::services::{CandidateSnapshotBuilder, SnapshotOptions};
//! use planet_patrol::storage::MemoryDocumentStore;
//!
//! let store = std::sync::Arc::new(MemoryDocumentStore::new());
//! let builder = CandidateSnapshotBuilder::new(store, SnapshotOptions::default());
//! let snapshot = builder.fetch().await?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod state;
pub mod storage;

pub use config::PatrolConfig;
pub use models::{
    CandidateDocument, CandidateId, CandidateRecord, CandidateSnapshot, Disposition, FileReference,
    FolderIndex, FolderNode, ReviewerKey,
};
pub use services::{
    CandidateSnapshotBuilder, FileLocator, FolderIndexBuilder, RefreshTask, RetryPolicy,
    ReviewService,
};
pub use state::{ReviewState, SnapshotCell};
pub use storage::{DocumentStore, FileStore, GroupPolicy, IdentityResolver};

/// Error type for planet patrol operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty disposition, malformed candidate id, bad config value |
/// | `NotFound` | Point read of a missing candidate or identity document |
/// | `Forbidden` | Group submission by an identity without group privilege |
/// | `Transient` | Network error, request timeout, HTTP 429 or 5xx |
/// | `OperationFailed` | Decode failures, other HTTP 4xx, I/O and config errors |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A disposition submission carries an empty verdict
    /// - A candidate id or reviewer key cannot be parsed
    /// - A configuration value is out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A requested document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to perform the operation.
    ///
    /// Raised when an identity without group privilege submits on behalf
    /// of the group.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A remote call failed in a way that may succeed on retry.
    ///
    /// Raised when:
    /// - The connection fails or the request times out
    /// - The remote store rate limits the request (HTTP 429)
    /// - The remote store returns a 5xx status
    #[error("transient failure in '{operation}': {cause}")]
    Transient {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - A remote response cannot be decoded
    /// - The remote store rejects a request (HTTP 4xx other than 404/429)
    /// - Configuration or log files cannot be read or written
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`].
    pub fn operation(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    /// Builds an [`Error::Transient`].
    pub fn transient(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::Transient {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Result type alias for planet patrol operations.
pub type Result<T> = std::result::Result<T, Error>;
