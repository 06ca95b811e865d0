//! Sync and aggregation services.
//!
//! Builders produce the two in-memory views, the scheduler keeps them
//! fresh, and the review service answers request-path calls from them.

mod dispositions;
mod file_locator;
mod folder_index;
mod retry;
mod review;
mod scheduler;
mod snapshot;

pub use dispositions::{
    AnswerSplit, CandidateTally, NamedDisposition, merge_disposition, resolve_reviewer_names,
    split_answered_unanswered,
};
pub use file_locator::{FileLocator, LocatorOptions};
pub use folder_index::{FolderIndexBuilder, FolderIndexOptions};
pub use retry::{DEFAULT_RETRY_BACKOFF, RetryPolicy};
pub use review::{CandidateDetail, CsvExport, ReviewService, Submission};
pub use scheduler::{RefreshOutcome, RefreshSource, RefreshTask};
pub use snapshot::{CandidateSnapshotBuilder, SnapshotOptions};

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Runs a remote call under a deadline; expiry is a transient failure.
pub(crate) async fn with_timeout<T>(
    timeout: Duration,
    operation: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::transient(
            operation,
            format!("timed out after {}ms", timeout.as_millis()),
        )),
    }
}
