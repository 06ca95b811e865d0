//! Finds evidence files for a candidate.

use super::with_timeout;
use crate::Result;
use crate::models::{CandidateId, FileReference, FolderIndex};
use crate::storage::{ChildFilter, ChildQuery, FileStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Tuning for file lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Items requested per listing page.
    pub page_size: u32,
    /// Deadline for each listing request.
    pub request_timeout: Duration,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            page_size: 1000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Searches every indexed folder for files named after a candidate.
pub struct FileLocator<F> {
    store: Arc<F>,
    options: LocatorOptions,
}

impl<F: FileStore> FileLocator<F> {
    /// Creates a locator.
    #[must_use]
    pub const fn new(store: Arc<F>, options: LocatorOptions) -> Self {
        Self { store, options }
    }

    /// Replaces the lookup options.
    #[must_use]
    pub const fn with_options(mut self, options: LocatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns files whose name contains the candidate id, in index order.
    ///
    /// Only folders in `index` are searched (the root is not). A folder
    /// whose listing fails is logged and contributes nothing; the lookup
    /// itself never fails.
    #[instrument(skip(self, index), fields(candidate = %candidate, folders = index.len()))]
    pub async fn locate(&self, index: &FolderIndex, candidate: &CandidateId) -> Vec<FileReference> {
        if candidate.is_blank() {
            return Vec::new();
        }

        let mut found = Vec::new();
        for folder in index.folders() {
            match self.files_in(&folder.id, candidate.as_str()).await {
                Ok(files) => found.extend(files),
                Err(e) => {
                    tracing::warn!(
                        folder = %folder.id,
                        error = %e,
                        "File lookup failed for folder, skipping"
                    );
                    metrics::counter!("file_locator_folder_failures_total").increment(1);
                },
            }
        }
        found
    }

    async fn files_in(&self, folder_id: &str, name_part: &str) -> Result<Vec<FileReference>> {
        let mut files = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut query = ChildQuery::new(
            ChildFilter::FilesNameContains(name_part.to_string()),
            self.options.page_size,
        );

        loop {
            let page = with_timeout(
                self.options.request_timeout,
                "list_files",
                self.store.list_children(folder_id, &query),
            )
            .await?;
            files.extend(
                page.items
                    .into_iter()
                    .filter(|item| !item.is_folder())
                    .map(crate::storage::FileItem::into_reference),
            );

            match page.next_page_token {
                Some(token) if seen_tokens.insert(token.clone()) => query = query.continued(token),
                Some(token) => {
                    tracing::warn!(folder = %folder_id, token = %token, "Page token repeated, stopping");
                    break;
                },
                None => break,
            }
        }
        Ok(files)
    }
}
