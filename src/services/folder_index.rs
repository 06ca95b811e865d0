//! Folder index builder.

use super::with_timeout;
use crate::models::{FolderIndex, FolderNode};
use crate::storage::{ChildFilter, ChildQuery, FileItem, FileStore};
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Tuning for folder index builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderIndexOptions {
    /// Folder the walk starts from; not itself part of the index.
    pub root_id: String,
    /// Items requested per listing page.
    pub page_size: u32,
    /// Deadline for each listing request.
    pub request_timeout: Duration,
    /// Deepest level a folder may sit at; a deeper folder fails the build.
    pub max_depth: usize,
}

impl FolderIndexOptions {
    /// Options for a walk from `root_id` with default limits.
    #[must_use]
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            page_size: 1000,
            request_timeout: Duration::from_secs(30),
            max_depth: 64,
        }
    }

    /// Sets the listing page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the per-request deadline.
    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Sets the depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Walks the file store into a [`FolderIndex`].
pub struct FolderIndexBuilder<F> {
    store: Arc<F>,
    options: FolderIndexOptions,
}

impl<F: FileStore> FolderIndexBuilder<F> {
    /// Creates a builder.
    #[must_use]
    pub const fn new(store: Arc<F>, options: FolderIndexOptions) -> Self {
        Self { store, options }
    }

    /// Returns the build options.
    #[must_use]
    pub const fn options(&self) -> &FolderIndexOptions {
        &self.options
    }

    /// Builds the index of every folder below the root.
    ///
    /// Uses an explicit stack and a visited set, so a folder reachable by
    /// two paths (or a cycle back to an ancestor) is listed once.
    ///
    /// # Errors
    ///
    /// Returns the first listing failure, or an error when a folder sits
    /// deeper than the depth limit; no partial index is produced.
    #[instrument(skip(self), fields(root = %self.options.root_id))]
    pub async fn build(&self) -> Result<FolderIndex> {
        let start = Instant::now();
        let root = self.options.root_id.clone();
        let mut folders: Vec<FolderNode> = Vec::new();
        let mut visited: HashSet<String> = HashSet::from([root.clone()]);
        let mut stack: Vec<(String, usize)> = vec![(root.clone(), 0)];

        while let Some((parent, depth)) = stack.pop() {
            for child in self.list_folders(&parent).await? {
                if visited.insert(child.id.clone()) {
                    if depth + 1 > self.options.max_depth {
                        return Err(Error::operation(
                            "build_folder_index",
                            format!(
                                "folder '{}' under '{parent}' exceeds the depth limit of {}",
                                child.id, self.options.max_depth
                            ),
                        ));
                    }
                    stack.push((child.id.clone(), depth + 1));
                    folders.push(child.into_folder(&parent));
                }
            }
        }

        tracing::debug!(
            folders = folders.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Built folder index"
        );
        Ok(FolderIndex::new(root, folders))
    }

    /// Lists every sub-folder of `parent_id`, following continuation tokens.
    async fn list_folders(&self, parent_id: &str) -> Result<Vec<FileItem>> {
        let mut items = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut query = ChildQuery::new(ChildFilter::Folders, self.options.page_size);

        loop {
            let page = with_timeout(
                self.options.request_timeout,
                "list_folders",
                self.store.list_children(parent_id, &query),
            )
            .await?;
            items.extend(page.items.into_iter().filter(FileItem::is_folder));

            let Some(token) = page.next_page_token else {
                break;
            };
            if !seen_tokens.insert(token.clone()) {
                return Err(Error::operation(
                    "list_folders",
                    format!("page token '{token}' repeated while listing '{parent_id}'"),
                ));
            }
            query = query.continued(token);
        }
        Ok(items)
    }
}
