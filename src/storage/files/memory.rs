//! In-memory file store for tests and offline runs.

use crate::storage::acquire_lock;
use crate::storage::traits::{
    ChildFilter, ChildPage, ChildQuery, FOLDER_MIME_TYPE, FileItem, FileStore,
};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// File tree keyed by parent id.
///
/// Nothing stops a folder from being added under one of its descendants, so
/// cyclic trees can be modeled.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    children: Mutex<HashMap<String, Vec<FileItem>>>,
    page_size: Option<usize>,
    failing_parents: Mutex<HashSet<String>>,
    queries: AtomicUsize,
}

impl MemoryFileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps every page at `page_size` items regardless of the query.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Adds a folder under `parent_id`.
    pub fn add_folder(&self, parent_id: &str, id: &str, name: &str) {
        self.add(
            parent_id,
            FileItem {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: FOLDER_MIME_TYPE.to_string(),
                content_link: None,
            },
        );
    }

    /// Adds a non-folder file under `parent_id`.
    pub fn add_file(&self, parent_id: &str, id: &str, name: &str, mime_type: &str) {
        self.add(
            parent_id,
            FileItem {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                content_link: Some(format!("https://files.invalid/{id}?export=download")),
            },
        );
    }

    fn add(&self, parent_id: &str, item: FileItem) {
        acquire_lock(&self.children)
            .entry(parent_id.to_string())
            .or_default()
            .push(item);
    }

    /// Makes every listing of `parent_id` fail.
    pub fn fail_parent(&self, parent_id: &str) {
        acquire_lock(&self.failing_parents).insert(parent_id.to_string());
    }

    /// Returns the number of listing calls served so far.
    #[must_use]
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn list_now(&self, parent_id: &str, query: &ChildQuery) -> Result<ChildPage> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if acquire_lock(&self.failing_parents).contains(parent_id) {
            return Err(Error::transient(
                "list_children",
                format!("injected failure for '{parent_id}'"),
            ));
        }

        let offset = match &query.page_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                Error::InvalidInput(format!("unknown page token '{token}'"))
            })?,
            None => 0,
        };
        let page_size = usize::try_from(query.page_size)
            .unwrap_or(usize::MAX)
            .max(1);
        let page_size = self.page_size.map_or(page_size, |cap| page_size.min(cap));

        let children = acquire_lock(&self.children);
        let matching: Vec<&FileItem> = children
            .get(parent_id)
            .map(|items| items.iter().filter(|item| matches(item, &query.filter)).collect())
            .unwrap_or_default();

        let items: Vec<FileItem> = matching
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|item| (*item).clone())
            .collect();
        let next = offset + items.len();
        let next_page_token = (next < matching.len()).then(|| next.to_string());

        Ok(ChildPage {
            items,
            next_page_token,
        })
    }
}

fn matches(item: &FileItem, filter: &ChildFilter) -> bool {
    match filter {
        ChildFilter::Folders => item.is_folder(),
        ChildFilter::FilesNameContains(text) => !item.is_folder() && item.name.contains(text.as_str()),
    }
}

impl FileStore for MemoryFileStore {
    async fn list_children(&self, parent_id: &str, query: &ChildQuery) -> Result<ChildPage> {
        tokio::task::yield_now().await;
        self.list_now(parent_id, query)
    }
}
