//! Hierarchical file store trait.

use crate::Result;
use crate::models::{FileReference, FolderNode};
use std::future::Future;

/// MIME type the file store uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Which children a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildFilter {
    /// Sub-folders only.
    Folders,
    /// Non-folder files whose name contains the given text.
    FilesNameContains(String),
}

/// Options for a child listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildQuery {
    /// Filter.
    pub filter: ChildFilter,
    /// Maximum items per page.
    pub page_size: u32,
    /// Continuation token from the previous page.
    pub page_token: Option<String>,
}

impl ChildQuery {
    /// First page of a listing.
    #[must_use]
    pub const fn new(filter: ChildFilter, page_size: u32) -> Self {
        Self {
            filter,
            page_size,
            page_token: None,
        }
    }

    /// Same query, continued at `token`.
    #[must_use]
    pub fn continued(&self, token: String) -> Self {
        Self {
            filter: self.filter.clone(),
            page_size: self.page_size,
            page_token: Some(token),
        }
    }
}

/// A file or folder returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    /// Remote identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Direct download link.
    pub content_link: Option<String>,
}

impl FileItem {
    /// Returns true if the item is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Converts into a folder node under `parent_id`.
    #[must_use]
    pub fn into_folder(self, parent_id: &str) -> FolderNode {
        FolderNode {
            id: self.id,
            parent_id: parent_id.to_string(),
            name: self.name,
        }
    }

    /// Converts into a file reference.
    #[must_use]
    pub fn into_reference(self) -> FileReference {
        FileReference {
            id: self.id,
            name: self.name,
            content_link: self.content_link,
            mime_type: self.mime_type,
        }
    }
}

/// A page of a child listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildPage {
    /// Items on this page.
    pub items: Vec<FileItem>,
    /// Token for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// A remote tree of folders and files queried by parent id.
pub trait FileStore: Send + Sync {
    /// Lists direct children of `parent_id` matching the query.
    fn list_children(
        &self,
        parent_id: &str,
        query: &ChildQuery,
    ) -> impl Future<Output = Result<ChildPage>> + Send;
}
