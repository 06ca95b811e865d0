//! Folder and file shapes of the evidence hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A folder in the remote file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    /// Remote identifier.
    pub id: String,
    /// Identifier of the containing folder.
    pub parent_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl FolderNode {
    /// Creates a folder node.
    #[must_use]
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            name: name.into(),
        }
    }
}

/// Every folder reachable from the evidence root.
///
/// The root itself is not a member: a complete tree of depth `D` and
/// branching factor `B` produces `(B^(D+1) - 1) / (B - 1) - 1` nodes.
#[derive(Debug, Clone, Default)]
pub struct FolderIndex {
    root_id: String,
    folders: Vec<FolderNode>,
    built_at: Option<DateTime<Utc>>,
}

impl FolderIndex {
    /// The index served before the first build completes.
    #[must_use]
    pub fn empty(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            folders: Vec::new(),
            built_at: None,
        }
    }

    /// Creates an index stamped with the current time.
    #[must_use]
    pub fn new(root_id: impl Into<String>, folders: Vec<FolderNode>) -> Self {
        Self {
            root_id: root_id.into(),
            folders,
            built_at: Some(Utc::now()),
        }
    }

    /// Root the index was built from.
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// All folders, in traversal order.
    #[must_use]
    pub fn folders(&self) -> &[FolderNode] {
        &self.folders
    }

    /// Number of folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Returns true if no folders were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// When the index was built; `None` for the startup placeholder.
    #[must_use]
    pub const fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    /// Set of folder ids, for membership checks.
    #[must_use]
    pub fn ids(&self) -> HashSet<&str> {
        self.folders.iter().map(|f| f.id.as_str()).collect()
    }
}

/// A file matched by the file locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    /// Remote identifier.
    pub id: String,
    /// File name.
    pub name: String,
    /// Direct download link, when the store exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_link: Option<String>,
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
}
