//! Remote store traits.
//!
//! The engine never talks to a concrete backend; builders and services are
//! generic over these traits so tests can run against the in-memory
//! backends.

mod document;
mod files;
mod identity;

pub use document::{DocumentStore, PartitionPage, PartitionQuery, PartitionRow};
pub use files::{ChildFilter, ChildPage, ChildQuery, FOLDER_MIME_TYPE, FileItem, FileStore};
pub use identity::{
    AnyGroupPolicy, DocumentIdentityResolver, GroupPolicy, IdentityResolver, PredicateGroupPolicy,
    StaticGroupPolicy, UserDocumentGroupPolicy,
};
