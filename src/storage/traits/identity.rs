//! Identity lookups and group privilege policies.

use super::DocumentStore;
use crate::Result;
use crate::models::ReviewerKey;
use crate::services::with_timeout;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for identity document reads.
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves reviewer keys to display names.
pub trait IdentityResolver: Send + Sync {
    /// Returns the display name, or `None` if the identity no longer exists.
    fn display_name(
        &self,
        reviewer: &ReviewerKey,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Resolver reading the `name` field of identity documents.
pub struct DocumentIdentityResolver<D> {
    store: Arc<D>,
    request_timeout: Duration,
}

impl<D: DocumentStore> DocumentIdentityResolver<D> {
    /// Creates a resolver over a document store.
    #[must_use]
    pub const fn new(store: Arc<D>) -> Self {
        Self {
            store,
            request_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Sets the deadline for each identity read.
    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl<D: DocumentStore> IdentityResolver for DocumentIdentityResolver<D> {
    async fn display_name(&self, reviewer: &ReviewerKey) -> Result<Option<String>> {
        let document = with_timeout(
            self.request_timeout,
            "get_identity",
            self.store.get(reviewer.as_str()),
        )
        .await?;
        Ok(document.and_then(|doc| doc.get("name")?.as_str().map(str::to_string)))
    }
}

/// Decides whether an identity may submit dispositions as the group.
pub trait GroupPolicy: Send + Sync {
    /// Returns true if `reviewer` holds group privilege.
    fn may_submit_as_group(
        &self,
        reviewer: &ReviewerKey,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Policy reading the `group` flag of the reviewer's identity document.
pub struct UserDocumentGroupPolicy<D> {
    store: Arc<D>,
    request_timeout: Duration,
}

impl<D: DocumentStore> UserDocumentGroupPolicy<D> {
    /// Creates a policy over a document store.
    #[must_use]
    pub const fn new(store: Arc<D>) -> Self {
        Self {
            store,
            request_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Sets the deadline for each identity read.
    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl<D: DocumentStore> GroupPolicy for UserDocumentGroupPolicy<D> {
    async fn may_submit_as_group(&self, reviewer: &ReviewerKey) -> Result<bool> {
        let document = with_timeout(
            self.request_timeout,
            "get_identity",
            self.store.get(reviewer.as_str()),
        )
        .await?;
        Ok(document
            .and_then(|doc| doc.get("group").and_then(serde_json::Value::as_bool))
            .unwrap_or(false))
    }
}

/// Policy backed by a fixed member list (typically from configuration).
#[derive(Debug, Clone, Default)]
pub struct StaticGroupPolicy {
    members: HashSet<ReviewerKey>,
}

impl StaticGroupPolicy {
    /// Creates a policy granting group privilege to `members`.
    #[must_use]
    pub fn new(members: impl IntoIterator<Item = ReviewerKey>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Returns true if `reviewer` is a member.
    #[must_use]
    pub fn contains(&self, reviewer: &ReviewerKey) -> bool {
        self.members.contains(reviewer)
    }
}

impl GroupPolicy for StaticGroupPolicy {
    async fn may_submit_as_group(&self, reviewer: &ReviewerKey) -> Result<bool> {
        Ok(self.contains(reviewer))
    }
}

/// Policy wrapping a synchronous predicate.
pub struct PredicateGroupPolicy<F>(pub F);

impl<F> GroupPolicy for PredicateGroupPolicy<F>
where
    F: Fn(&ReviewerKey) -> bool + Send + Sync,
{
    async fn may_submit_as_group(&self, reviewer: &ReviewerKey) -> Result<bool> {
        Ok((self.0)(reviewer))
    }
}

/// Grants group privilege if either policy does; `first` is asked first.
pub struct AnyGroupPolicy<A, B> {
    first: A,
    second: B,
}

impl<A: GroupPolicy, B: GroupPolicy> AnyGroupPolicy<A, B> {
    /// Combines two policies.
    #[must_use]
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: GroupPolicy, B: GroupPolicy> GroupPolicy for AnyGroupPolicy<A, B> {
    async fn may_submit_as_group(&self, reviewer: &ReviewerKey) -> Result<bool> {
        if self.first.may_submit_as_group(reviewer).await? {
            return Ok(true);
        }
        self.second.may_submit_as_group(reviewer).await
    }
}
