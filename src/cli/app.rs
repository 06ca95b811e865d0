//! Wiring of stores, state and services from configuration.

use crate::config::PatrolConfig;
use crate::Result;
use crate::services::{
    CandidateSnapshotBuilder, FolderIndexBuilder, RefreshTask, RetryPolicy, ReviewService,
};
use crate::state::ReviewState;
use crate::storage::{
    AnyGroupPolicy, CloudantStore, DocumentIdentityResolver, DocumentStore, DriveStore,
    FileStore, StaticGroupPolicy, UserDocumentGroupPolicy,
};
use std::sync::Arc;

/// Group policy used by the binary: configured members, or the `group`
/// flag on the identity document.
pub type ConfiguredGroupPolicy<D> = AnyGroupPolicy<StaticGroupPolicy, UserDocumentGroupPolicy<D>>;

/// Review service over the given stores with the binary's policies.
pub type AppReviewService<D, F> =
    ReviewService<D, F, ConfiguredGroupPolicy<D>, DocumentIdentityResolver<D>>;

/// Everything a command needs: configuration, both stores and the shared
/// state.
pub struct PatrolApp<D, F> {
    config: PatrolConfig,
    documents: Arc<D>,
    files: Arc<F>,
    state: Arc<ReviewState>,
}

impl PatrolApp<CloudantStore, DriveStore> {
    /// Connects the HTTP backends described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn connect(config: PatrolConfig) -> Result<Self> {
        let timeout = config.refresh.request_timeout();
        let documents = CloudantStore::new(
            config.document_store.url.clone(),
            config.document_store.database.clone(),
            config.document_store.credentials(),
            timeout,
        )?;
        let files = DriveStore::with_base_url(
            config.file_store.base_url.clone(),
            config.file_store.credentials(),
            timeout,
        )?;
        Ok(Self::new(config, Arc::new(documents), Arc::new(files)))
    }
}

impl<D, F> PatrolApp<D, F>
where
    D: DocumentStore + 'static,
    F: FileStore + 'static,
{
    /// Creates an app over existing stores.
    #[must_use]
    pub fn new(config: PatrolConfig, documents: Arc<D>, files: Arc<F>) -> Self {
        let state = Arc::new(ReviewState::new(config.file_store.root_folder_id.clone()));
        Self {
            config,
            documents,
            files,
            state,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PatrolConfig {
        &self.config
    }

    /// Returns the shared state.
    #[must_use]
    pub const fn state(&self) -> &Arc<ReviewState> {
        &self.state
    }

    /// Builds a candidate snapshot builder.
    #[must_use]
    pub fn snapshot_builder(&self) -> CandidateSnapshotBuilder<D> {
        CandidateSnapshotBuilder::new(
            Arc::clone(&self.documents),
            self.config.refresh.snapshot_options(),
        )
    }

    /// Builds a folder index builder rooted at the configured folder.
    #[must_use]
    pub fn folder_index_builder(&self) -> FolderIndexBuilder<F> {
        FolderIndexBuilder::new(
            Arc::clone(&self.files),
            self.config
                .refresh
                .folder_index_options(&self.config.file_store.root_folder_id),
        )
    }

    /// Snapshot refresh loop publishing into the shared state.
    #[must_use]
    pub fn candidate_task(&self) -> RefreshTask<CandidateSnapshotBuilder<D>> {
        RefreshTask::new(
            self.snapshot_builder(),
            Arc::clone(&self.state.candidates),
            self.config.refresh.candidates_interval(),
        )
        .with_retry(self.config.refresh.snapshot_retry())
    }

    /// Folder index refresh loop; a failed build waits for the next tick.
    #[must_use]
    pub fn folder_task(&self) -> RefreshTask<FolderIndexBuilder<F>> {
        RefreshTask::new(
            self.folder_index_builder(),
            Arc::clone(&self.state.folders),
            self.config.refresh.folders_interval(),
        )
        .with_retry(RetryPolicy::single_attempt())
    }

    /// Builds the review service over the shared state.
    #[must_use]
    pub fn review_service(&self) -> AppReviewService<D, F> {
        let timeout = self.config.refresh.request_timeout();
        let policy = AnyGroupPolicy::new(
            StaticGroupPolicy::new(self.config.group_members.iter().cloned()),
            UserDocumentGroupPolicy::new(Arc::clone(&self.documents)).with_request_timeout(timeout),
        );
        ReviewService::new(
            Arc::clone(&self.documents),
            Arc::clone(&self.files),
            Arc::clone(&self.state),
            policy,
            DocumentIdentityResolver::new(Arc::clone(&self.documents))
                .with_request_timeout(timeout),
        )
        .with_locator_options(self.config.refresh.locator_options())
        .with_designated_reviewer(self.config.export.designated_reviewer.clone())
        .with_request_timeout(self.config.refresh.request_timeout())
    }

    /// Fetches one snapshot and publishes it.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn load_candidates(&self) -> Result<usize> {
        self.candidate_task().refresh_once().await
    }

    /// Builds the folder index once and publishes it.
    ///
    /// # Errors
    ///
    /// Returns the traversal error.
    pub async fn load_folders(&self) -> Result<usize> {
        self.folder_task().refresh_once().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_builds_http_backends() {
        let mut config = PatrolConfig::default();
        config.file_store.root_folder_id = "evidence-root".to_string();

        let app = PatrolApp::connect(config).unwrap();

        assert_eq!(app.config().file_store.root_folder_id, "evidence-root");
        assert_eq!(app.state().folders.load().root_id(), "evidence-root");
    }
}
