//! Request-path facade over the shared state and the remote stores.

use super::{
    AnswerSplit, FileLocator, LocatorOptions, NamedDisposition, merge_disposition,
    resolve_reviewer_names, split_answered_unanswered, with_timeout,
};
use crate::io::{ExportMode, write_csv};
use crate::models::{
    CandidateDocument, CandidateId, CandidateRecord, CandidateSnapshot, FileReference,
    ReviewerKey,
};
use crate::state::ReviewState;
use crate::storage::{DocumentStore, FileStore, GroupPolicy, IdentityResolver};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// A disposition submitted by a reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// Verdict, e.g. `PC` or `EB`.
    pub disposition: String,
    /// Free-form comments.
    pub comments: String,
    /// Record the verdict under the group key instead of the submitter's.
    pub as_group: bool,
}

impl Submission {
    /// Creates a personal submission.
    #[must_use]
    pub fn new(disposition: impl Into<String>, comments: impl Into<String>) -> Self {
        Self {
            disposition: disposition.into(),
            comments: comments.into(),
            as_group: false,
        }
    }

    /// Marks the submission as made on behalf of the group.
    #[must_use]
    pub const fn on_behalf_of_group(mut self) -> Self {
        self.as_group = true;
        self
    }
}

/// A candidate as read from the store, with named reviewers.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateDetail {
    /// The stored record.
    pub record: CandidateRecord,
    /// Dispositions whose reviewer resolved to a name.
    pub reviewers: Vec<NamedDisposition>,
}

/// A rendered CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested download name.
    pub file_name: &'static str,
    /// CSV bytes, header included.
    pub content: Vec<u8>,
    /// Number of data rows.
    pub rows: usize,
}

/// Answers reviewer requests.
///
/// List, split, file and export calls read the shared state only. Submit
/// and detail go to the document store. A submission becomes visible in
/// the lists after the next snapshot refresh.
pub struct ReviewService<D, F, G, R> {
    documents: Arc<D>,
    state: Arc<ReviewState>,
    locator: FileLocator<F>,
    group_policy: G,
    identities: R,
    designated: ReviewerKey,
    request_timeout: Duration,
}

impl<D, F, G, R> ReviewService<D, F, G, R>
where
    D: DocumentStore,
    F: FileStore,
    G: GroupPolicy,
    R: IdentityResolver,
{
    /// Creates a service.
    #[must_use]
    pub fn new(
        documents: Arc<D>,
        files: Arc<F>,
        state: Arc<ReviewState>,
        group_policy: G,
        identities: R,
    ) -> Self {
        Self {
            documents,
            state,
            locator: FileLocator::new(files, LocatorOptions::default()),
            group_policy,
            identities,
            designated: ReviewerKey::paper(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the file lookup options.
    #[must_use]
    pub fn with_locator_options(mut self, options: LocatorOptions) -> Self {
        self.locator = self.locator.with_options(options);
        self
    }

    /// Sets the reviewer whose verdicts the CSV export carries.
    #[must_use]
    pub fn with_designated_reviewer(mut self, designated: ReviewerKey) -> Self {
        self.designated = designated;
        self
    }

    /// Sets the deadline for document store calls.
    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Returns the shared state.
    #[must_use]
    pub const fn state(&self) -> &Arc<ReviewState> {
        &self.state
    }

    async fn read_candidate(&self, candidate: &CandidateId) -> Result<CandidateRecord> {
        let key = candidate.document_key();
        let raw = with_timeout(self.request_timeout, "get_candidate", self.documents.get(&key))
            .await?
            .ok_or_else(|| Error::NotFound(key.clone()))?;
        Ok(CandidateRecord::new(
            candidate.clone(),
            CandidateDocument::from_value(raw)?,
        ))
    }

    /// Records `submitter`'s disposition on `candidate`.
    ///
    /// Returns `true` if the stored document changed (an identical
    /// resubmission is not written again).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for an empty disposition or blank id
    /// - [`Error::NotFound`] if the candidate does not exist
    /// - [`Error::Forbidden`] for a group submission without privilege
    /// - store errors from the read or the write
    #[instrument(skip(self, submission), fields(submitter = %submitter, candidate = %candidate, as_group = submission.as_group))]
    pub async fn submit(
        &self,
        submitter: &ReviewerKey,
        candidate: &CandidateId,
        submission: &Submission,
    ) -> Result<bool> {
        if submission.disposition.trim().is_empty() {
            return Err(Error::InvalidInput("disposition is required".to_string()));
        }
        if candidate.is_blank() {
            return Err(Error::InvalidInput("candidate id is required".to_string()));
        }

        let mut record = self.read_candidate(candidate).await?;

        let reviewer = if submission.as_group {
            if !self.group_policy.may_submit_as_group(submitter).await? {
                return Err(Error::Forbidden(format!(
                    "{submitter} may not submit on behalf of the group"
                )));
            }
            ReviewerKey::group()
        } else {
            submitter.clone()
        };

        let changed = merge_disposition(
            &mut record,
            &reviewer,
            &submission.disposition,
            &submission.comments,
        )?;
        if changed {
            let document = record.document.to_value()?;
            with_timeout(
                self.request_timeout,
                "insert_candidate",
                self.documents.insert(&document),
            )
            .await?;
        }

        let status = if changed { "written" } else { "unchanged" };
        metrics::counter!("disposition_submissions_total", "status" => status).increment(1);
        tracing::info!(reviewer = %reviewer, changed, "Disposition submitted");
        Ok(changed)
    }

    /// Reads a candidate from the store with reviewer names attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the candidate does not exist, or the
    /// store error.
    #[instrument(skip(self), fields(candidate = %candidate))]
    pub async fn candidate_detail(&self, candidate: &CandidateId) -> Result<CandidateDetail> {
        let record = self.read_candidate(candidate).await?;
        let reviewers = resolve_reviewer_names(&record, &self.identities).await;
        Ok(CandidateDetail { record, reviewers })
    }

    /// Splits the current snapshot by whether `reviewer` answered.
    #[must_use]
    pub fn answered(&self, reviewer: &ReviewerKey) -> AnswerSplit {
        split_answered_unanswered(&self.state.candidates.load(), reviewer)
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn candidates(&self) -> Arc<CandidateSnapshot> {
        self.state.candidates.load()
    }

    /// Looks up evidence files against the current folder index.
    pub async fn files(&self, candidate: &CandidateId) -> Vec<FileReference> {
        let index = self.state.folders.load();
        self.locator.locate(&index, candidate).await
    }

    /// Exports the current snapshot as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if rendering fails.
    pub fn export_csv(&self, mode: ExportMode) -> Result<CsvExport> {
        let snapshot = self.state.candidates.load();
        let mut content = Vec::new();
        let rows = write_csv(&mut content, &snapshot, mode, &self.designated)?;
        Ok(CsvExport {
            file_name: mode.file_name(),
            content,
            rows,
        })
    }
}
