//! Reviewer-facing CLI commands: pending work, submissions, candidate detail.

use super::PatrolApp;
use crate::models::{CandidateId, ReviewerKey};
use crate::services::Submission;
use crate::storage::{DocumentStore, FileStore};
use anyhow::{Context, Result};
use std::io::Write;

/// Fetches one snapshot and prints the reviewer's answered/unanswered split
/// as JSON.
pub async fn cmd_pending<D, F>(
    app: &PatrolApp<D, F>,
    reviewer: &ReviewerKey,
    out: &mut impl Write,
) -> Result<()>
where
    D: DocumentStore + 'static,
    F: FileStore + 'static,
{
    app.load_candidates()
        .await
        .context("failed to fetch candidate snapshot")?;
    let split = app.review_service().answered(reviewer);
    tracing::debug!(
        reviewer = %reviewer,
        answered = split.answered.len(),
        unanswered = split.unanswered.len(),
        "Split computed"
    );
    serde_json::to_writer_pretty(&mut *out, &split)?;
    writeln!(out)?;
    Ok(())
}

/// Records a disposition and reports whether the stored document changed.
pub async fn cmd_submit<D, F>(
    app: &PatrolApp<D, F>,
    submitter: &ReviewerKey,
    candidate: &CandidateId,
    submission: &Submission,
    out: &mut impl Write,
) -> Result<bool>
where
    D: DocumentStore + 'static,
    F: FileStore + 'static,
{
    let changed = app
        .review_service()
        .submit(submitter, candidate, submission)
        .await?;
    if changed {
        writeln!(out, "Recorded {} on {candidate}", submission.disposition)?;
    } else {
        writeln!(out, "Unchanged: {candidate} already has this disposition")?;
    }
    Ok(changed)
}

/// Prints a candidate with its named reviewers as JSON.
pub async fn cmd_show<D, F>(
    app: &PatrolApp<D, F>,
    candidate: &CandidateId,
    out: &mut impl Write,
) -> Result<()>
where
    D: DocumentStore + 'static,
    F: FileStore + 'static,
{
    let detail = app.review_service().candidate_detail(candidate).await?;
    serde_json::to_writer_pretty(&mut *out, &detail)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatrolConfig;
    use crate::storage::{MemoryDocumentStore, MemoryFileStore};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn app() -> (Arc<MemoryDocumentStore>, PatrolApp<MemoryDocumentStore, MemoryFileStore>) {
        let documents = Arc::new(MemoryDocumentStore::new());
        documents.put(json!({"_id": "tic:1", "dispositions": {"user:a": {"disposition": "PC", "comments": ""}}}));
        documents.put(json!({"_id": "tic:2"}));
        documents.put(json!({"_id": "user:a", "name": "Ada"}));
        documents.put(json!({"_id": "user:lead", "name": "Lead", "group": true}));
        let mut config = PatrolConfig::default();
        config.refresh.page_delay_ms = 0;
        let app = PatrolApp::new(config, Arc::clone(&documents), Arc::new(MemoryFileStore::new()));
        (documents, app)
    }

    #[tokio::test]
    async fn test_pending_prints_split() {
        let (_, app) = app();
        let mut out = Vec::new();
        cmd_pending(&app, &ReviewerKey::new("user:a"), &mut out)
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["answered"][0]["id"], "1");
        assert_eq!(value["unanswered"][0]["id"], "2");
    }

    #[tokio::test]
    async fn test_group_flag_on_identity_grants_privilege() {
        let (documents, app) = app();
        let mut out = Vec::new();
        let changed = cmd_submit(
            &app,
            &ReviewerKey::new("user:lead"),
            &CandidateId::new("2"),
            &Submission::new("EB", "secondary").on_behalf_of_group(),
            &mut out,
        )
        .await
        .unwrap();
        assert!(changed);
        let stored = documents.document("tic:2").unwrap();
        assert_eq!(stored["dispositions"]["user:group"]["disposition"], "EB");
    }

    #[tokio::test]
    async fn test_show_names_reviewers() {
        let (_, app) = app();
        let mut out = Vec::new();
        cmd_show(&app, &CandidateId::new("1"), &mut out).await.unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["reviewers"][0]["name"], "Ada");
        assert_eq!(value["reviewers"][0]["_id"], "user:a");
    }
}
