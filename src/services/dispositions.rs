//! Pure operations over a record's disposition map.

use crate::models::{CandidateId, CandidateRecord, CandidateSnapshot, Disposition, ReviewerKey};
use crate::storage::IdentityResolver;
use crate::{Error, Result};
use serde::Serialize;

/// Records or overwrites `reviewer`'s disposition on `record`.
///
/// Last writer wins. Whether `reviewer` may be the group key is the
/// caller's concern.
///
/// Returns `true` if the stored entry changed.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `disposition` is empty or whitespace.
pub fn merge_disposition(
    record: &mut CandidateRecord,
    reviewer: &ReviewerKey,
    disposition: &str,
    comments: &str,
) -> Result<bool> {
    if disposition.trim().is_empty() {
        return Err(Error::InvalidInput("disposition is required".to_string()));
    }
    let entry = Disposition::new(disposition, comments);
    let dispositions = &mut record.document.dispositions;
    if dispositions.get(reviewer) == Some(&entry) {
        return Ok(false);
    }
    dispositions.insert(reviewer.clone(), entry);
    Ok(true)
}

/// A candidate with its number of distinct reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateTally {
    /// Candidate identifier.
    pub id: CandidateId,
    /// Number of reviewers with a disposition.
    pub length: usize,
}

/// Candidates split by whether a reviewer has answered them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerSplit {
    /// Candidates the reviewer has a disposition on.
    pub answered: Vec<CandidateTally>,
    /// Everything else.
    pub unanswered: Vec<CandidateTally>,
}

/// Splits the snapshot by whether `reviewer` has answered each candidate.
///
/// Both lists keep snapshot order and together contain every record once.
#[must_use]
pub fn split_answered_unanswered(snapshot: &CandidateSnapshot, reviewer: &ReviewerKey) -> AnswerSplit {
    let mut split = AnswerSplit::default();
    for record in snapshot {
        let tally = CandidateTally {
            id: record.id.clone(),
            length: record.reviewer_count(),
        };
        if record.disposition_for(reviewer).is_some() {
            split.answered.push(tally);
        } else {
            split.unanswered.push(tally);
        }
    }
    split
}

/// A disposition attributed to a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedDisposition {
    /// Reviewer key.
    #[serde(rename = "_id")]
    pub id: ReviewerKey,
    /// Reviewer display name.
    pub name: String,
    /// Verdict.
    pub disposition: String,
    /// Free-form comments.
    pub comments: String,
}

/// Attaches display names to a record's dispositions.
///
/// Keys whose identity cannot be resolved (missing document or lookup
/// failure) are left out. Output follows reviewer key order.
pub async fn resolve_reviewer_names<R: IdentityResolver>(
    record: &CandidateRecord,
    resolver: &R,
) -> Vec<NamedDisposition> {
    let mut named = Vec::with_capacity(record.reviewer_count());
    for (key, entry) in record.dispositions() {
        match resolver.display_name(key).await {
            Ok(Some(name)) => named.push(NamedDisposition {
                id: key.clone(),
                name,
                disposition: entry.disposition.clone(),
                comments: entry.comments.clone(),
            }),
            Ok(None) => {
                tracing::debug!(reviewer = %key, "Reviewer identity not found, omitting");
            },
            Err(e) => {
                tracing::warn!(reviewer = %key, error = %e, "Reviewer name lookup failed, omitting");
            },
        }
    }
    named
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDocumentStore;
    use crate::storage::DocumentIdentityResolver;
    use serde_json::json;
    use std::sync::Arc;

    fn record_with(entries: &[(&str, &str)]) -> CandidateRecord {
        let mut record = CandidateRecord::empty(CandidateId::new("1"));
        for (key, verdict) in entries {
            merge_disposition(&mut record, &ReviewerKey::new(*key), verdict, "").unwrap();
        }
        record
    }

    #[test]
    fn test_merge_inserts_then_overwrites() {
        let mut record = CandidateRecord::empty(CandidateId::new("1"));
        let alice = ReviewerKey::new("user:alice");

        assert!(merge_disposition(&mut record, &alice, "PC", "looks good").unwrap());
        assert!(!merge_disposition(&mut record, &alice, "PC", "looks good").unwrap());
        assert!(merge_disposition(&mut record, &alice, "EB", "secondary").unwrap());

        let entry = record.disposition_for(&alice).unwrap();
        assert_eq!(entry.disposition, "EB");
        assert_eq!(entry.comments, "secondary");
        assert_eq!(record.reviewer_count(), 1);
    }

    #[test]
    fn test_merge_rejects_blank_disposition() {
        let mut record = CandidateRecord::empty(CandidateId::new("1"));
        let err = merge_disposition(&mut record, &ReviewerKey::new("user:a"), "  ", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(record.reviewer_count(), 0);
    }

    #[test]
    fn test_split_example() {
        let a = record_with(&[("user:a", "PC"), ("user:b", "EB")]);
        let mut b = record_with(&[]);
        b.id = CandidateId::new("2");
        let mut c = record_with(&[("user:b", "FP")]);
        c.id = CandidateId::new("3");
        let snapshot = CandidateSnapshot::new(vec![a, b, c]);

        let split = split_answered_unanswered(&snapshot, &ReviewerKey::new("user:a"));
        assert_eq!(
            split.answered,
            vec![CandidateTally {
                id: CandidateId::new("1"),
                length: 2
            }]
        );
        assert_eq!(
            split.unanswered,
            vec![
                CandidateTally {
                    id: CandidateId::new("2"),
                    length: 0
                },
                CandidateTally {
                    id: CandidateId::new("3"),
                    length: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_drops_unknown_reviewers() {
        let store = Arc::new(MemoryDocumentStore::new());
        store.put(json!({"_id": "user:a", "name": "Ada"}));
        let resolver = DocumentIdentityResolver::new(store);
        let record = record_with(&[("user:a", "PC"), ("user:ghost", "EB")]);

        let named = resolve_reviewer_names(&record, &resolver).await;
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].name, "Ada");
        assert_eq!(named[0].disposition, "PC");
        assert_eq!(named[0].id.as_str(), "user:a");
    }
}
