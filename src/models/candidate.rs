//! Candidate identifiers, attribute bags and records.

use super::{Disposition, ReviewerKey};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Document store partition holding candidate documents.
pub const CANDIDATE_PARTITION: &str = "tic";

/// Identifier of a TESS candidate, without the partition prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    /// Creates a candidate ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a document key such as `tic:100` into `100`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the key is not in the candidate
    /// partition or the id part is empty.
    pub fn from_document_key(key: &str) -> Result<Self> {
        match key.split_once(':') {
            Some((CANDIDATE_PARTITION, id)) if !id.is_empty() => Ok(Self(id.to_string())),
            _ => Err(Error::InvalidInput(format!(
                "'{key}' is not a '{CANDIDATE_PARTITION}:' document key"
            ))),
        }
    }

    /// Returns the document store key (`tic:<id>`).
    #[must_use]
    pub fn document_key(&self) -> String {
        format!("{CANDIDATE_PARTITION}:{}", self.0)
    }

    /// Returns true if the id is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A scalar attribute value from a candidate document.
///
/// Values are kept in their remote representation so exports reproduce
/// them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value.
    Number(serde_json::Number),
    /// Text value.
    Text(String),
    /// Arrays or objects the schema does not expect.
    Other(Value),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Other(Value::Array(items)) => {
                // Sector lists render comma-joined.
                let joined = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "{joined}")
            },
            Self::Other(other) => write!(f, "{other}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Other(Value::Null), Self::Number)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// Attribute fields every candidate document is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownField {
    /// TESS sectors the target was observed in.
    Sectors,
    /// Transit epoch (BJD).
    Epoch,
    /// Orbital period (days).
    Period,
    /// Transit duration (hours).
    Duration,
    /// Transit depth (ppm).
    Depth,
    /// Transit depth (percent).
    DepthPercent,
    /// Companion radius (Jupiter radii).
    RTranister,
    /// Stellar radius (solar radii).
    RStar,
    /// TESS magnitude.
    Tmag,
    /// Magnitude difference to the brightest neighbour.
    DeltaTmag,
}

impl KnownField {
    /// All known fields, in export column order.
    pub const ALL: [Self; 10] = [
        Self::Sectors,
        Self::Epoch,
        Self::Period,
        Self::Duration,
        Self::Depth,
        Self::DepthPercent,
        Self::RTranister,
        Self::RStar,
        Self::Tmag,
        Self::DeltaTmag,
    ];

    /// Field name as stored in the remote document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sectors => "sectors",
            Self::Epoch => "epoch",
            Self::Period => "period",
            Self::Duration => "duration",
            Self::Depth => "depth",
            Self::DepthPercent => "depthPercent",
            Self::RTranister => "rTranister",
            Self::RStar => "rStar",
            Self::Tmag => "tmag",
            Self::DeltaTmag => "deltaTmag",
        }
    }
}

/// A candidate document as stored in the document store.
///
/// The known attributes are typed; anything else is preserved in
/// [`CandidateDocument::extra`] so a read-modify-write cycle never drops
/// fields this crate does not know about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateDocument {
    /// Document key (`tic:<id>`).
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Revision token required by the store for updates.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Sectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sectors: Option<AttributeValue>,
    /// Epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<AttributeValue>,
    /// Period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<AttributeValue>,
    /// Duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<AttributeValue>,
    /// Depth in ppm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<AttributeValue>,
    /// Depth in percent.
    #[serde(
        rename = "depthPercent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub depth_percent: Option<AttributeValue>,
    /// Companion radius.
    #[serde(rename = "rTranister", default, skip_serializing_if = "Option::is_none")]
    pub r_tranister: Option<AttributeValue>,
    /// Stellar radius.
    #[serde(rename = "rStar", default, skip_serializing_if = "Option::is_none")]
    pub r_star: Option<AttributeValue>,
    /// TESS magnitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmag: Option<AttributeValue>,
    /// Delta magnitude.
    #[serde(rename = "deltaTmag", default, skip_serializing_if = "Option::is_none")]
    pub delta_tmag: Option<AttributeValue>,
    /// Reviewer verdicts.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub dispositions: BTreeMap<ReviewerKey, Disposition>,
    /// Fields outside the known schema.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CandidateDocument {
    /// Decodes a raw document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the JSON does not match the
    /// candidate schema.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::operation("decode_candidate", e))
    }

    /// Encodes the document for a write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::operation("encode_candidate", e))
    }

    /// Returns a known attribute.
    #[must_use]
    pub const fn attribute(&self, field: KnownField) -> Option<&AttributeValue> {
        match field {
            KnownField::Sectors => self.sectors.as_ref(),
            KnownField::Epoch => self.epoch.as_ref(),
            KnownField::Period => self.period.as_ref(),
            KnownField::Duration => self.duration.as_ref(),
            KnownField::Depth => self.depth.as_ref(),
            KnownField::DepthPercent => self.depth_percent.as_ref(),
            KnownField::RTranister => self.r_tranister.as_ref(),
            KnownField::RStar => self.r_star.as_ref(),
            KnownField::Tmag => self.tmag.as_ref(),
            KnownField::DeltaTmag => self.delta_tmag.as_ref(),
        }
    }

    /// Sets a known attribute.
    pub fn set_attribute(&mut self, field: KnownField, value: Option<AttributeValue>) {
        let slot = match field {
            KnownField::Sectors => &mut self.sectors,
            KnownField::Epoch => &mut self.epoch,
            KnownField::Period => &mut self.period,
            KnownField::Duration => &mut self.duration,
            KnownField::Depth => &mut self.depth,
            KnownField::DepthPercent => &mut self.depth_percent,
            KnownField::RTranister => &mut self.r_tranister,
            KnownField::RStar => &mut self.r_star,
            KnownField::Tmag => &mut self.tmag,
            KnownField::DeltaTmag => &mut self.delta_tmag,
        };
        *slot = value;
    }
}

/// A candidate with its document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Candidate identifier.
    pub id: CandidateId,
    /// The stored document, including dispositions.
    pub document: CandidateDocument,
}

impl CandidateRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(id: CandidateId, document: CandidateDocument) -> Self {
        Self { id, document }
    }

    /// Creates a record with an empty document keyed for `id`.
    #[must_use]
    pub fn empty(id: impl Into<CandidateId>) -> Self {
        let id = id.into();
        let document = CandidateDocument {
            key: Some(id.document_key()),
            ..CandidateDocument::default()
        };
        Self { id, document }
    }

    /// Builds a record from a decoded document, deriving the id from its key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the document has no candidate key.
    pub fn from_document(document: CandidateDocument) -> Result<Self> {
        let key = document
            .key
            .as_deref()
            .ok_or_else(|| Error::InvalidInput("candidate document has no _id".to_string()))?;
        let id = CandidateId::from_document_key(key)?;
        Ok(Self { id, document })
    }

    /// Returns the disposition map.
    #[must_use]
    pub const fn dispositions(&self) -> &BTreeMap<ReviewerKey, Disposition> {
        &self.document.dispositions
    }

    /// Returns a reviewer's disposition, if any.
    #[must_use]
    pub fn disposition_for(&self, reviewer: &ReviewerKey) -> Option<&Disposition> {
        self.document.dispositions.get(reviewer)
    }

    /// Number of distinct reviewers with a disposition.
    #[must_use]
    pub fn reviewer_count(&self) -> usize {
        self.document.dispositions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("tic:100", "100" ; "plain")]
    #[test_case("tic:1234(b)", "1234(b)" ; "with planet suffix")]
    #[test_case("tic:1:2", "1:2" ; "colon in id")]
    fn test_from_document_key(key: &str, expected: &str) {
        assert_eq!(CandidateId::from_document_key(key).unwrap().as_str(), expected);
    }

    #[test_case("user:a" ; "other partition")]
    #[test_case("tic:" ; "empty id")]
    #[test_case("100" ; "no prefix")]
    fn test_from_document_key_rejects(key: &str) {
        assert!(CandidateId::from_document_key(key).is_err());
    }

    #[test]
    fn test_document_key_roundtrip() {
        let id = CandidateId::new("42");
        assert_eq!(id.document_key(), "tic:42");
        assert_eq!(CandidateId::from_document_key(&id.document_key()).unwrap(), id);
    }

    #[test]
    fn test_decode_known_and_extra_fields() {
        let doc = CandidateDocument::from_value(json!({
            "_id": "tic:100",
            "_rev": "3-abc",
            "sectors": "1,2",
            "period": 3.5,
            "depthPercent": 0.12,
            "tmag": 9,
            "flagged": true,
            "notes": {"a": 1},
            "dispositions": {"user:a": {"disposition": "PC", "comments": "nice"}}
        }))
        .unwrap();

        assert_eq!(doc.rev.as_deref(), Some("3-abc"));
        assert_eq!(doc.attribute(KnownField::Sectors).unwrap().to_string(), "1,2");
        assert_eq!(doc.attribute(KnownField::Period).unwrap().to_string(), "3.5");
        assert_eq!(doc.attribute(KnownField::Tmag).unwrap().to_string(), "9");
        assert!(doc.attribute(KnownField::Epoch).is_none());
        assert_eq!(doc.extra.get("flagged"), Some(&json!(true)));
        assert!(doc.extra.contains_key("notes"));
        assert!(!doc.extra.contains_key("period"));
        assert_eq!(doc.dispositions.len(), 1);
    }

    #[test]
    fn test_null_dispositions_decode_as_empty() {
        let doc = CandidateDocument::from_value(json!({"_id": "tic:1", "dispositions": null}))
            .unwrap();
        assert!(doc.dispositions.is_empty());
    }

    #[test]
    fn test_reencode_preserves_unknown_fields() {
        let raw = json!({"_id": "tic:7", "_rev": "1-x", "custom": [1, 2], "depth": "300"});
        let doc = CandidateDocument::from_value(raw).unwrap();
        let encoded = doc.to_value().unwrap();
        assert_eq!(encoded["custom"], json!([1, 2]));
        assert_eq!(encoded["depth"], json!("300"));
        assert_eq!(encoded["_rev"], json!("1-x"));
    }

    #[test]
    fn test_array_attribute_renders_joined() {
        let value = AttributeValue::Other(json!([1, 2, "3"]));
        assert_eq!(value.to_string(), "1,2,3");
    }

    #[test]
    fn test_record_from_document() {
        let doc = CandidateDocument {
            key: Some("tic:55".to_string()),
            ..CandidateDocument::default()
        };
        let record = CandidateRecord::from_document(doc).unwrap();
        assert_eq!(record.id.as_str(), "55");
        assert_eq!(record.reviewer_count(), 0);

        assert!(CandidateRecord::from_document(CandidateDocument::default()).is_err());
    }
}
