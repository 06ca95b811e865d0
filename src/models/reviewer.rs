//! Reviewer keys and dispositions.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const USER_PREFIX: &str = "user:";

/// Key of a reviewer in a candidate's disposition map.
///
/// Individual reviewers are keyed by their identity document id
/// (`user:<email>`). Two sentinels exist: [`ReviewerKey::GROUP`] for
/// submissions made on behalf of the review group and
/// [`ReviewerKey::PAPER`] for the verdicts published with the paper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewerKey(String);

impl ReviewerKey {
    /// Group sentinel key.
    pub const GROUP: &'static str = "user:group";

    /// Designated reviewer of the CSV export.
    pub const PAPER: &'static str = "user:paper";

    /// Creates a key from a raw identity document id without validation.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Parses a raw key, requiring the `user:` prefix and a non-empty name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the prefix or name is missing.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        match raw.strip_prefix(USER_PREFIX) {
            Some(name) if !name.is_empty() => Ok(Self(raw.to_string())),
            _ => Err(Error::InvalidInput(format!(
                "reviewer key must look like 'user:<name>', got '{raw}'"
            ))),
        }
    }

    /// Builds the key of an individual reviewer from their email address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the email is blank.
    pub fn for_email(email: &str) -> Result<Self> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::InvalidInput("email is required".to_string()));
        }
        Ok(Self(format!("{USER_PREFIX}{email}")))
    }

    /// Accepts either a full `user:` key or a bare email address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the input is blank or the key has
    /// no name.
    pub fn from_input(raw: &str) -> Result<Self> {
        if raw.trim_start().starts_with(USER_PREFIX) {
            Self::parse(raw)
        } else {
            Self::for_email(raw)
        }
    }

    /// The group sentinel.
    #[must_use]
    pub fn group() -> Self {
        Self(Self::GROUP.to_string())
    }

    /// The paper sentinel.
    #[must_use]
    pub fn paper() -> Self {
        Self(Self::PAPER.to_string())
    }

    /// Returns true for the group sentinel.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.0 == Self::GROUP
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReviewerKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ReviewerKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A reviewer's verdict on a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disposition {
    /// Classification code, e.g. `PC` or `EB`.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub disposition: String,
    /// Free-text comments.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub comments: String,
}

impl Disposition {
    /// Creates a disposition.
    #[must_use]
    pub fn new(disposition: impl Into<String>, comments: impl Into<String>) -> Self {
        Self {
            disposition: disposition.into(),
            comments: comments.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("user:a@example.org" ; "individual")]
    #[test_case("user:group" ; "group sentinel")]
    #[test_case("  user:paper " ; "surrounding whitespace")]
    fn test_parse_accepts(raw: &str) {
        let key = ReviewerKey::parse(raw).unwrap();
        assert_eq!(key.as_str(), raw.trim());
    }

    #[test_case("" ; "empty")]
    #[test_case("user:" ; "prefix only")]
    #[test_case("tic:100" ; "wrong prefix")]
    fn test_parse_rejects(raw: &str) {
        assert!(matches!(
            ReviewerKey::parse(raw),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sentinels() {
        assert!(ReviewerKey::group().is_group());
        assert!(!ReviewerKey::paper().is_group());
        assert_eq!(
            ReviewerKey::for_email("a@b.c").unwrap().as_str(),
            "user:a@b.c"
        );
        assert!(ReviewerKey::for_email("   ").is_err());
    }

    #[test_case("user:ada@x.org", "user:ada@x.org" ; "full key")]
    #[test_case(" ada@x.org ", "user:ada@x.org" ; "bare email")]
    fn test_from_input(raw: &str, expected: &str) {
        assert_eq!(ReviewerKey::from_input(raw).unwrap().as_str(), expected);
    }

    #[test]
    fn test_disposition_null_fields() {
        let d: Disposition =
            serde_json::from_str(r#"{"disposition":"PC","comments":null}"#).unwrap();
        assert_eq!(d, Disposition::new("PC", ""));

        let d: Disposition = serde_json::from_str(r#"{"disposition":"EB"}"#).unwrap();
        assert_eq!(d.comments, "");
    }
}
