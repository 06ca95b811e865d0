//! Cloudant (CouchDB-compatible) document store over HTTP.

use crate::storage::http::{Credentials, build_client, classify_send_error, status_error};
use crate::storage::traits::{DocumentStore, PartitionPage, PartitionQuery, PartitionRow};
use crate::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

/// Cloudant database client.
#[derive(Debug, Clone)]
pub struct CloudantStore {
    client: reqwest::Client,
    base_url: String,
    database: String,
    credentials: Credentials,
}

impl CloudantStore {
    /// Creates a client for `database` on the account at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        database: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            database: database.into(),
            credentials,
        })
    }

    /// Returns the database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    async fn read_body(operation: &str, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_send_error(operation, &e))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(operation, status, &body))
        }
    }
}

#[derive(Debug, Deserialize)]
struct AllDocsResponse {
    total_rows: usize,
    #[serde(default)]
    rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
struct AllDocsRow {
    id: String,
    #[serde(default)]
    doc: Option<Value>,
}

/// Decodes an `_all_docs` response body.
pub(crate) fn parse_all_docs(body: &str) -> Result<PartitionPage> {
    let response: AllDocsResponse =
        serde_json::from_str(body).map_err(|e| Error::operation("decode_all_docs", e))?;
    Ok(PartitionPage {
        total_rows: response.total_rows,
        rows: response
            .rows
            .into_iter()
            .map(|row| PartitionRow {
                id: row.id,
                doc: row.doc,
            })
            .collect(),
    })
}

/// Builds the query parameters of a partitioned `_all_docs` request.
///
/// `startkey` is JSON-encoded as the HTTP API requires.
pub(crate) fn all_docs_params(query: &PartitionQuery) -> Result<Vec<(&'static str, String)>> {
    let mut params = vec![("include_docs", query.include_docs.to_string())];
    if let Some(start) = &query.start_key {
        let encoded =
            serde_json::to_string(start).map_err(|e| Error::operation("encode_start_key", e))?;
        params.push(("startkey", encoded));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    Ok(params)
}

impl DocumentStore for CloudantStore {
    #[instrument(skip(self, query), fields(database = %self.database, start_key = ?query.start_key))]
    async fn partitioned_list(&self, partition: &str, query: &PartitionQuery) -> Result<PartitionPage> {
        let url = format!("{}/_partition/{partition}/_all_docs", self.database_url());
        let params = all_docs_params(query)?;
        let response = self
            .credentials
            .apply(self.client.get(&url).query(&params))
            .send()
            .await
            .map_err(|e| classify_send_error("list_partition", &e))?;
        let body = Self::read_body("list_partition", response).await?;
        parse_all_docs(&body)
    }

    #[instrument(skip(self), fields(database = %self.database))]
    async fn get(&self, id: &str) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.database_url(), encode_path_segment(id));
        let response = self
            .credentials
            .apply(self.client.get(&url))
            .send()
            .await
            .map_err(|e| classify_send_error("get_document", &e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Self::read_body("get_document", response).await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| Error::operation("decode_document", e))
    }

    #[instrument(skip(self, document), fields(database = %self.database))]
    async fn insert(&self, document: &Value) -> Result<()> {
        let response = self
            .credentials
            .apply(self.client.post(self.database_url()).json(document))
            .send()
            .await
            .map_err(|e| classify_send_error("insert_document", &e))?;
        Self::read_body("insert_document", response).await.map(|_| ())
    }
}

/// Percent-encodes a document id for use as a single path segment.
fn encode_path_segment(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b':' | b'@' => {
                encoded.push(char::from(byte));
            },
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_all_docs() {
        let body = json!({
            "total_rows": 3,
            "offset": 0,
            "rows": [
                {"id": "tic:1", "key": "tic:1", "value": {"rev": "1-a"}, "doc": {"_id": "tic:1", "sectors": "1,2"}},
                {"id": "tic:2", "key": "tic:2", "value": {"rev": "1-b"}}
            ]
        })
        .to_string();

        let page = parse_all_docs(&body).unwrap();
        assert_eq!(page.total_rows, 3);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].id, "tic:1");
        assert!(page.rows[0].doc.is_some());
        assert!(page.rows[1].doc.is_none());
    }

    #[test]
    fn test_parse_all_docs_rejects_garbage() {
        let err = parse_all_docs("{\"rows\": []}").unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_all_docs_params_encode_start_key() {
        let query = PartitionQuery::after("tic:100").with_limit(Some(50));
        let params = all_docs_params(&query).unwrap();
        assert_eq!(params[0], ("include_docs", "true".to_string()));
        assert_eq!(params[1], ("startkey", "\"tic:100\\u0000\"".to_string()));
        assert_eq!(params[2], ("limit", "50".to_string()));

        let first = all_docs_params(&PartitionQuery::first_page()).unwrap();
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("tic:100"), "tic:100");
        assert_eq!(encode_path_segment("user:a b/c"), "user:a%20b%2Fc");
        assert_eq!(encode_path_segment("user:ada@x.org"), "user:ada@x.org");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let store = CloudantStore::new(
            "https://acct.cloudantnosqldb.appdomain.cloud/",
            "planetpatrol",
            Credentials::None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            store.database_url(),
            "https://acct.cloudantnosqldb.appdomain.cloud/planetpatrol"
        );
        assert_eq!(store.database(), "planetpatrol");
    }
}
