//! Google Drive v3 file store over HTTP.

use crate::storage::http::{Credentials, build_client, classify_send_error, status_error};
use crate::storage::traits::{
    ChildFilter, ChildPage, ChildQuery, FOLDER_MIME_TYPE, FileItem, FileStore,
};
use crate::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

/// Default Drive API endpoint.
pub const DEFAULT_DRIVE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested for every listing.
const LIST_FIELDS: &str = "nextPageToken, files(id, webContentLink, name, mimeType)";

/// Drive client.
#[derive(Debug, Clone)]
pub struct DriveStore {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl DriveStore {
    /// Creates a client against the public Drive endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_DRIVE_URL, credentials, timeout)
    }

    /// Creates a client against a custom endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }
}

/// Escapes a value for use inside a single-quoted Drive query literal.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds the `q` parameter for a child listing.
pub(crate) fn build_query(parent_id: &str, filter: &ChildFilter) -> String {
    let parent = escape_literal(parent_id);
    match filter {
        ChildFilter::Folders => format!(
            "'{parent}' in parents and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false"
        ),
        ChildFilter::FilesNameContains(text) => format!(
            "'{parent}' in parents and name contains '{}' and mimeType != '{FOLDER_MIME_TYPE}' and trashed = false",
            escape_literal(text)
        ),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    web_content_link: Option<String>,
}

/// Decodes a `files.list` response body.
pub(crate) fn parse_file_list(body: &str) -> Result<ChildPage> {
    let response: FileListResponse =
        serde_json::from_str(body).map_err(|e| Error::operation("decode_file_list", e))?;
    Ok(ChildPage {
        items: response
            .files
            .into_iter()
            .map(|f| FileItem {
                id: f.id,
                name: f.name,
                mime_type: f.mime_type,
                content_link: f.web_content_link,
            })
            .collect(),
        next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
    })
}

impl FileStore for DriveStore {
    #[instrument(skip(self, query), fields(page_token = ?query.page_token))]
    async fn list_children(&self, parent_id: &str, query: &ChildQuery) -> Result<ChildPage> {
        let mut params = vec![
            ("q", build_query(parent_id, &query.filter)),
            ("pageSize", query.page_size.to_string()),
            ("fields", LIST_FIELDS.to_string()),
        ];
        if let Some(token) = &query.page_token {
            params.push(("pageToken", token.clone()));
        }

        let url = format!("{}/files", self.base_url);
        let response = self
            .credentials
            .apply(self.client.get(&url).query(&params))
            .send()
            .await
            .map_err(|e| classify_send_error("list_children", &e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_send_error("list_children", &e))?;
        if !status.is_success() {
            return Err(status_error("list_children", status, &body));
        }
        parse_file_list(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = DriveStore::with_base_url(
            "http://localhost:8080/drive/v3/",
            Credentials::None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(store.base_url, "http://localhost:8080/drive/v3");
        assert_eq!(
            DriveStore::new(Credentials::None, Duration::from_secs(5))
                .unwrap()
                .base_url,
            DEFAULT_DRIVE_URL
        );
    }

    #[test]
    fn test_build_folder_query() {
        assert_eq!(
            build_query("root123", &ChildFilter::Folders),
            "'root123' in parents and mimeType = 'application/vnd.google-apps.folder' and trashed = false"
        );
    }

    #[test]
    fn test_build_file_query_escapes_literals() {
        let query = build_query("p", &ChildFilter::FilesNameContains("it's\\1".to_string()));
        assert!(query.contains("name contains 'it\\'s\\\\1'"));
        assert!(query.contains("mimeType != 'application/vnd.google-apps.folder'"));
    }

    #[test]
    fn test_parse_file_list() {
        let body = json!({
            "nextPageToken": "abc",
            "files": [
                {"id": "f1", "name": "100_lc.pdf", "mimeType": "application/pdf", "webContentLink": "https://x/f1"},
                {"id": "d1", "name": "sector 1", "mimeType": FOLDER_MIME_TYPE}
            ]
        })
        .to_string();
        let page = parse_file_list(&body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].content_link.as_deref(), Some("https://x/f1"));
        assert!(page.items[1].is_folder());
    }

    #[test]
    fn test_parse_last_page() {
        let page = parse_file_list("{\"files\": []}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());

        let page = parse_file_list("{\"nextPageToken\": \"\"}").unwrap();
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_file_list("[1, 2]").is_err());
    }
}
