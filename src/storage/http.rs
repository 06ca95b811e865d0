//! Shared HTTP plumbing for the remote backends.

use crate::Error;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Credentials attached to every request of a backend.
#[derive(Clone, Default)]
pub enum Credentials {
    /// No authentication.
    #[default]
    None,
    /// HTTP basic authentication (Cloudant legacy credentials).
    Basic {
        /// Account or API key.
        username: String,
        /// Password or API secret.
        password: SecretString,
    },
    /// Bearer token (IAM or OAuth access token).
    Bearer(SecretString),
}

impl Credentials {
    /// Applies the credentials to a request.
    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => request,
            Self::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose_secret()))
            },
            Self::Bearer(token) => request.bearer_auth(token.expose_secret()),
        }
    }

    /// Returns true when no credentials are configured.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Bearer(_) => f.write_str("Bearer([REDACTED])"),
        }
    }
}

/// Builds the shared async client.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the TLS backend cannot be
/// initialised.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .user_agent(format!("planet-patrol/{}", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| Error::operation("build_http_client", e))
}

/// Maps a transport failure to an error.
///
/// Timeouts and connection failures are transient; anything else (bad URL,
/// body encoding) is not worth retrying.
pub(crate) fn classify_send_error(operation: &str, err: &reqwest::Error) -> Error {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        Error::transient(operation, err)
    } else {
        Error::operation(operation, err)
    }
}

/// Maps a non-success status to an error.
pub(crate) fn status_error(operation: &str, status: StatusCode, body: &str) -> Error {
    let cause = if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {}", truncate(body, 200))
    };
    if is_retryable_status(status) {
        Error::transient(operation, cause)
    } else {
        Error::operation(operation, cause)
    }
}

/// Returns true for statuses worth retrying.
#[must_use]
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}
