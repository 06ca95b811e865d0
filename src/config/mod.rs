//! Configuration management.
//!
//! Settings come from a TOML file (explicit path, or `planet-patrol/config.toml`
//! under the platform config dir), then `PLANET_PATROL_*` environment
//! variables override individual values.

use crate::models::ReviewerKey;
use crate::services::{
    FolderIndexOptions, LocatorOptions, RetryPolicy, SnapshotOptions,
};
use crate::storage::Credentials;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "PLANET_PATROL_";

/// Database holding candidate and user documents.
pub const DEFAULT_DATABASE: &str = "planet-patrol-db";

/// Drive folder the evidence hierarchy hangs off.
pub const DEFAULT_ROOT_FOLDER: &str = "1Z74BU-ijJy710QA3M9YwE_l1cE_dpSHA";

/// Main configuration.
#[derive(Debug, Clone, Default)]
pub struct PatrolConfig {
    /// Document store connection.
    pub document_store: DocumentStoreSettings,
    /// File store connection.
    pub file_store: FileStoreSettings,
    /// Refresh schedule and paging.
    pub refresh: RefreshSettings,
    /// CSV export.
    pub export: ExportSettings,
    /// Logging output.
    pub logging: LoggingSettings,
    /// Prometheus exporter.
    pub metrics: MetricsSettings,
    /// Reviewers allowed to submit on behalf of the group, in addition to
    /// those whose identity document carries the `group` flag.
    pub group_members: Vec<ReviewerKey>,
}

/// Document store connection settings.
#[derive(Debug, Clone)]
pub struct DocumentStoreSettings {
    /// Account URL.
    pub url: String,
    /// Database name.
    pub database: String,
    /// Basic-auth user name.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<SecretString>,
    /// Bearer token; takes precedence over basic auth.
    pub api_token: Option<SecretString>,
}

impl Default for DocumentStoreSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:5984".to_string(),
            database: DEFAULT_DATABASE.to_string(),
            username: None,
            password: None,
            api_token: None,
        }
    }
}

impl DocumentStoreSettings {
    /// Credentials to attach to requests.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        if let Some(token) = &self.api_token {
            return Credentials::Bearer(token.clone());
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Credentials::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            _ => Credentials::None,
        }
    }
}

/// File store connection settings.
#[derive(Debug, Clone)]
pub struct FileStoreSettings {
    /// API base URL.
    pub base_url: String,
    /// Root of the evidence hierarchy.
    pub root_folder_id: String,
    /// OAuth access token.
    pub access_token: Option<SecretString>,
}

impl Default for FileStoreSettings {
    fn default() -> Self {
        Self {
            base_url: crate::storage::files::DEFAULT_DRIVE_URL.to_string(),
            root_folder_id: DEFAULT_ROOT_FOLDER.to_string(),
            access_token: None,
        }
    }
}

impl FileStoreSettings {
    /// Credentials to attach to requests.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.access_token
            .clone()
            .map_or(Credentials::None, Credentials::Bearer)
    }
}

/// Refresh schedule and paging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Seconds between candidate snapshot refreshes.
    pub candidates_interval_secs: u64,
    /// Seconds between folder index rebuilds.
    pub folders_interval_secs: u64,
    /// Seconds between a failed snapshot attempt and its retry.
    pub retry_backoff_secs: u64,
    /// Snapshot attempts per cycle; `None` retries until success.
    pub max_attempts: Option<u32>,
    /// Give up the cycle on failures that are not transient.
    pub retry_transient_only: bool,
    /// Milliseconds between snapshot page requests.
    pub page_delay_ms: u64,
    /// Rows per snapshot page; `None` lets the store decide.
    pub page_limit: Option<usize>,
    /// Deadline for each remote request, in seconds.
    pub request_timeout_secs: u64,
    /// Items per file store listing page.
    pub folder_page_size: u32,
    /// Deepest folder level allowed; a deeper tree fails the index build.
    pub max_folder_depth: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            candidates_interval_secs: 5 * 60,
            folders_interval_secs: 60 * 60,
            retry_backoff_secs: 5,
            max_attempts: None,
            retry_transient_only: false,
            page_delay_ms: 1000,
            page_limit: None,
            request_timeout_secs: 30,
            folder_page_size: 1000,
            max_folder_depth: 64,
        }
    }
}

impl RefreshSettings {
    /// Snapshot refresh interval.
    #[must_use]
    pub const fn candidates_interval(&self) -> Duration {
        Duration::from_secs(self.candidates_interval_secs)
    }

    /// Folder index refresh interval.
    #[must_use]
    pub const fn folders_interval(&self) -> Duration {
        Duration::from_secs(self.folders_interval_secs)
    }

    /// Per-request deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Retry policy of the snapshot loop.
    #[must_use]
    pub const fn snapshot_retry(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::unlimited(Duration::from_secs(self.retry_backoff_secs));
        if let Some(max) = self.max_attempts {
            policy = policy.with_max_attempts(max);
        }
        if self.retry_transient_only {
            policy = policy.transient_only();
        }
        policy
    }

    /// Snapshot builder options.
    #[must_use]
    pub fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions::default()
            .with_page_delay(Duration::from_millis(self.page_delay_ms))
            .with_request_timeout(self.request_timeout())
            .with_page_limit(self.page_limit)
    }

    /// Folder index builder options.
    #[must_use]
    pub fn folder_index_options(&self, root_id: &str) -> FolderIndexOptions {
        FolderIndexOptions::new(root_id)
            .with_page_size(self.folder_page_size)
            .with_request_timeout(self.request_timeout())
            .with_max_depth(self.max_folder_depth)
    }

    /// File locator options.
    #[must_use]
    pub const fn locator_options(&self) -> LocatorOptions {
        LocatorOptions {
            page_size: self.folder_page_size,
            request_timeout: self.request_timeout(),
        }
    }
}

/// CSV export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// Reviewer whose verdicts fill the disposition columns.
    pub designated_reviewer: ReviewerKey,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            designated_reviewer: ReviewerKey::paper(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name; unknown names fall back to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `planet_patrol=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

/// Prometheus exporter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSettings {
    /// Whether to install the exporter.
    pub enabled: bool,
    /// Listen port of the scrape endpoint.
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Document store section.
    pub document_store: Option<ConfigFileDocumentStore>,
    /// File store section.
    pub file_store: Option<ConfigFileFileStore>,
    /// Refresh section.
    pub refresh: Option<ConfigFileRefresh>,
    /// Export section.
    pub export: Option<ConfigFileExport>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Metrics section.
    pub metrics: Option<ConfigFileMetrics>,
    /// Group members.
    pub group_members: Option<Vec<String>>,
}

/// Document store section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileDocumentStore {
    /// Account URL.
    pub url: Option<String>,
    /// Database.
    pub database: Option<String>,
    /// User name.
    pub username: Option<String>,
    /// Password.
    pub password: Option<SecretString>,
    /// Bearer token.
    pub api_token: Option<SecretString>,
}

/// File store section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileFileStore {
    /// API base URL.
    pub base_url: Option<String>,
    /// Root folder id.
    pub root_folder_id: Option<String>,
    /// Access token.
    pub access_token: Option<SecretString>,
}

/// Refresh section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileRefresh {
    /// Snapshot interval.
    pub candidates_interval_secs: Option<u64>,
    /// Folder index interval.
    pub folders_interval_secs: Option<u64>,
    /// Retry backoff.
    pub retry_backoff_secs: Option<u64>,
    /// Attempt cap.
    pub max_attempts: Option<u32>,
    /// Retry transient failures only.
    pub retry_transient_only: Option<bool>,
    /// Inter-page delay.
    pub page_delay_ms: Option<u64>,
    /// Page size.
    pub page_limit: Option<usize>,
    /// Request deadline.
    pub request_timeout_secs: Option<u64>,
    /// Folder listing page size.
    pub folder_page_size: Option<u32>,
    /// Folder depth limit.
    pub max_folder_depth: Option<usize>,
}

/// Export section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileExport {
    /// Designated reviewer key.
    pub designated_reviewer: Option<String>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Filter directive.
    pub level: Option<String>,
    /// Format name.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

/// Metrics section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileMetrics {
    /// Enable the exporter.
    pub enabled: Option<bool>,
    /// Listen port.
    pub port: Option<u16>,
}

impl PatrolConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is invalid.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| Error::operation("parse_config_file", e))?;
        Self::from_config_file(file)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::operation("read_config_file", format!("{}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Returns the default config file location, if a home directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "planet-patrol")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// Returns default configuration if no config file exists there.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but is invalid.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads from `path` (or the default location), then applies
    /// environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default()?,
        };
        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Converts a `ConfigFile` to `PatrolConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(store) = file.document_store {
            let target = &mut config.document_store;
            if let Some(url) = store.url {
                target.url = url;
            }
            if let Some(database) = store.database {
                target.database = database;
            }
            target.username = store.username;
            target.password = store.password;
            target.api_token = store.api_token;
        }
        if let Some(files) = file.file_store {
            let target = &mut config.file_store;
            if let Some(base_url) = files.base_url {
                target.base_url = base_url;
            }
            if let Some(root) = files.root_folder_id {
                target.root_folder_id = root;
            }
            target.access_token = files.access_token;
        }
        if let Some(refresh) = file.refresh {
            let target = &mut config.refresh;
            if let Some(v) = refresh.candidates_interval_secs {
                target.candidates_interval_secs = v;
            }
            if let Some(v) = refresh.folders_interval_secs {
                target.folders_interval_secs = v;
            }
            if let Some(v) = refresh.retry_backoff_secs {
                target.retry_backoff_secs = v;
            }
            if let Some(v) = refresh.page_delay_ms {
                target.page_delay_ms = v;
            }
            if let Some(v) = refresh.request_timeout_secs {
                target.request_timeout_secs = v;
            }
            if let Some(v) = refresh.folder_page_size {
                target.folder_page_size = v;
            }
            if let Some(v) = refresh.max_folder_depth {
                target.max_folder_depth = v;
            }
            if let Some(v) = refresh.retry_transient_only {
                target.retry_transient_only = v;
            }
            target.max_attempts = refresh.max_attempts;
            target.page_limit = refresh.page_limit;
        }
        if let Some(export) = file.export {
            if let Some(key) = export.designated_reviewer {
                config.export.designated_reviewer = ReviewerKey::parse(&key)?;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.file = logging.file.map(PathBuf::from);
        }
        if let Some(metrics) = file.metrics {
            if let Some(enabled) = metrics.enabled {
                config.metrics.enabled = enabled;
            }
            if let Some(port) = metrics.port {
                config.metrics.port = port;
            }
        }
        if let Some(members) = file.group_members {
            config.group_members = parse_members(members.iter().map(String::as_str))?;
        }

        Ok(config)
    }

    /// Applies `PLANET_PATROL_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a numeric or key override does
    /// not parse.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides read through `lookup`, which receives the full
    /// variable name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a numeric or key override does
    /// not parse.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |suffix: &str| {
            lookup(&format!("{ENV_PREFIX}{suffix}")).filter(|v| !v.trim().is_empty())
        };

        if let Some(v) = var("CLOUDANT_URL") {
            self.document_store.url = v;
        }
        if let Some(v) = var("CLOUDANT_DATABASE") {
            self.document_store.database = v;
        }
        if let Some(v) = var("CLOUDANT_USERNAME") {
            self.document_store.username = Some(v);
        }
        if let Some(v) = var("CLOUDANT_PASSWORD") {
            self.document_store.password = Some(SecretString::from(v));
        }
        if let Some(v) = var("CLOUDANT_API_TOKEN") {
            self.document_store.api_token = Some(SecretString::from(v));
        }
        if let Some(v) = var("DRIVE_URL") {
            self.file_store.base_url = v;
        }
        if let Some(v) = var("DRIVE_ROOT_FOLDER") {
            self.file_store.root_folder_id = v;
        }
        if let Some(v) = var("DRIVE_ACCESS_TOKEN") {
            self.file_store.access_token = Some(SecretString::from(v));
        }
        if let Some(v) = var("CANDIDATES_INTERVAL_SECS") {
            self.refresh.candidates_interval_secs = parse_number("CANDIDATES_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = var("FOLDERS_INTERVAL_SECS") {
            self.refresh.folders_interval_secs = parse_number("FOLDERS_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = var("RETRY_BACKOFF_SECS") {
            self.refresh.retry_backoff_secs = parse_number("RETRY_BACKOFF_SECS", &v)?;
        }
        if let Some(v) = var("REQUEST_TIMEOUT_SECS") {
            self.refresh.request_timeout_secs = parse_number("REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("DESIGNATED_REVIEWER") {
            self.export.designated_reviewer = ReviewerKey::parse(&v)?;
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = var("LOG_FORMAT") {
            self.logging.format = LogFormat::parse(&v);
        }
        if let Some(v) = var("LOG_FILE") {
            self.logging.file = Some(PathBuf::from(v));
        }
        if let Some(v) = var("METRICS_ENABLED") {
            let v = v.to_lowercase();
            self.metrics.enabled = v == "true" || v == "1" || v == "yes";
        }
        if let Some(v) = var("METRICS_PORT") {
            self.metrics.port = parse_number("METRICS_PORT", &v)?;
        }
        if let Some(v) = var("GROUP_MEMBERS") {
            self.group_members = parse_members(v.split(',').map(str::trim).filter(|m| !m.is_empty()))?;
        }

        Ok(self)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        let refresh = &self.refresh;
        let positive = [
            ("refresh.candidates_interval_secs", refresh.candidates_interval_secs),
            ("refresh.folders_interval_secs", refresh.folders_interval_secs),
            ("refresh.request_timeout_secs", refresh.request_timeout_secs),
            ("refresh.folder_page_size", u64::from(refresh.folder_page_size)),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(Error::InvalidInput(format!("{name} must be greater than zero")));
        }
        if refresh.page_limit == Some(0) {
            return Err(Error::InvalidInput(
                "refresh.page_limit must be greater than zero".to_string(),
            ));
        }
        if self.file_store.root_folder_id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "file_store.root_folder_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::InvalidInput(format!("{ENV_PREFIX}{name}: '{value}' is not a valid number"))
    })
}

fn parse_members<'a>(members: impl Iterator<Item = &'a str>) -> Result<Vec<ReviewerKey>> {
    members.map(ReviewerKey::from_input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = PatrolConfig::default();
        assert_eq!(config.refresh.candidates_interval(), Duration::from_secs(300));
        assert_eq!(config.refresh.folders_interval(), Duration::from_secs(3600));
        assert_eq!(config.refresh.snapshot_retry(), RetryPolicy::default());
        assert_eq!(config.document_store.database, DEFAULT_DATABASE);
        assert_eq!(config.export.designated_reviewer, ReviewerKey::paper());
        assert!(config.document_store.credentials().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let config = PatrolConfig::from_toml(
            r#"
            group_members = ["lead@lab.org", "user:other@lab.org"]

            [document_store]
            url = "https://acct.cloudant.com"
            username = "acct"
            password = "pw"

            [file_store]
            root_folder_id = "abc"

            [refresh]
            candidates_interval_secs = 60
            max_attempts = 3
            retry_transient_only = true
            page_limit = 200

            [export]
            designated_reviewer = "user:paper2"

            [logging]
            level = "planet_patrol=debug"
            format = "json"

            [metrics]
            enabled = true
            port = 9100
            "#,
        )
        .unwrap();

        assert_eq!(config.document_store.url, "https://acct.cloudant.com");
        assert!(matches!(
            config.document_store.credentials(),
            Credentials::Basic { ref username, .. } if username == "acct"
        ));
        assert_eq!(config.file_store.root_folder_id, "abc");
        assert_eq!(config.refresh.candidates_interval_secs, 60);
        assert_eq!(config.refresh.snapshot_retry().max_attempts, Some(3));
        assert!(config.refresh.snapshot_retry().transient_only);
        assert_eq!(config.refresh.snapshot_options().page_limit, Some(200));
        assert_eq!(config.export.designated_reviewer.as_str(), "user:paper2");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.metrics.enabled);
        assert_eq!(
            config.group_members,
            vec![
                ReviewerKey::new("user:lead@lab.org"),
                ReviewerKey::new("user:other@lab.org")
            ]
        );
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = PatrolConfig::from_toml("[cache]\nsize = 1").unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PLANET_PATROL_CLOUDANT_API_TOKEN", "tok"),
            ("PLANET_PATROL_DRIVE_ROOT_FOLDER", "xyz"),
            ("PLANET_PATROL_CANDIDATES_INTERVAL_SECS", "42"),
            ("PLANET_PATROL_LOG_FORMAT", "json"),
            ("PLANET_PATROL_GROUP_MEMBERS", "a@x.org, b@x.org"),
            ("PLANET_PATROL_LOG_LEVEL", "   "),
        ]);
        let config = PatrolConfig::default()
            .with_overrides_from(|name| vars.get(name).map(ToString::to_string))
            .unwrap();

        match config.document_store.credentials() {
            Credentials::Bearer(token) => assert_eq!(token.expose_secret(), "tok"),
            other => panic!("unexpected credentials {other:?}"),
        }
        assert_eq!(config.file_store.root_folder_id, "xyz");
        assert_eq!(config.refresh.candidates_interval_secs, 42);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.group_members.len(), 2);
    }

    #[test]
    fn test_bad_env_number() {
        let err = PatrolConfig::default()
            .with_overrides_from(|name| {
                (name == "PLANET_PATROL_METRICS_PORT").then(|| "lots".to_string())
            })
            .unwrap_err();
        assert!(err.to_string().contains("METRICS_PORT"));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = PatrolConfig::default();
        config.refresh.folders_interval_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("folders_interval_secs"));
    }
}
