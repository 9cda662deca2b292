//! Configuration module for catsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, environment overrides, validation, defaults, and a builder
//! pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for catsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sheet: SheetConfig,
    pub commerce: CommerceConfig,
    pub storage: StorageConfig,
    pub images: ImagesConfig,
    pub logging: LoggingConfig,
}

/// Spreadsheet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Spreadsheet identifier (the long id in the sheet URL).
    pub spreadsheet_id: String,
    /// Name of the tab holding the product rows.
    pub tab: String,
    /// Last row of the fixed read range (`A1:Y{last_row}`).
    pub last_row: u32,
    /// Path to the service-account JSON key file.
    pub credentials_file: PathBuf,
    /// Per-request timeout for the Sheets API and token endpoint, in seconds.
    pub request_timeout_secs: u64,
}

/// Commerce backend admin API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommerceConfig {
    /// Base URL of the backend, e.g. `https://shop.example.com`.
    pub base_url: String,
    /// Secret admin API key.
    pub api_key: String,
    /// Currency of the sheet's price column.
    pub currency_code: String,
    /// Per-request timeout for the admin API, in seconds.
    pub request_timeout_secs: u64,
}

/// S3-compatible object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Public base URL under which stored keys are served.
    pub public_url: String,
    /// Run the legacy timestamped-key sweep after every sync.
    pub cleanup_legacy_after_sync: bool,
}

/// Image download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Per-download timeout in seconds.
    pub download_timeout_secs: u64,
    /// Bodies smaller than this are treated as failed downloads.
    pub min_body_bytes: usize,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    ///
    /// A missing file is expected; a file that exists but cannot be read or
    /// parsed is logged before falling back.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    warn!(
                        path = %path.display(),
                        error = %format!("{e:#}"),
                        "Ignoring unreadable configuration file, using defaults"
                    );
                }
                Self::default()
            }
        }
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/catsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("catsync")
            .join("config.yaml")
    }

    /// Overlay `CATSYNC_*` environment variables onto this configuration.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values returned by `lookup` (keyed by environment variable name).
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a value from the file.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CATSYNC_SHEET_ID") {
            self.sheet.spreadsheet_id = v;
        }
        if let Some(v) = get("CATSYNC_SHEET_TAB") {
            self.sheet.tab = v;
        }
        if let Some(v) = get("CATSYNC_GOOGLE_CREDENTIALS") {
            self.sheet.credentials_file = PathBuf::from(v);
        }
        if let Some(v) = get("CATSYNC_COMMERCE_URL") {
            self.commerce.base_url = v;
        }
        if let Some(v) = get("CATSYNC_COMMERCE_API_KEY") {
            self.commerce.api_key = v;
        }
        if let Some(v) = get("CATSYNC_S3_ENDPOINT") {
            self.storage.endpoint = v;
        }
        if let Some(v) = get("CATSYNC_S3_REGION") {
            self.storage.region = v;
        }
        if let Some(v) = get("CATSYNC_S3_BUCKET") {
            self.storage.bucket = v;
        }
        if let Some(v) = get("CATSYNC_S3_ACCESS_KEY_ID") {
            self.storage.access_key_id = v;
        }
        if let Some(v) = get("CATSYNC_S3_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = v;
        }
        if let Some(v) = get("CATSYNC_S3_PUBLIC_URL") {
            self.storage.public_url = v;
        }
        if let Some(v) = get("CATSYNC_LOG_LEVEL") {
            self.logging.level = v.to_lowercase();
        }
        self
    }

    /// The fixed rectangular range read by the sheet reader.
    pub fn sheet_range(&self) -> String {
        format!(
            "{}!A1:Y{}",
            crate::ports::sheet_source::quote_tab(&self.sheet.tab),
            self.sheet.last_row
        )
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            tab: "Products".to_string(),
            last_row: 1000,
            credentials_file: dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("~/.config"))
                .join("catsync")
                .join("service-account.json"),
            request_timeout_secs: 30,
        }
    }
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            currency_code: "eur".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: "auto".to_string(),
            bucket: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_url: String::new(),
            cleanup_legacy_after_sync: false,
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: 30,
            min_body_bytes: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sheet.spreadsheet_id"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn require(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError {
            field: field.into(),
            message: "must be set".into(),
        });
    }
}

fn require_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        require(errors, field, value);
    } else if url::Url::parse(value).is_err() {
        errors.push(ValidationError {
            field: field.into(),
            message: format!("not a valid URL: {value}"),
        });
    }
}

fn require_positive(errors: &mut Vec<ValidationError>, field: &str, value: u64) {
    if value == 0 {
        errors.push(ValidationError {
            field: field.into(),
            message: "must be greater than 0".into(),
        });
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sheet ---
        require(&mut errors, "sheet.spreadsheet_id", &self.sheet.spreadsheet_id);
        require(&mut errors, "sheet.tab", &self.sheet.tab);
        if self.sheet.last_row < 2 {
            errors.push(ValidationError {
                field: "sheet.last_row".into(),
                message: "must be at least 2 (header row plus one data row)".into(),
            });
        }
        require_positive(
            &mut errors,
            "sheet.request_timeout_secs",
            self.sheet.request_timeout_secs,
        );

        // --- commerce ---
        require_url(&mut errors, "commerce.base_url", &self.commerce.base_url);
        require(&mut errors, "commerce.api_key", &self.commerce.api_key);
        require(&mut errors, "commerce.currency_code", &self.commerce.currency_code);
        require_positive(
            &mut errors,
            "commerce.request_timeout_secs",
            self.commerce.request_timeout_secs,
        );

        // --- storage ---
        require_url(&mut errors, "storage.endpoint", &self.storage.endpoint);
        require(&mut errors, "storage.bucket", &self.storage.bucket);
        require(&mut errors, "storage.access_key_id", &self.storage.access_key_id);
        require(
            &mut errors,
            "storage.secret_access_key",
            &self.storage.secret_access_key,
        );
        require_url(&mut errors, "storage.public_url", &self.storage.public_url);

        // --- images ---
        require_positive(
            &mut errors,
            "images.download_timeout_secs",
            self.images.download_timeout_secs,
        );

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use catsync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .sheet_spreadsheet_id("1AbC")
///     .sheet_tab("Products")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sheet ---

    pub fn sheet_spreadsheet_id(mut self, id: impl Into<String>) -> Self {
        self.config.sheet.spreadsheet_id = id.into();
        self
    }

    pub fn sheet_tab(mut self, tab: impl Into<String>) -> Self {
        self.config.sheet.tab = tab.into();
        self
    }

    pub fn sheet_last_row(mut self, row: u32) -> Self {
        self.config.sheet.last_row = row;
        self
    }

    pub fn sheet_credentials_file(mut self, path: PathBuf) -> Self {
        self.config.sheet.credentials_file = path;
        self
    }

    pub fn sheet_request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.sheet.request_timeout_secs = secs;
        self
    }

    // --- commerce ---

    pub fn commerce_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.commerce.base_url = url.into();
        self
    }

    pub fn commerce_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.commerce.api_key = key.into();
        self
    }

    pub fn commerce_currency_code(mut self, code: impl Into<String>) -> Self {
        self.config.commerce.currency_code = code.into().to_lowercase();
        self
    }

    pub fn commerce_request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.commerce.request_timeout_secs = secs;
        self
    }

    // --- storage ---

    pub fn storage_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.storage.endpoint = endpoint.into();
        self
    }

    pub fn storage_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.storage.bucket = bucket.into();
        self
    }

    pub fn storage_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.config.storage.access_key_id = access_key_id.into();
        self.config.storage.secret_access_key = secret_access_key.into();
        self
    }

    pub fn storage_public_url(mut self, url: impl Into<String>) -> Self {
        self.config.storage.public_url = url.into();
        self
    }

    pub fn storage_cleanup_legacy_after_sync(mut self, enabled: bool) -> Self {
        self.config.storage.cleanup_legacy_after_sync = enabled;
        self
    }

    // --- images ---

    pub fn images_download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.images.download_timeout_secs = secs;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Consume the builder and return the constructed [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
