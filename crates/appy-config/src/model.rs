// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Appy sync layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Appy configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppyConfig {
    /// Client identity and log verbosity.
    #[serde(default)]
    pub client: ClientConfig,

    /// Backend endpoint and token lifetime settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where session tokens are persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Image cache behavior.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Staleness thresholds for cached sections.
    #[serde(default)]
    pub freshness: FreshnessConfig,
}

/// Client identity settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Name reported in logs.
    #[serde(default = "default_client_name")]
    pub name: String,

    /// Default tracing level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_client_name() -> String {
    "appy".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Backend API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Refresh the access token when it expires within this many seconds.
    #[serde(default = "default_refresh_buffer_secs")]
    pub refresh_buffer_secs: u64,

    /// Token lifetime assumed when the backend omits `expiresIn`.
    #[serde(default = "default_expires_in_secs")]
    pub default_expires_in_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            refresh_buffer_secs: default_refresh_buffer_secs(),
            default_expires_in_secs: default_expires_in_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_refresh_buffer_secs() -> u64 {
    300
}

fn default_expires_in_secs() -> u64 {
    3600
}

/// Token persistence backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite file at `token_db_path`.
    Sqlite,
    /// In-process only; tokens are lost on exit.
    Memory,
}

/// Token storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    /// Path to the SQLite token database.
    #[serde(default = "default_token_db_path")]
    pub token_db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            token_db_path: default_token_db_path(),
        }
    }
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::Sqlite
}

fn default_token_db_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("appy").join("tokens.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("appy-tokens.db"))
        .to_string_lossy()
        .into_owned()
}

/// How the image cache resolves a remote URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Return the remote URL unchanged.
    Passthrough,
    /// Download into `cache_dir` and return the local path.
    Download,
}

/// Image cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    #[serde(default = "default_image_mode")]
    pub mode: ImageMode,

    /// Directory downloaded images are written to.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// How often a waiting caller re-checks an in-flight download, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            mode: default_image_mode(),
            cache_dir: default_cache_dir(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_image_mode() -> ImageMode {
    ImageMode::Passthrough
}

fn default_cache_dir() -> String {
    dirs::cache_dir()
        .map(|p| p.join("appy").join("images"))
        .unwrap_or_else(|| std::path::PathBuf::from("appy-images"))
        .to_string_lossy()
        .into_owned()
}

fn default_poll_interval_ms() -> u64 {
    100
}

/// Freshness thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FreshnessConfig {
    /// A section older than this is refreshed on the next freshness check.
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: u64,

    /// Time in background after which returning to the foreground triggers a check.
    #[serde(default = "default_background_threshold_minutes")]
    pub background_threshold_minutes: u64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            stale_after_minutes: default_stale_after_minutes(),
            background_threshold_minutes: default_background_threshold_minutes(),
        }
    }
}

fn default_stale_after_minutes() -> u64 {
    5
}

fn default_background_threshold_minutes() -> u64 {
    5
}
