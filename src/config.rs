//! Client configuration and settings

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default origin of the healing service
pub const DEFAULT_BASE_URL: &str = "https://healing-api.onrender.com";

/// How the client treats non-success HTTP statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Parse and return the body whatever the status code is
    #[default]
    Lenient,
    /// Reject any non-2xx response with [`ApiError::Status`]
    Strict,
}

/// Configuration for the healing service client and view session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin used for every API call and image path
    pub base_url: String,

    /// Optional per-request timeout in seconds; requests wait on the transport when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Status code handling
    pub status_policy: StatusPolicy,

    /// Discard completions that arrive after a newer request for the same slot
    pub drop_stale_responses: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            status_policy: StatusPolicy::default(),
            drop_stale_responses: true,
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at the given origin
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("intention-broadcaster").join("config.toml"))
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub async fn load_from_file(path: &Path) -> ApiResult<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ApiError::config(format!("Failed to read config: {}", e)))?;

        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| ApiError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> ApiResult<()> {
        self.validate()?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| ApiError::config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::config(format!("Failed to create config directory: {}", e)))?;
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ApiError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> ApiResult<()> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::config(format!(
                "Base URL must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ApiError::config("Request timeout must be greater than 0"));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
