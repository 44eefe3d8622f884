mod env_manager;

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use url::Url;
use crate::error::{Result, ScribeError};

pub use env_manager::{get_env_value, EnvOverrides};

/// Largest file, in bytes, whose content is transcribed
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;
/// Retry budget for a single logical fetch
pub const MAX_RETRIES: u32 = 3;
/// Upstream API origin used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Main configuration struct for the application
///
/// Holds the endpoint layout, traversal limits and HTTP behaviour used by
/// every transcription. Missing keys in the TOML file fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Origin of the proxy relaying upstream calls; `None` requests upstream directly
    pub proxy_base: Option<String>,
    /// Origin of the upstream contents API
    pub api_base: String,
    /// Recursion bound; negative means unlimited
    pub max_depth: i32,
    /// Files larger than this are omitted
    pub max_file_size: u64,
    /// Retries allowed per throttled fetch
    pub max_retries: u32,
    /// Sniff fetched content and omit files that look binary
    pub detect_binary: bool,
    /// HTTP client settings
    pub http: HttpConfig,
    /// Backoff applied to throttled responses
    pub backoff: BackoffConfig,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Wait bounds used when the upstream API throttles us
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackoffConfig {
    /// Baseline wait when the response carries no Retry-After hint
    pub default_wait_secs: u64,
    /// Lower clamp for a single wait, in milliseconds
    pub min_wait_ms: u64,
    /// Upper clamp for a single wait
    pub max_wait_secs: u64,
}

impl Config {
    /// Loads configuration from the default config file location
    ///
    /// If the config file doesn't exist, the defaults are used. Environment
    /// overrides are applied afterwards.
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.with_overrides(EnvOverrides::from_env()?)
    }

    /// Loads configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScribeError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ScribeError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Location of the user config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("repo-scribe").join("config.toml"))
    }

    /// Applies environment overrides on top of this configuration
    pub fn with_overrides(mut self, overrides: EnvOverrides) -> Result<Self> {
        if let Some(proxy_base) = overrides.proxy_base {
            self.proxy_base = Some(proxy_base);
        }
        if let Some(api_base) = overrides.api_base {
            self.api_base = api_base;
        }
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth = max_depth;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks that the endpoint bases parse and the limits are usable
    pub fn validate(&self) -> Result<()> {
        if let Some(proxy_base) = &self.proxy_base {
            Url::parse(proxy_base)
                .map_err(|e| ScribeError::Config(format!("Invalid proxy base '{}': {}", proxy_base, e)))?;
        }
        Url::parse(&self.api_base)
            .map_err(|e| ScribeError::Config(format!("Invalid API base '{}': {}", self.api_base, e)))?;

        if self.max_file_size == 0 {
            return Err(ScribeError::Config("max_file_size must be positive".into()));
        }
        if self.backoff.min_wait_ms > self.backoff.max_wait_secs.saturating_mul(1000) {
            return Err(ScribeError::Config("backoff.min_wait_ms exceeds backoff.max_wait_secs".into()));
        }
        Ok(())
    }

    /// Builds the shared HTTP client
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http.timeout())
            .user_agent(self.http.user_agent.clone())
            .build()
            .map_err(ScribeError::Transport)
    }
}

impl HttpConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_base: None,
            api_base: DEFAULT_API_BASE.to_string(),
            max_depth: -1,
            max_file_size: MAX_FILE_SIZE,
            max_retries: MAX_RETRIES,
            detect_binary: false,
            http: HttpConfig::default(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("repo-scribe/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            default_wait_secs: 60,
            min_wait_ms: 1000,
            max_wait_secs: 300,
        }
    }
}
