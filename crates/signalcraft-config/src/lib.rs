//! Configuration for the SignalCraft sync engine.
//!
//! Settings are resolved once, validated, and injected at construction time.
//! Nothing here is re-read during a reconciliation pass: a missing or
//! invalid configuration surfaces as a per-object error status from the
//! engine, never as a process fault.
//!
//! Resolution order:
//! 1. Environment variables (`SIGNALCRAFT_API_URL`, `SIGNALCRAFT_API_KEY`)
//! 2. A TOML settings file, when a path is given

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

pub const ENV_API_URL: &str = "SIGNALCRAFT_API_URL";
pub const ENV_API_KEY: &str = "SIGNALCRAFT_API_KEY";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEUE_DELAY: Duration = Duration::from_secs(60);

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing SIGNALCRAFT_API_URL or SIGNALCRAFT_API_KEY")]
    MissingCredentials,

    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Bearer credential for the SignalCraft API. Redacted in debug output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Validated settings injected into the engine at construction time.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub api_url: Url,
    pub api_key: ApiKey,
    pub request_timeout: Duration,
    pub requeue_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    api_url: String,
    api_key: String,
    request_timeout_secs: Option<u64>,
    requeue_delay_secs: Option<u64>,
}

impl SyncSettings {
    pub fn new(api_url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = ApiKey::new(api_key);
        if api_key.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            api_key,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            requeue_delay: DEFAULT_REQUEUE_DELAY,
        })
    }

    /// Resolve settings from the process environment. `.env` files are
    /// honored the same way the rest of the stack honors them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let api_url = std::env::var(ENV_API_URL).map_err(|_| ConfigError::MissingCredentials)?;
        let api_key = std::env::var(ENV_API_KEY).map_err(|_| ConfigError::MissingCredentials)?;
        if api_url.is_empty() || api_key.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Self::new(&api_url, api_key)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let file: SettingsFile = toml::from_str(&content)?;
        let mut settings = Self::new(&file.api_url, file.api_key)?;
        if let Some(secs) = file.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.requeue_delay_secs {
            settings.requeue_delay = Duration::from_secs(secs);
        }
        Ok(settings)
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_requeue_delay(mut self, delay: Duration) -> Self {
        self.requeue_delay = delay;
        self
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim_end_matches('/')).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}
