//! Bridge configuration: upstream location, secret, and catalog cache policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_BASE_URL: &str = "https://api.picaos.com";
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 300;
pub const DEFAULT_PAGE_LIMIT: u32 = 1000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Upstream platform base URL, without the `/v1` prefix
    pub base_url: String,
    /// Value sent in `x-pica-secret`
    pub secret: String,
    /// Age after which the cached connection/definition lists are refetched
    pub catalog_ttl_secs: u64,
    /// `limit` sent on catalog list calls
    pub page_limit: u32,
    pub connect_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secret: String::new(),
            catalog_ttl_secs: DEFAULT_CATALOG_TTL_SECS,
            page_limit: DEFAULT_PAGE_LIMIT,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

// Hand-written so the secret never reaches a log line through `{:?}`.
impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("base_url", &self.base_url)
            .field("secret", &if self.secret.is_empty() { "<unset>" } else { "<redacted>" })
            .field("catalog_ttl_secs", &self.catalog_ttl_secs)
            .field("page_limit", &self.page_limit)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

impl BridgeConfig {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Load from process environment (`PICA_SECRET`, `PICA_BASE_URL`,
    /// `PICA_CATALOG_TTL_SECS`, `PICA_PAGE_LIMIT`)
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secret) = lookup("PICA_SECRET") {
            config.secret = secret;
        }
        if let Some(base_url) = lookup("PICA_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(ttl) = lookup("PICA_CATALOG_TTL_SECS") {
            config.catalog_ttl_secs = ttl.parse().map_err(|_| {
                CoreError::Config(format!("PICA_CATALOG_TTL_SECS is not a number: {}", ttl))
            })?;
        }
        if let Some(limit) = lookup("PICA_PAGE_LIMIT") {
            config.page_limit = limit.parse().map_err(|_| {
                CoreError::Config(format!("PICA_PAGE_LIMIT is not a number: {}", limit))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing fields keep their defaults
    pub fn from_toml_str(source: &str) -> CoreResult<Self> {
        let config = Self::parse_toml(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating, for callers that layer overrides on top
    pub fn parse_toml(source: &str) -> CoreResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file without validating
    pub fn read_toml_file(path: &Path) -> CoreResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Io(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse_toml(&source)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.secret.trim().is_empty() {
            return Err(CoreError::Config(
                "PICA_SECRET is required and must not be empty".to_string(),
            ));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            CoreError::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        if self.page_limit == 0 {
            return Err(CoreError::Config("page_limit must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Base URL with trailing slashes removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
