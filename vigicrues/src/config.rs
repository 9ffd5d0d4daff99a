//! Client configuration.

use std::time::Duration;

use crate::discovery;
use crate::vigicrues;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default `User-Agent` header.
const DEFAULT_USER_AGENT: &str = concat!("vigicrues-rs/", env!("CARGO_PKG_VERSION"));

/// Error reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Configuration for the Vigicrues client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Vigicrues detail service
    pub vigicrues_base_url: String,
    /// Base URL of the station catalog dataset
    pub discovery_base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of catalog hits per search
    pub search_limit: u32,
    /// `User-Agent` sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a config pointing at the production services.
    pub fn new() -> Self {
        Self {
            vigicrues_base_url: vigicrues::DEFAULT_BASE_URL.to_string(),
            discovery_base_url: discovery::DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            search_limit: discovery::DEFAULT_SEARCH_LIMIT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Defaults overridden by `VIGICRUES_BASE_URL`, `VIGICRUES_DISCOVERY_URL`,
    /// `VIGICRUES_TIMEOUT_SECS` and `VIGICRUES_SEARCH_LIMIT` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Some(url) = lookup("VIGICRUES_BASE_URL") {
            config.vigicrues_base_url = url;
        }
        if let Some(url) = lookup("VIGICRUES_DISCOVERY_URL") {
            config.discovery_base_url = url;
        }
        if let Some(value) = lookup("VIGICRUES_TIMEOUT_SECS") {
            config.timeout_secs = parse_var("VIGICRUES_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("VIGICRUES_SEARCH_LIMIT") {
            config.search_limit = parse_var("VIGICRUES_SEARCH_LIMIT", &value)?;
        }

        Ok(config)
    }

    /// Set a custom detail-service URL (for testing).
    pub fn with_vigicrues_base_url(mut self, url: impl Into<String>) -> Self {
        self.vigicrues_base_url = url.into();
        self
    }

    /// Set a custom catalog URL (for testing).
    pub fn with_discovery_base_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the catalog page size.
    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<N: std::str::FromStr>(var: &'static str, value: &str) -> Result<N, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError {
        var,
        value: value.to_string(),
    })
}
