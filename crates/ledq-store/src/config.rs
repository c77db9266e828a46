//! Store connection configuration.
//!
//! Loaded from environment variables with defaults from
//! [`ledq_core::defaults`]:
//!
//! - `LEDQ_SPARQL_ENDPOINT`: repository URL
//!   (typically `.../openrdf-sesame/repositories/<id>`)
//! - `LEDQ_SPARQL_TIMEOUT_SECS`: per-request timeout

use serde::{Deserialize, Serialize};

use ledq_core::defaults::{
    ENV_QUERY_TIMEOUT_SECS, ENV_SPARQL_ENDPOINT, HEALTH_CHECK_TIMEOUT_SECS, QUERY_TIMEOUT_SECS,
    SPARQL_ENDPOINT,
};
use ledq_core::{Error, Result};

/// Connection settings for a Sesame repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Repository URL queries are posted to.
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Health check timeout in seconds.
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    QUERY_TIMEOUT_SECS
}

fn default_health_timeout() -> u64 {
    HEALTH_CHECK_TIMEOUT_SECS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: SPARQL_ENDPOINT.to_string(),
            timeout_secs: QUERY_TIMEOUT_SECS,
            health_timeout_secs: HEALTH_CHECK_TIMEOUT_SECS,
        }
    }
}

impl StoreConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var(ENV_SPARQL_ENDPOINT)
                .unwrap_or_else(|_| SPARQL_ENDPOINT.to_string()),
            timeout_secs: std::env::var(ENV_QUERY_TIMEOUT_SECS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(QUERY_TIMEOUT_SECS),
            health_timeout_secs: HEALTH_CHECK_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Repository URL without a trailing slash.
    pub fn endpoint_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::Config("SPARQL endpoint cannot be empty".to_string()));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(Error::Config(format!(
                "SPARQL endpoint must start with http:// or https://, got: {}",
                self.endpoint
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "SPARQL timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
