//! Sesame repository client.
//!
//! Queries are posted as form data to the repository URL. Sesame includes
//! inferred statements unless told otherwise, so `infer=false` is sent
//! whenever inference is not wanted.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use ledq_core::defaults::{SLOW_QUERY_MS, SPARQL_RESULTS_JSON};
use ledq_core::{Binding, Error, Result, SparqlExecutor};

use crate::config::StoreConfig;
use crate::results::parse_results;

/// SPARQL executor backed by a Sesame HTTP repository.
pub struct SesameStore {
    client: Client,
    config: StoreConfig,
}

impl SesameStore {
    /// Create a store client with the given configuration.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Sesame store: endpoint={}, timeout={}s",
            config.endpoint, config.timeout_secs
        );

        Ok(Self { client, config })
    }

    /// Create a store client for `endpoint` with default timeouts.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        Self::new(StoreConfig::new(endpoint))
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(StoreConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Check whether the repository is reachable.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/size", self.config.endpoint_url()))
            .timeout(Duration::from_secs(self.config.health_timeout_secs))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    info!("Sesame health check passed");
                    Ok(true)
                } else {
                    warn!("Sesame health check failed: {}", resp.status());
                    Ok(false)
                }
            }
            Err(e) => {
                warn!("Sesame health check error: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl SparqlExecutor for SesameStore {
    #[instrument(skip(self, query), fields(subsystem = "store", component = "sesame", op = "execute", query_len = query.len(), infer = infer))]
    async fn execute(&self, query: &str, infer: bool) -> Result<Vec<Binding>> {
        let start = Instant::now();

        let mut params = vec![("query", query)];
        if !infer {
            params.push(("infer", "false"));
        }

        let response = self
            .client
            .post(self.config.endpoint_url())
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let results = parse_results(&body)?;
        let elapsed = start.elapsed().as_millis() as u64;

        debug!(
            row_count = results.rows.len(),
            var_count = results.vars.len(),
            duration_ms = elapsed,
            "Query complete"
        );
        if elapsed > SLOW_QUERY_MS {
            warn!(
                duration_ms = elapsed,
                query_len = query.len(),
                slow = true,
                "Slow SPARQL query"
            );
        }
        Ok(results.rows)
    }
}
