//! Centralized default constants for ledq.
//!
//! All crates reference these constants instead of defining their own
//! magic numbers. Organized by domain area.

// =============================================================================
// GRAPH STORE
// =============================================================================

/// Default SPARQL endpoint (a Sesame repository).
pub const SPARQL_ENDPOINT: &str = "http://localhost:8080/openrdf-sesame/repositories/led";

/// Timeout for a single SPARQL request (seconds).
pub const QUERY_TIMEOUT_SECS: u64 = 60;

/// Timeout for the store health check (seconds).
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Queries slower than this are logged at WARN level (milliseconds).
pub const SLOW_QUERY_MS: u64 = 5_000;

/// Media type requested from the endpoint.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Overrides [`SPARQL_ENDPOINT`].
pub const ENV_SPARQL_ENDPOINT: &str = "LEDQ_SPARQL_ENDPOINT";

/// Overrides [`QUERY_TIMEOUT_SECS`].
pub const ENV_QUERY_TIMEOUT_SECS: &str = "LEDQ_SPARQL_TIMEOUT_SECS";

/// Preferred label language when a single label must be chosen.
pub const ENV_PREFERRED_LANGUAGE: &str = "LEDQ_PREFERRED_LANGUAGE";
