//! # ledq-store
//!
//! Graph store access for the ledq observation catalog.
//!
//! This crate provides:
//! - [`SesameStore`], a [`SparqlExecutor`] posting queries to a Sesame repository
//! - Environment-driven [`StoreConfig`]
//! - Decoding of SPARQL JSON result documents
//!
//! # Example
//!
//! ```rust,no_run
//! use ledq_core::SparqlExecutor;
//! use ledq_store::SesameStore;
//!
//! #[tokio::main]
//! async fn main() -> ledq_core::Result<()> {
//!     let store = SesameStore::from_env()?;
//!     let rows = store.execute("SELECT ?s WHERE { ?s ?p ?o } LIMIT 1", false).await?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```
//!
//! [`SparqlExecutor`]: ledq_core::SparqlExecutor

pub mod config;
pub mod results;
pub mod sesame;

pub use config::StoreConfig;
pub use results::{parse_results, SelectResults};
pub use sesame::SesameStore;
