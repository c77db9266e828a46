//! # ledq-query
//!
//! Faceted query engine for the ledq observation catalog.
//!
//! This crate provides:
//! - Collision-free graph patterns for constrained dimensions
//! - SPARQL assembly for observation, count and concept queries
//! - Concept forest reconstruction from flat ancestry rows
//! - Folding of fanned-out result rows into deduplicated records
//! - The [`Catalog`] façade running all of the above over a [`SparqlExecutor`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledq_core::{ConceptOptions, FacetConstraints};
//! use ledq_query::Catalog;
//! use ledq_store::SesameStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::from_env(SesameStore::from_env()?);
//!
//!     let constraints = FacetConstraints::new()
//!         .with_values("http://data.uba.de/led/location", ["http://data.uba.de/led/germany"]);
//!     let observations = catalog.determine_observations(&constraints, true).await?;
//!     println!("{} observations", observations.len());
//!     Ok(())
//! }
//! ```
//!
//! [`SparqlExecutor`]: ledq_core::SparqlExecutor

pub mod assembler;
pub mod catalog;
pub mod clause;
pub mod hierarchy;
pub mod mapper;
pub mod mock;

pub use assembler::{FacetQueryBuilder, SparqlQuery};
pub use catalog::Catalog;
pub use clause::{ClauseKind, DimensionClause, FacetClauseBuilder, FacetClauses};
pub use hierarchy::resolve_hierarchy;
pub use mapper::MapperOptions;
pub use mock::MockExecutor;
