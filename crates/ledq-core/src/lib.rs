//! # ledq-core
//!
//! Core types, traits, and abstractions for the ledq observation catalog.
//!
//! This crate provides the domain models folded out of graph-store results,
//! the facet constraint types a caller selects with, the RDF vocabulary and
//! the [`SparqlExecutor`] contract the other ledq crates depend on.
//!
//! ## Logging
//!
//! The ledq crates log through `tracing` with the structured fields
//! `subsystem` ("query", "store"), `component`, `op`, `duration_ms`,
//! `row_count` and `result_count`. Levels:
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Skipped rows, dropped hierarchy branches, slow queries |
//! | INFO  | Operation completions |
//! | DEBUG | Assembled query shape, flags |

pub mod defaults;
pub mod error;
pub mod facet;
pub mod models;
pub mod traits;
pub mod vocab;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use facet::{iri_ref, FacetConstraints, FacetValue};
pub use models::*;
pub use traits::*;
pub use vocab::Vocabulary;
