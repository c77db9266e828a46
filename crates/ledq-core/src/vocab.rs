//! RDF vocabulary used by the catalog queries.
//!
//! Observations follow the RDF Data Cube vocabulary (`qb:`), concepts are
//! SKOS concepts, and time periods carry Dublin Core `dct:start`/`dct:end`.
//! Catalog-specific predicates live in the LED namespace.

use serde::{Deserialize, Serialize};

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const QB: &str = "http://purl.org/linked-data/cube#";
pub const DCT: &str = "http://purl.org/dc/terms/";
pub const LED: &str = "http://data.uba.de/led/";

/// Prefix declarations in the order they are emitted at the top of every query.
pub const PREFIXES: [(&str, &str); 6] = [
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("skos", SKOS),
    ("qb", QB),
    ("dct", DCT),
    ("led", LED),
];

/// Catalog predicates that are mapped onto fixed [`Observation`](crate::Observation)
/// attributes. Everything else declared as a dimension or attribute
/// property ends up in the observation's extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Dimension whose values are time periods filtered by their start year.
    pub temporal: String,
    pub source: String,
    pub data_set: String,
    pub medium: String,
    pub analyte: String,
    pub location: String,
    pub mean: String,
    pub unit_of_measure: String,
    pub title: String,
    pub description: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::with_namespace(LED)
    }
}

impl Vocabulary {
    /// Build the catalog vocabulary rooted at a custom namespace.
    pub fn with_namespace(ns: &str) -> Self {
        Self {
            temporal: format!("{ns}temporal"),
            source: format!("{ns}source"),
            data_set: format!("{QB}dataSet"),
            medium: format!("{ns}observedMedia"),
            analyte: format!("{ns}analyte"),
            location: format!("{ns}location"),
            mean: format!("{ns}mean"),
            unit_of_measure: format!("{ns}uom"),
            title: format!("{DCT}title"),
            description: format!("{DCT}description"),
        }
    }

    /// Whether `dimension` is the time-period dimension.
    pub fn is_temporal(&self, dimension: &str) -> bool {
        self.temporal == dimension
    }

    /// Predicates with a dedicated observation attribute.
    pub fn core_predicates(&self) -> [&str; 10] {
        [
            self.temporal.as_str(),
            self.source.as_str(),
            self.data_set.as_str(),
            self.medium.as_str(),
            self.analyte.as_str(),
            self.location.as_str(),
            self.mean.as_str(),
            self.unit_of_measure.as_str(),
            self.title.as_str(),
            self.description.as_str(),
        ]
    }

    /// Whether `predicate` maps onto a fixed observation attribute.
    pub fn is_core_predicate(&self, predicate: &str) -> bool {
        self.core_predicates().contains(&predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_temporal_dimension() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_temporal("http://data.uba.de/led/temporal"));
        assert!(!vocab.is_temporal("http://data.uba.de/led/location"));
    }

    #[test]
    fn test_core_predicates_include_data_set_and_source() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_core_predicate("http://purl.org/linked-data/cube#dataSet"));
        assert!(vocab.is_core_predicate("http://data.uba.de/led/source"));
        assert!(!vocab.is_core_predicate("led://data.uba.de/upb/extractionMethod"));
    }

    #[test]
    fn test_custom_namespace() {
        let vocab = Vocabulary::with_namespace("http://example.org/");
        assert_eq!(vocab.analyte, "http://example.org/analyte");
        // Shared vocabularies are not rebased.
        assert_eq!(vocab.title, "http://purl.org/dc/terms/title");
    }
}
