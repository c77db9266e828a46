//! Facet query assembler.
//!
//! Composes the dimension clauses of a [`FacetConstraints`] selection into
//! complete SPARQL SELECT queries: observation listings, counts, concept
//! listings and the small lookup queries used by the catalog.
//!
//! Building is pure. Identical inputs give byte-identical query text, so
//! queries can be compared, cached or logged by the caller.
//!
//! # Inference
//!
//! Descendant matching and hierarchy resolution depend on inferred
//! `skos:narrower`/`skos:narrowerTransitive` statements. Queries that need
//! them carry `infer = true`; the caller may force inference on top.
//!
//! # Example
//!
//! ```
//! use ledq_core::{FacetConstraints, Vocabulary};
//! use ledq_query::assembler::FacetQueryBuilder;
//!
//! let vocab = Vocabulary::default();
//! let constraints = FacetConstraints::new()
//!     .with_values("http://data.uba.de/led/location", ["http://data.uba.de/led/berlin"]);
//!
//! let query = FacetQueryBuilder::new(&constraints, &vocab).observations_count();
//! assert!(query.text.contains("COUNT(DISTINCT ?obs)"));
//! assert!(!query.infer);
//! ```

use std::fmt::Write as _;

use ledq_core::{iri_ref, vocab, FacetConstraints, Vocabulary};

use crate::clause::{FacetClauseBuilder, INDENT};

/// A query ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    pub text: String,
    /// Whether the store should include inferred statements.
    pub infer: bool,
}

impl SparqlQuery {
    fn new(text: String, infer: bool) -> Self {
        Self { text, infer }
    }
}

/// `PREFIX` declarations for every namespace used in the queries.
pub fn prologue() -> String {
    let mut out = String::new();
    for (prefix, ns) in vocab::PREFIXES {
        // Writing into a String cannot fail
        let _ = writeln!(out, "PREFIX {}: <{}>", prefix, ns);
    }
    out
}

fn select(projection: &str, body: &[String], tail: Option<&str>) -> String {
    let mut text = prologue();
    text.push('\n');
    text.push_str("SELECT ");
    text.push_str(projection);
    text.push_str("\nWHERE {\n");
    for block in body.iter().filter(|b| !b.is_empty()) {
        text.push_str(block);
        text.push('\n');
    }
    text.push('}');
    if let Some(tail) = tail {
        text.push('\n');
        text.push_str(tail);
    }
    text.push('\n');
    text
}

/// Indent every line of `lines` by one level.
fn block(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| format!("{}{}", INDENT, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Optional link to a labelled resource: `?obs <predicate> ?var`, plus its
/// preferred label.
fn optional_link(predicate: &str, var: &str, label_var: &str) -> String {
    block(&[
        "OPTIONAL {",
        &format!("{}?obs {} ?{} .", INDENT, predicate, var),
        &format!(
            "{}OPTIONAL {{ ?{} skos:prefLabel ?{} . }}",
            INDENT, var, label_var
        ),
        "}",
    ])
}

fn optional_value(predicate: &str, var: &str) -> String {
    block(&[&format!("OPTIONAL {{ ?obs {} ?{} . }}", predicate, var)])
}

// =============================================================================
// FACET QUERY BUILDER
// =============================================================================

/// Builds queries over the observations matching a facet selection.
pub struct FacetQueryBuilder<'a> {
    constraints: &'a FacetConstraints,
    vocabulary: &'a Vocabulary,
    include_descendants: bool,
    force_infer: bool,
}

impl<'a> FacetQueryBuilder<'a> {
    pub fn new(constraints: &'a FacetConstraints, vocabulary: &'a Vocabulary) -> Self {
        Self {
            constraints,
            vocabulary,
            include_descendants: false,
            force_infer: false,
        }
    }

    /// Match observations classified under narrower concepts of the selected ones.
    pub fn with_descendants(mut self, include_descendants: bool) -> Self {
        self.include_descendants = include_descendants;
        self
    }

    /// Request inference even when the query shape does not need it.
    pub fn with_forced_inference(mut self, force: bool) -> Self {
        self.force_infer = force;
        self
    }

    /// Facet clauses plus whether they need inference.
    fn facet_pattern(&self) -> (String, bool) {
        let clauses = FacetClauseBuilder::new(self.constraints, self.vocabulary, 0)
            .with_descendants(self.include_descendants)
            .build();
        if clauses.pattern.is_empty() {
            (block(&["?obs a qb:Observation ."]), false)
        } else {
            (clauses.pattern, clauses.uses_descendants)
        }
    }

    fn source_predicate(&self) -> String {
        format!(
            "{}|{}",
            iri_ref(&self.vocabulary.data_set),
            iri_ref(&self.vocabulary.source)
        )
    }

    /// Observations with all their attributes, one row per combination.
    pub fn observations(&self) -> SparqlQuery {
        let (facets, needs_infer) = self.facet_pattern();
        let v = self.vocabulary;

        let time = block(&[
            "OPTIONAL {",
            &format!("{}?obs {} ?period .", INDENT, iri_ref(&v.temporal)),
            &format!("{}?period dct:start ?startTime .", INDENT),
            &format!("{}?period dct:end ?endTime .", INDENT),
            "}",
        ]);

        let core = v
            .core_predicates()
            .iter()
            .map(|p| iri_ref(p))
            .collect::<Vec<_>>()
            .join(", ");
        let extras = block(&[
            "OPTIONAL {",
            &format!("{}?obs ?prd ?val .", INDENT),
            &format!(
                "{}{{ ?prd a qb:DimensionProperty . }} UNION {{ ?prd a qb:AttributeProperty . }}",
                INDENT
            ),
            &format!("{}FILTER(?prd NOT IN ({}))", INDENT, core),
            &format!(
                "{}OPTIONAL {{ ?prd rdfs:label|skos:prefLabel ?prdLabel . }}",
                INDENT
            ),
            &format!("{}OPTIONAL {{ ?val skos:prefLabel ?valLabel . }}", INDENT),
            "}",
        ]);

        let body = vec![
            facets,
            optional_value(&iri_ref(&v.mean), "mean"),
            optional_value(&iri_ref(&v.unit_of_measure), "uom"),
            optional_value(&iri_ref(&v.title), "title"),
            optional_value(&iri_ref(&v.description), "desc"),
            optional_link(&self.source_predicate(), "dataset", "dlbl"),
            optional_link(&iri_ref(&v.medium), "medium", "mlbl"),
            optional_link(&iri_ref(&v.analyte), "analyte", "albl"),
            optional_link(&iri_ref(&v.location), "location", "llbl"),
            time,
            extras,
        ];

        let projection = "DISTINCT ?obs ?mean ?uom ?title ?desc \
                          ?dataset ?dlbl ?medium ?mlbl ?analyte ?albl ?location ?llbl \
                          ?startTime ?endTime ?prd ?prdLabel ?val ?valLabel";
        SparqlQuery::new(
            select(projection, &body, None),
            needs_infer || self.force_infer,
        )
    }

    /// Number of distinct matching observations.
    pub fn observations_count(&self) -> SparqlQuery {
        let (facets, needs_infer) = self.facet_pattern();
        SparqlQuery::new(
            select("(COUNT(DISTINCT ?obs) AS ?obsCount)", &[facets], None),
            needs_infer || self.force_infer,
        )
    }

    /// Distinct matching observations grouped by data source.
    pub fn observations_count_by_source(&self) -> SparqlQuery {
        let (facets, needs_infer) = self.facet_pattern();
        let source = optional_link(&self.source_predicate(), "dataset", "dlbl");
        SparqlQuery::new(
            select(
                "?dataset (SAMPLE(?dlbl) AS ?label) (COUNT(DISTINCT ?obs) AS ?obsCount)",
                &[facets, source],
                Some("GROUP BY ?dataset"),
            ),
            needs_infer || self.force_infer,
        )
    }

    fn concepts_body(&self, dimensions: &[&str]) -> (Vec<String>, bool) {
        let (facets, needs_infer) = self.facet_pattern();
        let types = dimensions
            .iter()
            .map(|d| iri_ref(d))
            .collect::<Vec<_>>()
            .join(" ");
        let body = vec![
            block(&[&format!("VALUES ?type {{ {} }}", types)]),
            facets,
            block(&["?obs ?type ?concept ."]),
        ];
        (body, needs_infer)
    }

    /// Concepts of `dimensions` used by matching observations, with labels.
    ///
    /// With `include_hierarchy` every row also carries one ancestor of the
    /// concept, its immediate parent and the ancestor's own parent.
    pub fn concepts(&self, dimensions: &[&str], include_hierarchy: bool) -> SparqlQuery {
        let (mut body, needs_infer) = self.concepts_body(dimensions);
        body.push(block(&["OPTIONAL { ?concept skos:prefLabel ?label . }"]));

        let mut projection = String::from("DISTINCT ?type ?concept ?label");
        if include_hierarchy {
            projection.push_str(" ?grancestor ?ancestor ?parent ?ancLabel");
            body.push(block(&[
                "OPTIONAL {",
                &format!("{}?parent skos:narrower ?concept .", INDENT),
                &format!("{}?ancestor skos:narrowerTransitive ?concept .", INDENT),
                &format!(
                    "{}OPTIONAL {{ ?grancestor skos:narrower ?ancestor . }}",
                    INDENT
                ),
                &format!(
                    "{}OPTIONAL {{ ?ancestor skos:prefLabel ?ancLabel . }}",
                    INDENT
                ),
                "}",
            ]));
        }

        SparqlQuery::new(
            select(&projection, &body, None),
            needs_infer || include_hierarchy || self.force_infer,
        )
    }

    /// Number of distinct observations behind a concept listing.
    pub fn concepts_count(&self, dimensions: &[&str]) -> SparqlQuery {
        let (body, needs_infer) = self.concepts_body(dimensions);
        SparqlQuery::new(
            select("(COUNT(DISTINCT ?obs) AS ?obsCount)", &body, None),
            needs_infer || self.force_infer,
        )
    }
}

// =============================================================================
// LOOKUP QUERIES
// =============================================================================

/// Declared dimension properties with their labels.
pub fn dimensions() -> SparqlQuery {
    let body = vec![block(&[
        "?dim a qb:DimensionProperty .",
        "OPTIONAL { ?dim rdfs:label|skos:prefLabel ?label . }",
    ])];
    SparqlQuery::new(select("DISTINCT ?dim ?label", &body, None), false)
}

/// Labels of the given resources.
pub fn resource_labels<S: AsRef<str>>(uris: &[S]) -> SparqlQuery {
    let values = uris
        .iter()
        .map(|u| iri_ref(u.as_ref()))
        .collect::<Vec<_>>()
        .join(" ");
    let body = vec![block(&[
        &format!("VALUES ?resource {{ {} }}", values),
        "?resource skos:prefLabel|rdfs:label ?label .",
    ])];
    SparqlQuery::new(select("DISTINCT ?resource ?label", &body, None), false)
}

/// Every predicate/object pair of one resource.
pub fn resource_details(uri: &str) -> SparqlQuery {
    let body = vec![block(&[&format!("{} ?prd ?obj .", iri_ref(uri))])];
    SparqlQuery::new(select("DISTINCT ?prd ?obj", &body, None), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATION: &str = "http://data.uba.de/led/location";
    const ANALYTE: &str = "http://data.uba.de/led/analyte";

    fn constraints() -> FacetConstraints {
        FacetConstraints::new()
            .with_values(LOCATION, ["http://data.uba.de/led/berlin"])
            .with_values(ANALYTE, ["http://data.uba.de/led/lead"])
    }

    #[test]
    fn test_prologue_declares_prefixes() {
        let p = prologue();
        assert!(p.starts_with("PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>\n"));
        assert!(p.contains("PREFIX led: <http://data.uba.de/led/>\n"));
        assert_eq!(p.lines().count(), 6);
    }

    #[test]
    fn test_observations_is_deterministic() {
        let vocab = Vocabulary::default();
        let c = constraints();
        let a = FacetQueryBuilder::new(&c, &vocab).observations();
        let b = FacetQueryBuilder::new(&c, &vocab).observations();
        assert_eq!(a, b);
    }

    #[test]
    fn test_observations_joins_every_dimension() {
        let vocab = Vocabulary::default();
        let c = constraints();
        let q = FacetQueryBuilder::new(&c, &vocab).observations();
        assert!(q.text.contains("FILTER(?concept0 IN (<http://data.uba.de/led/lead>))"));
        assert!(q.text.contains("FILTER(?concept1 IN (<http://data.uba.de/led/berlin>))"));
        assert!(!q.infer);
    }

    #[test]
    fn test_observations_attribute_groups() {
        let vocab = Vocabulary::default();
        let c = FacetConstraints::new();
        let q = FacetQueryBuilder::new(&c, &vocab).observations();
        assert!(q.text.contains("?obs a qb:Observation ."));
        assert!(q.text.contains(
            "?obs <http://purl.org/linked-data/cube#dataSet>|<http://data.uba.de/led/source> ?dataset ."
        ));
        assert!(q.text.contains("?period dct:start ?startTime ."));
        assert!(q.text.contains("?period dct:end ?endTime ."));
        assert!(q.text.contains("?prd a qb:AttributeProperty ."));
        assert!(q.text.contains("FILTER(?prd NOT IN (<http://data.uba.de/led/temporal>"));
    }

    #[test]
    fn test_descendants_require_inference() {
        let vocab = Vocabulary::default();
        let c = constraints();
        let q = FacetQueryBuilder::new(&c, &vocab)
            .with_descendants(true)
            .observations();
        assert!(q.text.contains("skos:narrower*"));
        assert!(q.infer);
    }

    #[test]
    fn test_descendants_on_temporal_only_need_no_inference() {
        let vocab = Vocabulary::default();
        let c = FacetConstraints::new().with_values(vocab.temporal.clone(), ["2001"]);
        let q = FacetQueryBuilder::new(&c, &vocab)
            .with_descendants(true)
            .observations_count();
        assert!(q.text.contains("?time0 dct:start ?concept0 ."));
        assert!(!q.infer);
    }

    #[test]
    fn test_forced_inference() {
        let vocab = Vocabulary::default();
        let c = constraints();
        let q = FacetQueryBuilder::new(&c, &vocab)
            .with_forced_inference(true)
            .observations_count();
        assert!(q.infer);
    }

    #[test]
    fn test_count_by_source_groups() {
        let vocab = Vocabulary::default();
        let c = constraints();
        let q = FacetQueryBuilder::new(&c, &vocab).observations_count_by_source();
        assert!(q.text.contains("(SAMPLE(?dlbl) AS ?label)"));
        assert!(q.text.trim_end().ends_with("GROUP BY ?dataset"));
    }

    #[test]
    fn test_concepts_without_hierarchy() {
        let vocab = Vocabulary::default();
        let c = FacetConstraints::new();
        let q = FacetQueryBuilder::new(&c, &vocab).concepts(&[LOCATION], false);
        assert!(q.text.contains("VALUES ?type { <http://data.uba.de/led/location> }"));
        assert!(q.text.contains("?obs ?type ?concept ."));
        assert!(!q.text.contains("?grancestor"));
        assert!(!q.infer);
    }

    #[test]
    fn test_concepts_with_hierarchy() {
        let vocab = Vocabulary::default();
        let c = constraints();
        let q = FacetQueryBuilder::new(&c, &vocab).concepts(&[LOCATION, ANALYTE], true);
        assert!(q.text.contains("SELECT DISTINCT ?type ?concept ?label ?grancestor ?ancestor ?parent ?ancLabel"));
        assert!(q.text.contains("?ancestor skos:narrowerTransitive ?concept ."));
        assert!(q.text.contains("?concept1 IN"));
        assert!(q.infer);
    }

    #[test]
    fn test_concepts_count_projects_count() {
        let vocab = Vocabulary::default();
        let c = FacetConstraints::new();
        let q = FacetQueryBuilder::new(&c, &vocab).concepts_count(&[LOCATION]);
        assert!(q.text.contains("SELECT (COUNT(DISTINCT ?obs) AS ?obsCount)"));
        assert!(!q.text.contains("?label"));
    }

    #[test]
    fn test_lookup_queries() {
        assert!(dimensions().text.contains("?dim a qb:DimensionProperty ."));
        let labels = resource_labels(&["http://x/a", "http://x/b"]);
        assert!(labels.text.contains("VALUES ?resource { <http://x/a> <http://x/b> }"));
        let details = resource_details("http://x/a");
        assert!(details.text.contains("<http://x/a> ?prd ?obj ."));
        assert!(!details.infer);
    }
}
