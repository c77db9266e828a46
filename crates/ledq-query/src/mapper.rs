//! Folding of result rows into domain records.
//!
//! Joins across multi-valued relations fan a single observation out over
//! many rows. Every fold here merges those rows by identifier into one
//! record whose attributes are sets, so repeated values collapse.
//!
//! Numbers are read leniently: an unbound or unparsable numeric value is
//! simply absent. A row without the identifier it is grouped by cannot be
//! placed anywhere and is skipped with a warning.

use std::collections::{BTreeMap, BTreeSet};

use ledq_core::defaults::ENV_PREFERRED_LANGUAGE;
use ledq_core::{
    AttributeValue, Binding, ConceptsByType, HierarchyEntry, Labels, Link, Measure, Observation,
    SourceCount, SourceCounts, Term, TimeInterval,
};
use tracing::{trace, warn};

/// Options for folding observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapperOptions {
    /// Language whose label names an extra attribute when several exist.
    pub preferred_language: Option<String>,
}

impl MapperOptions {
    /// Read options from `LEDQ_PREFERRED_LANGUAGE`.
    pub fn from_env() -> Self {
        Self {
            preferred_language: std::env::var(ENV_PREFERRED_LANGUAGE)
                .ok()
                .filter(|lang| !lang.trim().is_empty()),
        }
    }

    pub fn with_preferred_language(mut self, lang: impl Into<String>) -> Self {
        self.preferred_language = Some(lang.into());
        self
    }
}

fn skipped(component: &str, var: &str, count: usize) {
    if count > 0 {
        warn!(
            subsystem = "query",
            component,
            missing_var = var,
            skipped_rows = count,
            "Skipped result rows without identifier"
        );
    }
}

fn value(row: &Binding, var: &str) -> Option<String> {
    row.get(var).map(|t| t.value().to_string())
}

/// Register a label term under its language ("" when untagged).
fn add_label(labels: &mut Labels, term: &Term) {
    labels.insert(
        term.lang().unwrap_or_default().to_string(),
        term.value().to_string(),
    );
}

fn link(row: &Binding, uri_var: &str, label_var: &str) -> Option<Link> {
    let uri = row.get(uri_var)?;
    let label = row.get(label_var);
    Some(Link {
        uri: uri.value().to_string(),
        label: label.map(|l| l.value().to_string()),
        lang: label.and_then(|l| l.lang()).map(str::to_string),
    })
}

fn attribute_value(term: &Term, label: Option<&Term>) -> AttributeValue {
    match term {
        Term::Literal { value, lang, .. } => AttributeValue::Literal {
            value: value.clone(),
            lang: lang.clone(),
        },
        Term::Uri { value } | Term::BlankNode { value } => AttributeValue::Resource(Link {
            uri: value.clone(),
            label: label.map(|l| l.value().to_string()),
            lang: label.and_then(|l| l.lang()).map(str::to_string),
        }),
    }
}

// =============================================================================
// LABELS
// =============================================================================

/// Group labels by resource: identifier → language → label.
///
/// A resource bound without a label still gets an (empty) entry.
pub fn fold_labels(rows: &[Binding], id_var: &str, label_var: &str) -> BTreeMap<String, Labels> {
    let mut result: BTreeMap<String, Labels> = BTreeMap::new();
    let mut skipped_rows = 0;

    for row in rows {
        let Some(id) = value(row, id_var) else {
            skipped_rows += 1;
            continue;
        };
        let labels = result.entry(id).or_default();
        if let Some(label) = row.get(label_var) {
            add_label(labels, label);
        }
    }

    skipped("labels", id_var, skipped_rows);
    result
}

// =============================================================================
// CONCEPTS
// =============================================================================

/// Group concept rows by dimension type and collect ancestry entries.
///
/// Ancestors are listed next to the concepts of the same type when the
/// store knows a label for them.
pub fn fold_concepts(rows: &[Binding], include_hierarchy: bool) -> (ConceptsByType, Vec<HierarchyEntry>) {
    let mut concepts = ConceptsByType::new();
    let mut entries = BTreeSet::new();
    let mut skipped_rows = 0;

    for row in rows {
        let (Some(kind), Some(concept)) = (value(row, "type"), value(row, "concept")) else {
            skipped_rows += 1;
            continue;
        };
        let by_concept = concepts.entry(kind).or_default();
        let labels = by_concept.entry(concept.clone()).or_default();
        if let Some(label) = row.get("label") {
            add_label(labels, label);
        }

        if !include_hierarchy {
            continue;
        }
        let ancestor = value(row, "ancestor");
        if let (Some(ancestor), Some(label)) = (&ancestor, row.get("ancLabel")) {
            add_label(by_concept.entry(ancestor.clone()).or_default(), label);
        }
        entries.insert(HierarchyEntry {
            grandparent: value(row, "grancestor"),
            ancestor,
            parent: value(row, "parent"),
            concept,
        });
    }

    skipped("concepts", "concept", skipped_rows);
    (concepts, entries.into_iter().collect())
}

// =============================================================================
// OBSERVATIONS
// =============================================================================

/// Merge fanned-out observation rows into one record per observation.
pub fn fold_observations(rows: &[Binding], options: &MapperOptions) -> BTreeMap<String, Observation> {
    let mut observations: BTreeMap<String, Observation> = BTreeMap::new();
    // observation → predicate → values, keyed by URI until labels are settled
    let mut extras: BTreeMap<String, BTreeMap<String, BTreeSet<AttributeValue>>> = BTreeMap::new();
    let mut predicate_labels: BTreeMap<String, BTreeSet<(String, String)>> = BTreeMap::new();
    let mut skipped_rows = 0;

    for row in rows {
        let Some(uri) = value(row, "obs") else {
            skipped_rows += 1;
            continue;
        };
        trace!(obs = %uri, "Folding observation row");
        let obs = observations
            .entry(uri.clone())
            .or_insert_with(|| Observation::new(uri.clone()));

        if let Some(mean) = row.get("mean").and_then(Term::as_f64) {
            obs.mean.insert(Measure(mean));
        }
        if let Some(uom) = value(row, "uom") {
            obs.uom.insert(uom);
        }
        if let Some(title) = value(row, "title") {
            obs.title.insert(title);
        }
        if let Some(desc) = value(row, "desc") {
            obs.description.insert(desc);
        }
        if let Some(source) = link(row, "dataset", "dlbl") {
            obs.source.insert(source);
        }
        if let Some(medium) = link(row, "medium", "mlbl") {
            obs.medium.insert(medium);
        }
        if let Some(analyte) = link(row, "analyte", "albl") {
            obs.analyte.insert(analyte);
        }
        if let Some(location) = link(row, "location", "llbl") {
            obs.location.insert(location);
        }
        let start = row.get("startTime").and_then(Term::as_i64);
        let end = row.get("endTime").and_then(Term::as_i64);
        if let Some(interval) = TimeInterval::new(start, end) {
            obs.time.insert(interval);
        }

        if let (Some(prd), Some(val)) = (value(row, "prd"), row.get("val")) {
            if let Some(label) = row.get("prdLabel") {
                predicate_labels.entry(prd.clone()).or_default().insert((
                    label.lang().unwrap_or_default().to_string(),
                    label.value().to_string(),
                ));
            }
            extras
                .entry(uri)
                .or_default()
                .entry(prd)
                .or_default()
                .insert(attribute_value(val, row.get("valLabel")));
        }
    }

    for (uri, by_predicate) in extras {
        let Some(obs) = observations.get_mut(&uri) else {
            continue;
        };
        for (prd, values) in by_predicate {
            let key = predicate_link(&prd, predicate_labels.get(&prd), options);
            obs.extras.entry(key).or_default().extend(values);
        }
    }

    skipped("observations", "obs", skipped_rows);
    observations
}

/// One key per predicate: the preferred-language label if present,
/// otherwise the smallest `(lang, label)` pair.
fn predicate_link(
    uri: &str,
    labels: Option<&BTreeSet<(String, String)>>,
    options: &MapperOptions,
) -> Link {
    let Some(labels) = labels else {
        return Link::new(uri);
    };
    let preferred = options
        .preferred_language
        .as_deref()
        .and_then(|pref| labels.iter().find(|(lang, _)| lang == pref));
    match preferred.or_else(|| labels.iter().next()) {
        Some((lang, label)) => Link::labelled(
            uri,
            label.clone(),
            Some(lang.clone()).filter(|l| !l.is_empty()),
        ),
        None => Link::new(uri),
    }
}

// =============================================================================
// COUNTS & DETAILS
// =============================================================================

/// Read the `?obsCount` of a single-row count result. No rows means zero.
pub fn fold_count(rows: &[Binding]) -> u64 {
    rows.first()
        .and_then(|row| row.get("obsCount"))
        .and_then(Term::as_i64)
        .map(|n| n.max(0) as u64)
        .unwrap_or(0)
}

/// Per-source counts from a grouped count result.
pub fn fold_source_counts(rows: &[Binding]) -> SourceCounts {
    let mut counts = SourceCounts::default();

    for row in rows {
        let count = row
            .get("obsCount")
            .and_then(Term::as_i64)
            .map(|n| n.max(0) as u64)
            .unwrap_or(0);
        match value(row, "dataset") {
            Some(source) => {
                let entry = counts.by_source.entry(source).or_insert(SourceCount {
                    count: 0,
                    label: None,
                });
                entry.count += count;
                if entry.label.is_none() {
                    entry.label = value(row, "label");
                }
            }
            None => counts.unattributed += count,
        }
    }

    counts
}

/// Predicate → objects of one resource.
pub fn fold_details(rows: &[Binding]) -> BTreeMap<String, BTreeSet<AttributeValue>> {
    let mut details: BTreeMap<String, BTreeSet<AttributeValue>> = BTreeMap::new();
    let mut skipped_rows = 0;

    for row in rows {
        let (Some(prd), Some(obj)) = (value(row, "prd"), row.get("obj")) else {
            skipped_rows += 1;
            continue;
        };
        details
            .entry(prd)
            .or_default()
            .insert(attribute_value(obj, None));
    }

    skipped("details", "prd", skipped_rows);
    details
}
