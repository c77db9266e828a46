//! Core data models for ledq.
//!
//! These types are shared across all ledq crates and represent the
//! domain entities folded out of graph-store results.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// LABELS
// =============================================================================

/// Labels indexed by language tag. An untagged label uses the empty key.
pub type Labels = BTreeMap<String, String>;

/// Dimension type → concept identifier → labels.
pub type ConceptsByType = BTreeMap<String, BTreeMap<String, Labels>>;

/// Root mapping of a concept forest.
pub type Hierarchy = BTreeMap<String, HierarchyNode>;

// =============================================================================
// LINK
// =============================================================================

/// A resource reference with an optional display label.
///
/// Equality covers the whole `(uri, label, lang)` triple: the same resource
/// labelled in two languages yields two distinct links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Link {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: None,
            lang: None,
        }
    }

    pub fn labelled(uri: impl Into<String>, label: impl Into<String>, lang: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            label: Some(label.into()),
            lang,
        }
    }

    /// Text to show for this link; falls back to the URI.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.uri)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.label, &self.lang) {
            (Some(label), Some(lang)) => write!(f, "\"{}\"@{}<{}>", label, lang, self.uri),
            (Some(label), None) => write!(f, "\"{}\"<{}>", label, self.uri),
            (None, _) => write!(f, "<{}>", self.uri),
        }
    }
}

// =============================================================================
// VALUES
// =============================================================================

/// Object of an extra attribute or resource detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeValue {
    /// A resource, labelled when the store knows a label for it.
    Resource(Link),
    /// A literal kept in its lexical form.
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    },
}

impl AttributeValue {
    pub fn literal(value: impl Into<String>) -> Self {
        AttributeValue::Literal {
            value: value.into(),
            lang: None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Resource(link) => link.fmt(f),
            AttributeValue::Literal {
                value,
                lang: Some(lang),
            } => write!(f, "\"{}\"@{}", value, lang),
            AttributeValue::Literal { value, lang: None } => f.write_str(value),
        }
    }
}

/// A measured value. Totally ordered so it can live in a set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measure(pub f64);

impl PartialEq for Measure {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Measure {}

impl PartialOrd for Measure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Measure {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Observation period as start/end years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeInterval {
    /// `None` when neither bound is known.
    pub fn new(start: Option<i64>, end: Option<i64>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            None
        } else {
            Some(Self { start, end })
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<i64>| b.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
        write!(f, "[{}, {}]", bound(self.start), bound(self.end))
    }
}

// =============================================================================
// OBSERVATION
// =============================================================================

/// A statistical observation with multi-valued attributes.
///
/// A join against a multi-valued relation can yield several values per
/// attribute, and fan-out rows repeat values, so every attribute is a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub uri: String,
    pub source: BTreeSet<Link>,
    pub medium: BTreeSet<Link>,
    pub analyte: BTreeSet<Link>,
    pub location: BTreeSet<Link>,
    pub time: BTreeSet<TimeInterval>,
    pub mean: BTreeSet<Measure>,
    pub uom: BTreeSet<String>,
    pub title: BTreeSet<String>,
    pub description: BTreeSet<String>,
    /// Declared dimensions/attributes without a dedicated slot, keyed by predicate.
    #[serde(with = "extras_entries")]
    pub extras: BTreeMap<Link, BTreeSet<AttributeValue>>,
}

impl Observation {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// Metadata-only records (e.g. dataset descriptions) carry no measured mean.
    pub fn is_metadata(&self) -> bool {
        self.mean.is_empty()
    }

    /// Look up extras by predicate URI regardless of the key's label.
    pub fn extra(&self, predicate: &str) -> Option<&BTreeSet<AttributeValue>> {
        self.extras
            .iter()
            .find(|(key, _)| key.uri == predicate)
            .map(|(_, values)| values)
    }
}

/// JSON maps need string keys, so extras travel as a list of entries.
mod extras_entries {
    use super::{AttributeValue, Link};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::{BTreeMap, BTreeSet};

    #[derive(Serialize, Deserialize)]
    struct Entry {
        predicate: Link,
        values: BTreeSet<AttributeValue>,
    }

    pub fn serialize<S: Serializer>(
        extras: &BTreeMap<Link, BTreeSet<AttributeValue>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<Entry> = extras
            .iter()
            .map(|(predicate, values)| Entry {
                predicate: predicate.clone(),
                values: values.clone(),
            })
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Link, BTreeSet<AttributeValue>>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.predicate, entry.values))
            .collect())
    }
}

// =============================================================================
// HIERARCHY
// =============================================================================

/// A concept in a broader/narrower forest. A leaf has no children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HierarchyNode {
    pub children: BTreeMap<String, HierarchyNode>,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, id: &str) -> Option<&HierarchyNode> {
        self.children.get(id)
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .values()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// One ancestry row of a concept.
///
/// `ancestor` is reachable from `concept` through zero or more narrower
/// steps, `parent` is the concept's immediate broader concept, and
/// `grandparent` is the ancestor's own parent (absent for a root ancestor).
/// A row without `ancestor` and `parent` marks `concept` itself as a root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HierarchyEntry {
    pub grandparent: Option<String>,
    pub ancestor: Option<String>,
    pub parent: Option<String>,
    pub concept: String,
}

impl HierarchyEntry {
    /// Entry with a fully known ancestry.
    pub fn new(
        grandparent: Option<&str>,
        ancestor: &str,
        parent: &str,
        concept: &str,
    ) -> Self {
        Self {
            grandparent: grandparent.map(str::to_string),
            ancestor: Some(ancestor.to_string()),
            parent: Some(parent.to_string()),
            concept: concept.to_string(),
        }
    }

    /// Entry for a concept without any broader concept.
    pub fn root(concept: &str) -> Self {
        Self {
            grandparent: None,
            ancestor: None,
            parent: None,
            concept: concept.to_string(),
        }
    }
}

// =============================================================================
// COUNTS & LISTINGS
// =============================================================================

/// Observation count for one data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Observation counts broken down by data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub by_source: BTreeMap<String, SourceCount>,
    /// Observations without any recorded source.
    #[serde(default)]
    pub unattributed: u64,
}

impl SourceCounts {
    /// Sum over all sources. An observation with two sources counts twice.
    pub fn total(&self) -> u64 {
        self.unattributed + self.by_source.values().map(|s| s.count).sum::<u64>()
    }

    pub fn get(&self, source: &str) -> Option<&SourceCount> {
        self.by_source.get(source)
    }
}

/// Result of a concept listing with its optional siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptListing {
    pub concepts: ConceptsByType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<Hierarchy>,
}

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Options for listing the concepts of a dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptOptions {
    /// Also count the distinct observations behind the listed concepts.
    #[serde(default)]
    pub include_observations_count: bool,
    /// Also resolve the broader/narrower forest of the listed concepts.
    #[serde(default)]
    pub include_hierarchy: bool,
    /// Let constraints on other dimensions match descendants of the selected concepts.
    #[serde(default)]
    pub include_descendants: bool,
    /// Force server-side inference.
    #[serde(default)]
    pub infer: bool,
}
