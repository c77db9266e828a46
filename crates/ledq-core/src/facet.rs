//! Facet constraints: the concepts a caller selected per dimension.
//!
//! Raw facet values arrive as text. A value that reads as a number is a
//! year selected on the temporal dimension; anything else is a concept
//! identifier. Both render as SPARQL terms that can be dropped into an
//! `IN (...)` list without further escaping.
//!
//! # Example
//!
//! ```
//! use ledq_core::{FacetConstraints, FacetValue};
//!
//! let constraints = FacetConstraints::new()
//!     .with_values("http://data.uba.de/led/location", ["http://data.uba.de/led/berlin"])
//!     .with_values("http://data.uba.de/led/temporal", ["2001", "2002"]);
//!
//! assert_eq!(constraints.len(), 2);
//! assert_eq!(FacetValue::classify("2001.0"), FacetValue::NumericLiteral(2001));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// FACET VALUE
// =============================================================================

/// A single selected value of a dimension.
///
/// Deserializing classifies: JSON text goes through [`FacetValue::classify`]
/// exactly like raw input handed to [`FacetConstraints::with_values`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged, from = "RawFacetValue")]
pub enum FacetValue {
    /// A year, matched against the start of a time period.
    NumericLiteral(i64),
    /// A concept IRI.
    ResourceIdentifier(String),
}

impl FacetValue {
    /// Classify raw facet text.
    ///
    /// Text parsing as a finite number within `i64` range becomes a numeric
    /// literal, truncated toward zero. Everything else is taken as a
    /// resource identifier.
    pub fn classify(raw: &str) -> Self {
        match raw.trim().parse::<f64>().ok().and_then(truncate_to_i64) {
            Some(n) => FacetValue::NumericLiteral(n),
            None => FacetValue::ResourceIdentifier(raw.to_string()),
        }
    }

    /// Render as a SPARQL term.
    pub fn to_sparql(&self) -> String {
        match self {
            FacetValue::NumericLiteral(n) => n.to_string(),
            FacetValue::ResourceIdentifier(iri) => iri_ref(iri),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FacetValue::NumericLiteral(_))
    }
}

fn truncate_to_i64(n: f64) -> Option<i64> {
    let n = n.trunc();
    // 2^63 is exactly representable; anything at or beyond it would saturate
    (n.is_finite() && n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
}

/// Wire form of a facet value: JSON text or a JSON number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFacetValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<RawFacetValue> for FacetValue {
    fn from(raw: RawFacetValue) -> Self {
        match raw {
            RawFacetValue::Integer(n) => FacetValue::NumericLiteral(n),
            RawFacetValue::Float(n) => match truncate_to_i64(n) {
                Some(n) => FacetValue::NumericLiteral(n),
                None => FacetValue::ResourceIdentifier(n.to_string()),
            },
            RawFacetValue::Text(text) => FacetValue::classify(&text),
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sparql())
    }
}

impl From<&str> for FacetValue {
    fn from(raw: &str) -> Self {
        FacetValue::classify(raw)
    }
}

impl From<String> for FacetValue {
    fn from(raw: String) -> Self {
        FacetValue::classify(&raw)
    }
}

/// Render an IRI as `<iri>`, percent-encoding characters that may not
/// appear inside an IRI reference.
pub fn iri_ref(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len() + 2);
    out.push('<');
    for c in iri.chars() {
        if is_iri_illegal(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out.push('>');
    out
}

fn is_iri_illegal(c: char) -> bool {
    matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
        || c.is_whitespace()
        || c.is_control()
}

// =============================================================================
// FACET CONSTRAINTS
// =============================================================================

/// Selected values keyed by dimension IRI.
///
/// Values within a dimension are alternatives (OR); dimensions are combined
/// with AND. Dimensions iterate in sorted order so the variable slots
/// assigned while building a query are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetConstraints {
    dimensions: BTreeMap<String, Vec<FacetValue>>,
}

impl FacetConstraints {
    /// Create an empty set of constraints (no restriction).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add raw values for a dimension, classifying each.
    pub fn with_values<I, S>(mut self, dimension: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(dimension, values);
        self
    }

    /// Add raw values for a dimension, appending to any already present.
    pub fn insert<I, S>(&mut self, dimension: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dimensions
            .entry(dimension.into())
            .or_default()
            .extend(values.into_iter().map(|v| FacetValue::classify(v.as_ref())));
    }

    /// Build from a raw dimension → values mapping.
    pub fn from_raw<I, K, V, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut constraints = Self::new();
        for (dimension, values) in raw {
            constraints.insert(dimension, values);
        }
        constraints
    }

    pub fn values(&self, dimension: &str) -> Option<&[FacetValue]> {
        self.dimensions.get(dimension).map(Vec::as_slice)
    }

    /// Dimensions with their values, in sorted dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FacetValue])> {
        self.dimensions
            .iter()
            .map(|(dim, values)| (dim.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}
