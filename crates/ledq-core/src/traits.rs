//! Core traits for ledq abstractions.
//!
//! The query layer only ever talks to a graph store through
//! [`SparqlExecutor`], so tests can swap in canned result rows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;

// =============================================================================
// RESULT TERMS
// =============================================================================

/// One bound RDF term in a result row.
///
/// Serializes in the shape of a SPARQL JSON results term:
/// `{"type": "uri", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    Uri { value: String },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
    #[serde(rename = "bnode")]
    BlankNode { value: String },
}

impl Term {
    pub fn uri(value: impl Into<String>) -> Self {
        Term::Uri {
            value: value.into(),
        }
    }

    pub fn blank_node(value: impl Into<String>) -> Self {
        Term::BlankNode {
            value: value.into(),
        }
    }

    /// Plain literal without language or datatype.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            lang: Some(lang.into()),
            datatype: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            lang: None,
            datatype: Some(datatype.into()),
        }
    }

    /// Lexical value of the term, whatever its kind.
    pub fn value(&self) -> &str {
        match self {
            Term::Uri { value } | Term::BlankNode { value } | Term::Literal { value, .. } => value,
        }
    }

    pub fn lang(&self) -> Option<&str> {
        match self {
            Term::Literal { lang, .. } => lang.as_deref(),
            _ => None,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Term::Uri { .. })
    }

    /// Numeric reading of the lexical value. Unparsable means no value.
    pub fn as_f64(&self) -> Option<f64> {
        self.value().trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Integer reading, truncating any fraction.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n.trunc() as i64)
    }
}

/// A result row: variable name → bound term. Unbound variables are absent.
pub type Binding = BTreeMap<String, Term>;

// =============================================================================
// EXECUTION
// =============================================================================

/// Executes SPARQL SELECT queries against a graph store.
#[async_trait]
pub trait SparqlExecutor: Send + Sync {
    /// Run `query` and return its result rows.
    ///
    /// `infer` asks the store to include inferred statements.
    async fn execute(&self, query: &str, infer: bool) -> Result<Vec<Binding>>;
}

#[async_trait]
impl<T: SparqlExecutor + ?Sized> SparqlExecutor for Arc<T> {
    async fn execute(&self, query: &str, infer: bool) -> Result<Vec<Binding>> {
        (**self).execute(query, infer).await
    }
}
