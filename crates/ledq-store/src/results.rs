//! Decoding of `application/sparql-results+json` documents.

use serde::Deserialize;
use std::collections::BTreeMap;

use ledq_core::{Binding, Error, Result, Term};

#[derive(Debug, Deserialize)]
struct ResultsDocument {
    #[serde(default)]
    head: Head,
    results: Option<ResultsBody>,
}

#[derive(Debug, Default, Deserialize)]
struct Head {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsBody {
    #[serde(default)]
    bindings: Vec<BTreeMap<String, RawTerm>>,
}

#[derive(Debug, Deserialize)]
struct RawTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(rename = "xml:lang")]
    lang: Option<String>,
    datatype: Option<String>,
}

impl RawTerm {
    fn into_term(self) -> Result<Term> {
        match self.kind.as_str() {
            "uri" => Ok(Term::Uri { value: self.value }),
            // Older Sesame releases emit "typed-literal"
            "literal" | "typed-literal" => Ok(Term::Literal {
                value: self.value,
                lang: self.lang,
                datatype: self.datatype,
            }),
            "bnode" => Ok(Term::BlankNode { value: self.value }),
            other => Err(Error::Serialization(format!(
                "Unknown SPARQL term type: {}",
                other
            ))),
        }
    }
}

/// Result rows of a SELECT query along with the projected variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectResults {
    pub vars: Vec<String>,
    pub rows: Vec<Binding>,
}

/// Parse a SPARQL JSON results document.
pub fn parse_results(body: &str) -> Result<SelectResults> {
    let document: ResultsDocument = serde_json::from_str(body)
        .map_err(|e| Error::Serialization(format!("Failed to parse SPARQL results: {}", e)))?;

    let Some(results) = document.results else {
        return Err(Error::Serialization(
            "SPARQL results document has no bindings".to_string(),
        ));
    };

    let rows = results
        .bindings
        .into_iter()
        .map(|raw| {
            raw.into_iter()
                .map(|(var, term)| Ok((var, term.into_term()?)))
                .collect::<Result<Binding>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SelectResults {
        vars: document.head.vars,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_all_term_kinds() {
        let body = json!({
            "head": { "vars": ["obs", "label", "mean", "period"] },
            "results": { "bindings": [{
                "obs": { "type": "uri", "value": "http://x/obs1" },
                "label": { "type": "literal", "value": "Blei", "xml:lang": "de" },
                "mean": {
                    "type": "typed-literal",
                    "value": "1.23",
                    "datatype": "http://www.w3.org/2001/XMLSchema#decimal"
                },
                "period": { "type": "bnode", "value": "node17" }
            }]}
        })
        .to_string();

        let results = parse_results(&body).unwrap();
        assert_eq!(results.vars, vec!["obs", "label", "mean", "period"]);
        let row = &results.rows[0];
        assert_eq!(row["obs"], Term::uri("http://x/obs1"));
        assert_eq!(row["label"].lang(), Some("de"));
        assert_eq!(row["mean"].as_f64(), Some(1.23));
        assert_eq!(row["period"], Term::blank_node("node17"));
    }

    #[test]
    fn test_unbound_variables_are_absent() {
        let body = json!({
            "head": { "vars": ["obs", "title"] },
            "results": { "bindings": [{ "obs": { "type": "uri", "value": "http://x/obs1" } }] }
        })
        .to_string();

        let results = parse_results(&body).unwrap();
        assert!(!results.rows[0].contains_key("title"));
    }

    #[test]
    fn test_empty_bindings() {
        let body = r#"{"head": {"vars": []}, "results": {"bindings": []}}"#;
        assert!(parse_results(body).unwrap().rows.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_results("<html>").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_boolean_document_is_rejected() {
        let err = parse_results(r#"{"head": {}, "boolean": true}"#).unwrap_err();
        assert!(err.to_string().contains("no bindings"));
    }

    #[test]
    fn test_unknown_term_type() {
        let body = r#"{"head": {"vars": ["x"]}, "results": {"bindings": [{"x": {"type": "triple", "value": "?"}}]}}"#;
        let err = parse_results(body).unwrap_err();
        assert!(err.to_string().contains("Unknown SPARQL term type: triple"));
    }
}
