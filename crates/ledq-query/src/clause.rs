//! Graph-pattern fragments for constrained dimensions.
//!
//! Each constrained dimension gets its own variable slot so several
//! dimensions can be joined on the same observation without their concept
//! variables colliding.
//!
//! # Example
//!
//! ```
//! use ledq_query::clause::DimensionClause;
//!
//! let clause = DimensionClause::build("http://data.uba.de/led/location", 0, false, false);
//! assert_eq!(clause.concept_var, "?concept0");
//! assert!(clause.pattern.contains("?obs <http://data.uba.de/led/location> ?concept0 ."));
//! ```

use ledq_core::{iri_ref, FacetConstraints, FacetValue, Vocabulary};

/// Indentation of pattern lines inside a WHERE block.
pub(crate) const INDENT: &str = "    ";

/// Shape of the pattern emitted for a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// The observation points straight at the concept.
    Plain,
    /// The observation points at a period whose start year is the concept.
    Temporal,
    /// The observation points at the concept or any of its narrower concepts.
    Descendants,
}

/// Pattern joining `?obs` to the concept variable of one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionClause {
    pub pattern: String,
    pub concept_var: String,
    pub kind: ClauseKind,
}

impl DimensionClause {
    /// Build the pattern for `dimension` using variable slot `slot`.
    ///
    /// The temporal shape wins over descendant matching.
    pub fn build(dimension: &str, slot: usize, include_descendants: bool, temporal: bool) -> Self {
        let dim = iri_ref(dimension);
        let concept_var = format!("?concept{}", slot);

        let (lines, kind) = if temporal {
            let time_var = format!("?time{}", slot);
            (
                vec![
                    format!("?obs {} {} .", dim, time_var),
                    format!("{} dct:start {} .", time_var, concept_var),
                ],
                ClauseKind::Temporal,
            )
        } else if include_descendants {
            let sub_var = format!("?subConcept{}", slot);
            (
                vec![
                    format!("?obs {} {} .", dim, sub_var),
                    format!("{} skos:narrower* {} .", concept_var, sub_var),
                ],
                ClauseKind::Descendants,
            )
        } else {
            (
                vec![format!("?obs {} {} .", dim, concept_var)],
                ClauseKind::Plain,
            )
        };

        let mut pattern = lines
            .iter()
            .map(|line| format!("{}{}", INDENT, line))
            .collect::<Vec<_>>()
            .join("\n");
        pattern.push('\n');
        pattern.push_str(INDENT);
        pattern.push_str("?obs a qb:Observation .");

        Self {
            pattern,
            concept_var,
            kind,
        }
    }

    /// `FILTER` restricting the concept variable to `values`.
    ///
    /// An empty list yields `IN ()`, which matches nothing.
    pub fn filter(&self, values: &[FacetValue]) -> String {
        let list = values
            .iter()
            .map(FacetValue::to_sparql)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}FILTER({} IN ({}))", INDENT, self.concept_var, list)
    }
}

// =============================================================================
// FACET CLAUSES
// =============================================================================

/// Generates the combined pattern for all constrained dimensions.
pub struct FacetClauseBuilder<'a> {
    constraints: &'a FacetConstraints,
    vocabulary: &'a Vocabulary,
    include_descendants: bool,
    slot_offset: usize,
}

/// Result of building the facet clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetClauses {
    /// Pattern lines, one dimension block after another.
    pub pattern: String,
    /// Slot following the last one used.
    pub next_slot: usize,
    /// Whether any dimension matched through narrower concepts.
    pub uses_descendants: bool,
}

impl<'a> FacetClauseBuilder<'a> {
    /// # Parameters
    ///
    /// * `constraints` - Selected values per dimension
    /// * `vocabulary` - Identifies the temporal dimension
    /// * `slot_offset` - First variable slot to use
    pub fn new(
        constraints: &'a FacetConstraints,
        vocabulary: &'a Vocabulary,
        slot_offset: usize,
    ) -> Self {
        Self {
            constraints,
            vocabulary,
            include_descendants: false,
            slot_offset,
        }
    }

    pub fn with_descendants(mut self, include_descendants: bool) -> Self {
        self.include_descendants = include_descendants;
        self
    }

    pub fn build(&self) -> FacetClauses {
        let mut blocks = Vec::with_capacity(self.constraints.len());
        let mut slot = self.slot_offset;
        let mut uses_descendants = false;

        // Dimensions iterate in sorted order, so slots are stable for equal input
        for (dimension, values) in self.constraints.iter() {
            let clause = DimensionClause::build(
                dimension,
                slot,
                self.include_descendants,
                self.vocabulary.is_temporal(dimension),
            );
            uses_descendants |= clause.kind == ClauseKind::Descendants;
            blocks.push(format!("{}\n{}", clause.pattern, clause.filter(values)));
            slot += 1;
        }

        FacetClauses {
            pattern: blocks.join("\n"),
            next_slot: slot,
            uses_descendants,
        }
    }
}
