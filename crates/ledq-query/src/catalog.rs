//! Catalog operations over a graph store.
//!
//! [`Catalog`] ties the pieces together: it assembles a query for the
//! caller's facet selection, runs it through a [`SparqlExecutor`] and folds
//! the rows into domain records.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use ledq_core::defaults::SLOW_QUERY_MS;
use ledq_core::{
    AttributeValue, Binding, ConceptListing, ConceptOptions, Error, FacetConstraints, Labels,
    Observation, Result, SourceCounts, SparqlExecutor, Vocabulary,
};
use tracing::{debug, info, instrument, warn};

use crate::assembler::{self, FacetQueryBuilder, SparqlQuery};
use crate::hierarchy::resolve_hierarchy;
use crate::mapper::{self, MapperOptions};

/// Faceted access to an observation catalog.
pub struct Catalog<E: SparqlExecutor> {
    executor: E,
    vocabulary: Vocabulary,
    mapper_options: MapperOptions,
}

impl<E: SparqlExecutor> Catalog<E> {
    /// Create a catalog with the default vocabulary.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            vocabulary: Vocabulary::default(),
            mapper_options: MapperOptions::default(),
        }
    }

    /// Create a catalog whose mapper options come from the environment.
    pub fn from_env(executor: E) -> Self {
        Self::new(executor).with_mapper_options(MapperOptions::from_env())
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn with_mapper_options(mut self, options: MapperOptions) -> Self {
        self.mapper_options = options;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    async fn run(&self, query: &SparqlQuery) -> Result<Vec<Binding>> {
        let start = Instant::now();
        debug!(
            query_len = query.text.len(),
            infer = query.infer,
            "Executing catalog query"
        );

        let rows = self.executor.execute(&query.text, query.infer).await?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            row_count = rows.len(),
            duration_ms = elapsed,
            "Catalog query complete"
        );
        if elapsed > SLOW_QUERY_MS {
            warn!(
                duration_ms = elapsed,
                query_len = query.text.len(),
                slow = true,
                "Slow catalog query"
            );
        }
        Ok(rows)
    }

    fn facet_query<'a>(
        &'a self,
        constraints: &'a FacetConstraints,
        include_descendants: bool,
    ) -> FacetQueryBuilder<'a> {
        FacetQueryBuilder::new(constraints, &self.vocabulary).with_descendants(include_descendants)
    }

    /// Observations matching every constrained dimension, keyed by URI.
    #[instrument(skip(self, constraints), fields(subsystem = "query", component = "catalog", op = "determine_observations", facet_count = constraints.len()))]
    pub async fn determine_observations(
        &self,
        constraints: &FacetConstraints,
        include_descendants: bool,
    ) -> Result<BTreeMap<String, Observation>> {
        let query = self
            .facet_query(constraints, include_descendants)
            .observations();
        let rows = self.run(&query).await?;
        let observations = mapper::fold_observations(&rows, &self.mapper_options);
        info!(
            result_count = observations.len(),
            row_count = rows.len(),
            "Determined observations"
        );
        Ok(observations)
    }

    /// Number of distinct matching observations.
    #[instrument(skip(self, constraints), fields(subsystem = "query", component = "catalog", op = "observations_count", facet_count = constraints.len()))]
    pub async fn observations_count(
        &self,
        constraints: &FacetConstraints,
        include_descendants: bool,
    ) -> Result<u64> {
        let query = self
            .facet_query(constraints, include_descendants)
            .observations_count();
        let rows = self.run(&query).await?;
        Ok(mapper::fold_count(&rows))
    }

    /// Matching observations counted per data source.
    #[instrument(skip(self, constraints), fields(subsystem = "query", component = "catalog", op = "observations_count_by_source", facet_count = constraints.len()))]
    pub async fn observations_count_by_source(
        &self,
        constraints: &FacetConstraints,
        include_descendants: bool,
    ) -> Result<SourceCounts> {
        let query = self
            .facet_query(constraints, include_descendants)
            .observations_count_by_source();
        let rows = self.run(&query).await?;
        let counts = mapper::fold_source_counts(&rows);
        info!(
            result_count = counts.by_source.len(),
            "Determined observation counts by source"
        );
        Ok(counts)
    }

    /// Concepts of `dimensions` co-occurring with the selected concepts of
    /// other dimensions.
    ///
    /// The observation count and hierarchy are only computed when the
    /// options ask for them. The count query runs concurrently with the
    /// listing.
    #[instrument(skip(self, dimensions, constraints), fields(subsystem = "query", component = "catalog", op = "determine_concepts", facet_count = constraints.len()))]
    pub async fn determine_concepts(
        &self,
        dimensions: &[&str],
        constraints: &FacetConstraints,
        options: ConceptOptions,
    ) -> Result<ConceptListing> {
        if dimensions.is_empty() {
            return Err(Error::InvalidInput(
                "at least one dimension is required".to_string(),
            ));
        }
        if dimensions.iter().any(|d| d.trim().is_empty()) {
            return Err(Error::InvalidInput("empty dimension identifier".to_string()));
        }

        let builder = self
            .facet_query(constraints, options.include_descendants)
            .with_forced_inference(options.infer);
        let listing = builder.concepts(dimensions, options.include_hierarchy);

        let (rows, observation_count) = if options.include_observations_count {
            let count_query = builder.concepts_count(dimensions);
            let (rows, count_rows) = tokio::try_join!(self.run(&listing), self.run(&count_query))?;
            (rows, Some(mapper::fold_count(&count_rows)))
        } else {
            (self.run(&listing).await?, None)
        };

        let (concepts, entries) = mapper::fold_concepts(&rows, options.include_hierarchy);
        let hierarchy = options
            .include_hierarchy
            .then(|| resolve_hierarchy(&entries));

        info!(
            result_count = concepts.values().map(|c| c.len()).sum::<usize>(),
            hierarchy_entries = entries.len(),
            "Determined concepts"
        );
        Ok(ConceptListing {
            concepts,
            observation_count,
            hierarchy,
        })
    }

    /// Declared dimension properties with their labels.
    #[instrument(skip(self), fields(subsystem = "query", component = "catalog", op = "determine_dimensions"))]
    pub async fn determine_dimensions(&self) -> Result<BTreeMap<String, Labels>> {
        let rows = self.run(&assembler::dimensions()).await?;
        Ok(mapper::fold_labels(&rows, "dim", "label"))
    }

    /// Labels by language for arbitrary resources.
    #[instrument(skip(self, uris), fields(subsystem = "query", component = "catalog", op = "resource_labels", input_count = uris.len()))]
    pub async fn resource_labels<S: AsRef<str> + Sync>(
        &self,
        uris: &[S],
    ) -> Result<BTreeMap<String, Labels>> {
        if uris.is_empty() {
            return Ok(BTreeMap::new());
        }
        let rows = self.run(&assembler::resource_labels(uris)).await?;
        Ok(mapper::fold_labels(&rows, "resource", "label"))
    }

    /// Every predicate of `uri` with its objects.
    #[instrument(skip(self), fields(subsystem = "query", component = "catalog", op = "resource_details"))]
    pub async fn resource_details(
        &self,
        uri: &str,
    ) -> Result<BTreeMap<String, BTreeSet<AttributeValue>>> {
        if uri.trim().is_empty() {
            return Err(Error::InvalidInput("empty resource identifier".to_string()));
        }
        let rows = self.run(&assembler::resource_details(uri)).await?;
        Ok(mapper::fold_details(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockExecutor;
    use ledq_core::Term;

    fn row(pairs: &[(&str, Term)]) -> Binding {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_observations_count_reads_count() {
        let executor = MockExecutor::new()
            .with_response("COUNT(DISTINCT ?obs)", vec![row(&[("obsCount", Term::literal("4"))])]);
        let catalog = Catalog::new(executor);
        let count = catalog
            .observations_count(&FacetConstraints::new(), false)
            .await
            .unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_determine_concepts_rejects_empty_dimensions() {
        let catalog = Catalog::new(MockExecutor::new());
        let err = catalog
            .determine_concepts(&[], &FacetConstraints::new(), ConceptOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(catalog.executor().call_count(), 0);
    }

    #[tokio::test]
    async fn test_determine_concepts_runs_count_only_when_asked() {
        let catalog = Catalog::new(MockExecutor::new());
        let dims = ["http://data.uba.de/led/location"];

        let listing = catalog
            .determine_concepts(&dims, &FacetConstraints::new(), ConceptOptions::default())
            .await
            .unwrap();
        assert!(listing.observation_count.is_none());
        assert!(listing.hierarchy.is_none());
        assert_eq!(catalog.executor().call_count(), 1);

        let options = ConceptOptions {
            include_observations_count: true,
            ..Default::default()
        };
        let listing = catalog
            .determine_concepts(&dims, &FacetConstraints::new(), options)
            .await
            .unwrap();
        assert_eq!(listing.observation_count, Some(0));
        assert_eq!(catalog.executor().call_count(), 3);
    }

    #[tokio::test]
    async fn test_forced_inference_reaches_executor() {
        let catalog = Catalog::new(MockExecutor::new());
        let options = ConceptOptions {
            infer: true,
            ..Default::default()
        };
        catalog
            .determine_concepts(&["http://x/location"], &FacetConstraints::new(), options)
            .await
            .unwrap();
        assert!(catalog.executor().calls()[0].infer);
    }

    #[tokio::test]
    async fn test_resource_labels_without_uris_skips_store() {
        let catalog = Catalog::new(MockExecutor::new());
        let labels = catalog.resource_labels::<&str>(&[]).await.unwrap();
        assert!(labels.is_empty());
        assert_eq!(catalog.executor().call_count(), 0);
    }

    #[tokio::test]
    async fn test_resource_details_rejects_empty_uri() {
        let catalog = Catalog::new(MockExecutor::new());
        let err = catalog.resource_details("  ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let catalog = Catalog::new(MockExecutor::new().with_failure(503, "unavailable"));
        let err = catalog.determine_dimensions().await.unwrap_err();
        assert_eq!(err.to_string(), "Endpoint returned 503: unavailable");
    }
}
