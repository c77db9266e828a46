//! Mock SPARQL executor for deterministic testing.
//!
//! Answers queries with canned rows chosen by a marker substring of the
//! query text and records every call for assertions.
//!
//! ## Usage
//!
//! ```rust
//! use ledq_core::{Binding, Term};
//! use ledq_query::mock::MockExecutor;
//!
//! let mut row = Binding::new();
//! row.insert("obsCount".into(), Term::literal("3"));
//! let executor = MockExecutor::new().with_response("COUNT(DISTINCT ?obs)", vec![row]);
//! assert_eq!(executor.call_count(), 0);
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use ledq_core::{Binding, Error, Result, SparqlExecutor};

/// Mock executor for testing.
#[derive(Clone, Default)]
pub struct MockExecutor {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    responses: Vec<(String, Vec<Binding>)>,
    default_rows: Vec<Binding>,
    failure: Option<(u16, String)>,
}

/// One recorded `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub query: String,
    pub infer: bool,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries containing `marker` with `rows`. Earlier markers win.
    pub fn with_response(mut self, marker: impl Into<String>, rows: Vec<Binding>) -> Self {
        Arc::make_mut(&mut self.config)
            .responses
            .push((marker.into(), rows));
        self
    }

    /// Rows for queries no marker matches.
    pub fn with_default_rows(mut self, rows: Vec<Binding>) -> Self {
        Arc::make_mut(&mut self.config).default_rows = rows;
        self
    }

    /// Fail every call as if the endpoint answered with `status`.
    pub fn with_failure(mut self, status: u16, body: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some((status, body.into()));
        self
    }

    fn log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        // Poisoned by a panicking test: keep the log
        self.call_log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All logged calls, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    pub fn clear_calls(&self) {
        self.log().clear()
    }
}

#[async_trait]
impl SparqlExecutor for MockExecutor {
    async fn execute(&self, query: &str, infer: bool) -> Result<Vec<Binding>> {
        self.log().push(MockCall {
            query: query.to_string(),
            infer,
        });

        if let Some((status, body)) = &self.config.failure {
            return Err(Error::Endpoint {
                status: *status,
                body: body.clone(),
            });
        }

        let rows = self
            .config
            .responses
            .iter()
            .find(|(marker, _)| query.contains(marker.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_else(|| self.config.default_rows.clone());
        Ok(rows)
    }
}
