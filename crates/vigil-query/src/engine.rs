//! The query engine: snapshot fetch plus filter evaluation.

use tracing::debug;

use vigil_core::errors::{QueryError, StoreError};
use vigil_core::types::{Report, SnapshotId};
use vigil_store::ReportStore;

use crate::component::ComponentResolver;
use crate::filter::{CompiledFilter, FilterSpec};

/// Read-side entry point over one open store.
///
/// The engine borrows the store and owns only the compiled
/// component-matcher cache. Reads go through the store's read pool, so
/// they never block ingestion and never observe a half-committed head.
pub struct QueryEngine<'a> {
    store: &'a ReportStore,
    components: ComponentResolver,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a ReportStore) -> Self {
        let capacity = store.config().query.effective_component_cache_capacity();
        Self {
            store,
            components: ComponentResolver::new(capacity),
        }
    }

    /// Evaluates `spec` against one snapshot.
    ///
    /// Rows come back in (file, line, id) order, so a fixed snapshot and
    /// filter always produce the same sequence.
    pub fn query(
        &self,
        snapshot: SnapshotId,
        spec: &FilterSpec,
    ) -> Result<QueryResults, QueryError> {
        let filter = self.compile(spec)?;
        let rows = self.fetch_snapshot(snapshot)?;
        let total = rows.len();
        let kept = filter.apply(rows);
        debug!(snapshot = %snapshot, total, kept = kept.len(), "query evaluated");
        Ok(QueryResults {
            inner: kept.into_iter(),
        })
    }

    pub(crate) fn store(&self) -> &ReportStore {
        self.store
    }

    pub(crate) fn compile(&self, spec: &FilterSpec) -> Result<CompiledFilter, QueryError> {
        let component = match &spec.component {
            Some(name) => Some(self.components.resolve(self.store, name)?),
            None => None,
        };
        CompiledFilter::new(spec, component)
    }

    pub(crate) fn fetch_snapshot(&self, snapshot: SnapshotId) -> Result<Vec<Report>, QueryError> {
        match self.store.get_snapshot(snapshot) {
            Ok(rows) => Ok(rows),
            Err(StoreError::RunNotFound { .. } | StoreError::TagNotFound { .. }) => {
                Err(QueryError::SnapshotNotFound {
                    snapshot: snapshot.to_string(),
                })
            }
            Err(e) => Err(QueryError::Store(e)),
        }
    }
}

/// Filtered rows of one snapshot, yielded in (file, line, id) order.
///
/// The sequence is materialized up front; dropping the iterator abandons
/// the rest with nothing to clean up.
#[derive(Debug)]
pub struct QueryResults {
    inner: std::vec::IntoIter<Report>,
}

impl Iterator for QueryResults {
    type Item = Report;

    fn next(&mut self) -> Option<Report> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for QueryResults {}
