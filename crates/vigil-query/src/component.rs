//! Source components as compiled path predicates.
//!
//! A component is an ordered list of signed globs (`+glob` includes,
//! `-glob` excludes, a bare glob includes). The first pattern matching a
//! path decides; a path matching nothing is excluded.

use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use moka::sync::Cache;

use vigil_core::errors::{QueryError, StoreError};
use vigil_core::types::SourceComponent;
use vigil_store::ReportStore;

/// A component's glob list compiled into one `GlobSet` plus the sign of
/// each pattern index.
#[derive(Debug)]
pub struct ComponentMatcher {
    set: GlobSet,
    includes: Vec<bool>,
}

impl ComponentMatcher {
    pub fn compile(component: &SourceComponent) -> Result<Self, QueryError> {
        if component.patterns.is_empty() {
            return Err(invalid(&component.name, "no patterns"));
        }
        let mut builder = GlobSetBuilder::new();
        let mut includes = Vec::with_capacity(component.patterns.len());
        for pattern in &component.patterns {
            let (include, body) = match pattern.strip_prefix('+') {
                Some(rest) => (true, rest),
                None => match pattern.strip_prefix('-') {
                    Some(rest) => (false, rest),
                    None => (true, pattern.as_str()),
                },
            };
            if body.is_empty() {
                return Err(invalid(
                    &component.name,
                    &format!("empty pattern {pattern:?}"),
                ));
            }
            let glob = Glob::new(body).map_err(|e| {
                invalid(&component.name, &format!("bad glob {pattern:?}: {e}"))
            })?;
            builder.add(glob);
            includes.push(include);
        }
        let set = builder
            .build()
            .map_err(|e| invalid(&component.name, &e.to_string()))?;
        Ok(Self { set, includes })
    }

    pub fn matches(&self, file_path: &str) -> bool {
        // GlobSet::matches yields pattern indices in ascending order; the
        // first matching pattern decides.
        match self.set.matches(file_path).first() {
            Some(&idx) => self.includes[idx],
            None => false,
        }
    }
}

/// Looks up components by name and caches their compiled matchers.
///
/// The cache key is the component's row id, which changes whenever a name
/// is removed and re-added, so a redefined component can never be served a
/// stale matcher. Entries for dead ids age out by capacity.
pub(crate) struct ComponentResolver {
    cache: Cache<i64, Arc<ComponentMatcher>>,
}

impl ComponentResolver {
    pub(crate) fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub(crate) fn resolve(
        &self,
        store: &ReportStore,
        name: &str,
    ) -> Result<Arc<ComponentMatcher>, QueryError> {
        let Some(row) = store.component(name)? else {
            return Err(QueryError::Store(StoreError::ComponentNotFound {
                name: name.to_string(),
            }));
        };
        if let Some(matcher) = self.cache.get(&row.id) {
            return Ok(matcher);
        }
        let matcher = Arc::new(ComponentMatcher::compile(&row.component)?);
        self.cache.insert(row.id, Arc::clone(&matcher));
        Ok(matcher)
    }
}

fn invalid(component: &str, detail: &str) -> QueryError {
    QueryError::InvalidFilter {
        message: format!("component {component}: {detail}"),
    }
}
