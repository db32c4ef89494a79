//! Query-engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the query subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QueryConfig {
    /// Capacity of the compiled component-matcher cache. Default: 64.
    pub component_cache_capacity: Option<u64>,
    /// Page size used by paged queries when the caller passes no limit.
    /// Default: 500.
    pub default_page_size: Option<usize>,
}

impl QueryConfig {
    /// Returns the effective matcher-cache capacity, defaulting to 64.
    pub fn effective_component_cache_capacity(&self) -> u64 {
        self.component_cache_capacity.unwrap_or(64)
    }

    /// Returns the effective default page size, defaulting to 500.
    pub fn effective_default_page_size(&self) -> usize {
        self.default_page_size.unwrap_or(500)
    }
}
