//! Keyset pagination over query results. No OFFSET: pages are addressed
//! by the (file, line, id) key of the last row served.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use vigil_core::errors::QueryError;
use vigil_core::types::{Report, SnapshotId};

use crate::engine::QueryEngine;
use crate::filter::FilterSpec;

/// One page of filtered rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub reports: Vec<Report>,
    /// Rows the filter matches in the whole snapshot, across all pages.
    pub total: usize,
    /// Opaque cursor for the next page; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// The decoded form of a page cursor: the sort key of the last row served.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Cursor {
    file: String,
    line: u32,
    id: i64,
}

impl Cursor {
    fn after(report: &Report) -> Self {
        Self {
            file: report.file_path.clone(),
            line: report.line,
            id: report.id,
        }
    }

    /// Encode as base64 JSON, opaque to callers.
    fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        STANDARD.encode(json)
    }

    fn decode(encoded: &str) -> Option<Self> {
        let bytes = STANDARD.decode(encoded).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Whether `report` sorts strictly after this cursor position.
    fn precedes(&self, report: &Report) -> bool {
        (self.file.as_str(), self.line, self.id)
            < (report.file_path.as_str(), report.line, report.id)
    }
}

impl QueryEngine<'_> {
    /// One page of query results in the engine's (file, line, id) order.
    ///
    /// `cursor` is the `next_cursor` of the previous page; `None` starts
    /// from the beginning. A `limit` of `None` uses the configured default
    /// page size; an explicit limit of zero is `InvalidFilter`, as is a
    /// cursor that does not decode. Rows are addressed by key, never by
    /// offset, so a page stays stable when rows before it disappear
    /// between calls.
    pub fn query_paged(
        &self,
        snapshot: SnapshotId,
        spec: &FilterSpec,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<Page, QueryError> {
        let limit = match limit {
            Some(0) => {
                return Err(QueryError::InvalidFilter {
                    message: "page limit must be at least 1".to_string(),
                })
            }
            Some(n) => n,
            None => self.store().config().query.effective_default_page_size(),
        };
        let after = match cursor {
            Some(raw) => Some(Cursor::decode(raw).ok_or_else(|| QueryError::InvalidFilter {
                message: "malformed pagination cursor".to_string(),
            })?),
            None => None,
        };

        let rows = self.query(snapshot, spec)?;
        let total = rows.len();
        let mut reports: Vec<Report> = Vec::new();
        let mut next_cursor = None;
        for report in rows {
            if let Some(cursor) = &after {
                if !cursor.precedes(&report) {
                    continue;
                }
            }
            if reports.len() == limit {
                // One row past the limit proves another page exists.
                next_cursor = reports.last().map(|last| Cursor::after(last).encode());
                break;
            }
            reports.push(report);
        }

        Ok(Page {
            reports,
            total,
            next_cursor,
        })
    }
}
