//! Queries for the source_components table.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StoreError;
use vigil_core::types::SourceComponent;

use super::sqlite_err;

/// A component plus its row id. The id changes whenever a component is
/// removed and re-added, which is what lets compiled-matcher caches key on
/// it and never serve a stale pattern list.
#[derive(Debug, Clone)]
pub struct ComponentRow {
    pub id: i64,
    pub component: SourceComponent,
}

pub fn insert(
    conn: &Connection,
    name: &str,
    patterns: &[String],
    description: Option<&str>,
    now: i64,
) -> Result<i64, StoreError> {
    let patterns_json =
        serde_json::to_string(patterns).map_err(|e| StoreError::SerializationError {
            message: format!("component patterns: {e}"),
        })?;
    conn.execute(
        "INSERT INTO source_components (name, patterns_json, description, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![name, patterns_json, description, now],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, name: &str) -> Result<Option<ComponentRow>, StoreError> {
    let raw = conn
        .prepare_cached(
            "SELECT id, name, patterns_json, description, created_at
             FROM source_components WHERE name = ?1",
        )
        .map_err(sqlite_err)?
        .query_row(params![name], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })
        .optional()
        .map_err(sqlite_err)?;

    raw.map(|(id, name, patterns_json, description, created_at)| {
        let patterns: Vec<String> =
            serde_json::from_str(&patterns_json).map_err(|e| StoreError::SerializationError {
                message: format!("patterns for component '{name}': {e}"),
            })?;
        Ok(ComponentRow {
            id,
            component: SourceComponent {
                name,
                patterns,
                description,
                created_at,
            },
        })
    })
    .transpose()
}

/// All components, ordered by name.
pub fn list(conn: &Connection) -> Result<Vec<SourceComponent>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT name, patterns_json, description, created_at
             FROM source_components ORDER BY name",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .map_err(sqlite_err)?;
    let raw = rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)?;
    raw.into_iter()
        .map(|(name, patterns_json, description, created_at)| {
            let patterns: Vec<String> = serde_json::from_str(&patterns_json).map_err(|e| {
                StoreError::SerializationError {
                    message: format!("patterns for component '{name}': {e}"),
                }
            })?;
            Ok(SourceComponent {
                name,
                patterns,
                description,
                created_at,
            })
        })
        .collect()
}

pub fn delete(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let rows = conn
        .execute("DELETE FROM source_components WHERE name = ?1", params![name])
        .map_err(sqlite_err)?;
    Ok(rows > 0)
}
