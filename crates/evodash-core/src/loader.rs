//! # Loader
//!
//! Reads the three source relations from a SQLite database into a
//! [`Dataset`].
//!
//! - The database is opened read-only; a missing file is never created.
//! - Every relation is probed before it is read, so a missing relation is
//!   reported by name instead of as a generic SQL error.
//! - Attribute records are read with `SELECT DISTINCT`: exact duplicate
//!   rows in a dirty source do not double-count in the aggregate score.
//! - Rows with a NULL id, entity or family key are skipped. Stat values may
//!   be INTEGER or REAL (truncated); anything else is a query error.
//! - The connection is released before returning on every path: closed
//!   explicitly on success, dropped on error.

use crate::primitives::{
    DEFAULT_ATTRIBUTES_RELATION, DEFAULT_ENTITIES_RELATION, DEFAULT_EVOLUTIONS_RELATION,
    MAX_RELATION_NAME_LENGTH,
};
use crate::{AttributeRecord, Dataset, Entity, EntityId, EvodashError, EvolutionEdge, FamilyId};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// SOURCE SCHEMA
// =============================================================================

/// Names of the three source relations.
///
/// Column names are fixed; only the relation names can be overridden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSchema {
    /// Entities relation: `id`, `name`.
    pub entities: String,
    /// Attribute records relation: `pokemon_id`, `stat_name`, `base_stat`.
    pub attributes: String,
    /// Evolution edges relation: `chain_id`, `from_species`, `to_species`, `trigger`.
    pub evolutions: String,
}

impl Default for SourceSchema {
    fn default() -> Self {
        Self {
            entities: DEFAULT_ENTITIES_RELATION.to_string(),
            attributes: DEFAULT_ATTRIBUTES_RELATION.to_string(),
            evolutions: DEFAULT_EVOLUTIONS_RELATION.to_string(),
        }
    }
}

impl SourceSchema {
    /// The three relation names in load order.
    #[must_use]
    pub fn relations(&self) -> [&str; 3] {
        [&self.entities, &self.attributes, &self.evolutions]
    }

    /// Reject relation names that are not plain SQL identifiers.
    ///
    /// Relation names are interpolated into queries, so anything beyond
    /// `[A-Za-z_][A-Za-z0-9_]*` is refused.
    pub fn validate(&self) -> Result<(), EvodashError> {
        for name in self.relations() {
            if !is_plain_identifier(name) {
                return Err(EvodashError::Config(format!(
                    "invalid relation name '{}': expected [A-Za-z_][A-Za-z0-9_]* of at most {} characters",
                    name, MAX_RELATION_NAME_LENGTH
                )));
            }
        }
        Ok(())
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_RELATION_NAME_LENGTH
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// =============================================================================
// LOAD
// =============================================================================

/// Load the three relations from the SQLite database at `path`.
pub fn load_dataset(path: &Path, schema: &SourceSchema) -> Result<Dataset, EvodashError> {
    schema.validate()?;

    let conn = open_read_only(path)?;
    let dataset = read_dataset(&conn, schema)?;

    conn.close().map_err(|(_, e)| {
        EvodashError::SourceUnreachable(format!("closing '{}': {}", path.display(), e))
    })?;

    Ok(dataset)
}

fn open_read_only(path: &Path) -> Result<Connection, EvodashError> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| EvodashError::SourceUnreachable(format!("'{}': {}", path.display(), e)))
}

fn read_dataset(conn: &Connection, schema: &SourceSchema) -> Result<Dataset, EvodashError> {
    for relation in schema.relations() {
        ensure_relation(conn, relation)?;
    }

    Ok(Dataset::new(
        read_entities(conn, &schema.entities)?,
        read_attributes(conn, &schema.attributes)?,
        read_edges(conn, &schema.evolutions)?,
    ))
}

/// Fail with `MissingRelation` unless `relation` is a table or view.
///
/// This is also the first statement executed against the file, so a file
/// that is not a SQLite database surfaces here as `SourceUnreachable`.
fn ensure_relation(conn: &Connection, relation: &str) -> Result<(), EvodashError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
            [relation],
            |row| row.get(0),
        )
        .map_err(|e| EvodashError::SourceUnreachable(e.to_string()))?;

    if count == 0 {
        return Err(EvodashError::MissingRelation(relation.to_string()));
    }
    Ok(())
}

fn read_entities(conn: &Connection, relation: &str) -> Result<Vec<Entity>, EvodashError> {
    let sql = format!("SELECT id, name FROM \"{relation}\"");
    let mut stmt = conn.prepare(&sql).map_err(|e| query_err(relation, e))?;

    let rows = stmt
        .query_map([], |row| {
            let id: Value = row.get(0)?;
            let name: Option<String> = row.get(1)?;
            Ok((id, name))
        })
        .map_err(|e| query_err(relation, e))?;

    let mut entities = Vec::new();
    for row in rows {
        let (id, name) = row.map_err(|e| query_err(relation, e))?;
        // A nameless or id-less entity can never join a family member.
        if let (Some(id), Some(name)) = (integer_key(relation, "id", id)?, name) {
            entities.push(Entity {
                id: EntityId(id),
                name,
            });
        }
    }
    Ok(entities)
}

fn read_attributes(
    conn: &Connection,
    relation: &str,
) -> Result<Vec<AttributeRecord>, EvodashError> {
    let sql = format!("SELECT DISTINCT pokemon_id, stat_name, base_stat FROM \"{relation}\"");
    let mut stmt = conn.prepare(&sql).map_err(|e| query_err(relation, e))?;

    let rows = stmt
        .query_map([], |row| {
            let entity: Value = row.get(0)?;
            let attribute: Option<String> = row.get(1)?;
            let value: Value = row.get(2)?;
            Ok((entity, attribute, value))
        })
        .map_err(|e| query_err(relation, e))?;

    let mut records = Vec::new();
    for row in rows {
        let (entity, attribute, value) = row.map_err(|e| query_err(relation, e))?;
        // A record without an entity belongs to no one.
        let Some(entity) = integer_key(relation, "pokemon_id", entity)? else {
            continue;
        };
        records.push(AttributeRecord {
            entity: EntityId(entity),
            attribute: attribute.unwrap_or_default(),
            value: stat_value(relation, value)?,
        });
    }
    Ok(records)
}

fn read_edges(conn: &Connection, relation: &str) -> Result<Vec<EvolutionEdge>, EvodashError> {
    let sql = format!("SELECT chain_id, from_species, to_species, trigger FROM \"{relation}\"");
    let mut stmt = conn.prepare(&sql).map_err(|e| query_err(relation, e))?;

    let rows = stmt
        .query_map([], |row| {
            let family: Value = row.get(0)?;
            let from: Option<String> = row.get(1)?;
            let to: Option<String> = row.get(2)?;
            let trigger: Option<String> = row.get(3)?;
            Ok((family, from, to, trigger))
        })
        .map_err(|e| query_err(relation, e))?;

    let mut edges = Vec::new();
    for row in rows {
        let (family, from, to, trigger) = row.map_err(|e| query_err(relation, e))?;
        // An edge outside any family has no members.
        let Some(family) = integer_key(relation, "chain_id", family)? else {
            continue;
        };
        edges.push(EvolutionEdge {
            family: FamilyId(family),
            from,
            to,
            trigger,
        });
    }
    Ok(edges)
}

// =============================================================================
// VALUE DECODING
// =============================================================================

/// Decode an id column. NULL is `None`; a REAL is accepted when it holds a
/// whole number (float-typed id columns come out of dataframe exports).
fn integer_key(relation: &str, column: &str, value: Value) -> Result<Option<i64>, EvodashError> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(v) => Ok(Some(v)),
        Value::Real(r) if r.is_finite() && r.fract() == 0.0 => Ok(Some(r as i64)),
        other => Err(EvodashError::Query(format!(
            "{}: {} is not an integer id: {:?}",
            relation, column, other
        ))),
    }
}

/// Decode a stat value. NULL counts as 0; a REAL is truncated toward zero.
fn stat_value(relation: &str, value: Value) -> Result<i64, EvodashError> {
    match value {
        Value::Null => Ok(0),
        Value::Integer(v) => Ok(v),
        Value::Real(r) if r.is_finite() => Ok(r as i64),
        other => Err(EvodashError::Query(format!(
            "{}: base_stat is not numeric: {:?}",
            relation, other
        ))),
    }
}

fn query_err(relation: &str, e: rusqlite::Error) -> EvodashError {
    EvodashError::Query(format!("{}: {}", relation, e))
}

// =============================================================================
// TESTS
// =============================================================================
