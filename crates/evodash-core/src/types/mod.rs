//! # Core Type Definitions
//!
//! This module contains the source-side types for the evodash pipeline:
//! - Identifiers (`EntityId`, `FamilyId`) and the aggregate `Score`
//! - Source records (`Entity`, `AttributeRecord`, `EvolutionEdge`)
//! - The loaded `Dataset`
//! - Error types (`EvodashError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Use saturating arithmetic for sums to prevent overflow

use crate::primitives::BASE_STAT_NAMES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Numeric identifier of an entity in the source `entities` relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

/// Identifier of an evolution family (all edges of one chain share it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(pub i64);

impl std::fmt::Display for FamilyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate score of an entity: the sum of its attribute values.
/// Uses i64 with saturating arithmetic to prevent overflow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Score(pub i64);

impl Score {
    /// Create a score with the given value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Add an attribute value using saturating arithmetic.
    #[must_use]
    pub const fn add(self, value: i64) -> Self {
        Self(self.0.saturating_add(value))
    }

    /// Difference to an earlier score (`self - earlier`), saturating.
    #[must_use]
    pub const fn gain_over(self, earlier: Score) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Get the raw score value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// SOURCE RECORDS
// =============================================================================

/// A row of the `entities` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
}

impl Entity {
    /// Create a new entity.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: EntityId(id),
            name: name.into(),
        }
    }
}

/// A row of the `attributes` relation: one named stat of one entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub entity: EntityId,
    pub attribute: String,
    pub value: i64,
}

impl AttributeRecord {
    /// Create a new attribute record.
    #[must_use]
    pub fn new(entity: i64, attribute: impl Into<String>, value: i64) -> Self {
        Self {
            entity: EntityId(entity),
            attribute: attribute.into(),
            value,
        }
    }
}

/// A directed evolution edge between two entity names within a family.
///
/// Both endpoints and the trigger are nullable in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEdge {
    pub family: FamilyId,
    pub from: Option<String>,
    pub to: Option<String>,
    pub trigger: Option<String>,
}

impl EvolutionEdge {
    /// Create an edge with both endpoints present.
    #[must_use]
    pub fn new(
        family: i64,
        from: impl Into<String>,
        to: impl Into<String>,
        trigger: Option<&str>,
    ) -> Self {
        Self {
            family: FamilyId(family),
            from: Some(from.into()),
            to: Some(to.into()),
            trigger: trigger.map(str::to_string),
        }
    }
}

// =============================================================================
// DATASET
// =============================================================================

/// The three source relations, as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub entities: Vec<Entity>,
    pub attributes: Vec<AttributeRecord>,
    pub edges: Vec<EvolutionEdge>,
}

impl Dataset {
    /// Create a dataset from its three relations.
    #[must_use]
    pub fn new(
        entities: Vec<Entity>,
        attributes: Vec<AttributeRecord>,
        edges: Vec<EvolutionEdge>,
    ) -> Self {
        Self {
            entities,
            attributes,
            edges,
        }
    }

    /// Number of distinct family ids referenced by the edges.
    #[must_use]
    pub fn family_count(&self) -> usize {
        self.edges
            .iter()
            .map(|e| e.family)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Attribute names outside the six base stats, sorted and deduplicated.
    #[must_use]
    pub fn unknown_attribute_names(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|r| r.attribute.as_str())
            .filter(|name| !BASE_STAT_NAMES.contains(name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the evodash pipeline.
///
/// Only the load stage and the outer surfaces fail; the transform narrows
/// its result set silently instead.
#[derive(Debug, Error)]
pub enum EvodashError {
    /// The data source cannot be opened or is not a database.
    #[error("Data source unreachable: {0}")]
    SourceUnreachable(String),

    /// A required relation is missing from the data source.
    #[error("Required relation missing from data source: {0}")]
    MissingRelation(String),

    /// Reading a relation failed.
    #[error("Query error: {0}")]
    Query(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl EvodashError {
    /// True for the fatal data-source category (unreachable or missing relation).
    #[must_use]
    pub fn is_data_source_error(&self) -> bool {
        matches!(self, Self::SourceUnreachable(_) | Self::MissingRelation(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_saturating_add() {
        let score = Score::new(i64::MAX);
        assert_eq!(score.add(1).value(), i64::MAX);
    }

    #[test]
    fn score_gain_over() {
        assert_eq!(Score::new(405).gain_over(Score::new(309)), 96);
        assert_eq!(Score::new(300).gain_over(Score::new(305)), -5);
    }

    #[test]
    fn family_count_is_distinct() {
        let dataset = Dataset::new(
            vec![],
            vec![],
            vec![
                EvolutionEdge::new(2, "a", "b", None),
                EvolutionEdge::new(1, "c", "d", None),
                EvolutionEdge::new(2, "b", "e", Some("trade")),
            ],
        );
        assert_eq!(dataset.family_count(), 2);
    }

    #[test]
    fn unknown_attribute_names_sorted() {
        let dataset = Dataset::new(
            vec![],
            vec![
                AttributeRecord::new(1, "hp", 45),
                AttributeRecord::new(1, "luck", 3),
                AttributeRecord::new(2, "accuracy", 1),
                AttributeRecord::new(2, "luck", 9),
            ],
            vec![],
        );
        assert_eq!(dataset.unknown_attribute_names(), vec!["accuracy", "luck"]);
    }

    #[test]
    fn data_source_category() {
        assert!(EvodashError::MissingRelation("pokemon".into()).is_data_source_error());
        assert!(EvodashError::SourceUnreachable("x".into()).is_data_source_error());
        assert!(!EvodashError::Query("x".into()).is_data_source_error());
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&AttributeRecord::new(7, "speed", 80)).expect("serialize");
        assert_eq!(json, r#"{"entity":7,"attribute":"speed","value":80}"#);
    }
}
