//! # Transformer
//!
//! Pure data-shaping stage: `Dataset -> FamilyTable`.
//!
//! 1. Sum attribute values per entity into an aggregate [`Score`].
//! 2. Collect family members from both endpoints of every edge.
//! 3. Inner-join members with entities by name, then with scores by id.
//! 4. Stable-sort by (family, score).
//! 5. Assign the capped ordinal [`Stage`] within each family.
//! 6. Compute the score delta to the previous member of the same family.
//!
//! Inner joins narrow the result silently. Every member lost that way is
//! recorded as a [`DroppedMember`] so callers can log it, but it is never
//! an error.

use crate::stage::Stage;
use crate::{AttributeRecord, Dataset, Entity, EntityId, EvolutionEdge, FamilyId, Score};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// OUTPUT TYPES
// =============================================================================

/// A (family, name) pair collected from the evolution edges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FamilyMember {
    pub family: FamilyId,
    pub name: String,
}

/// One surviving (family, member) row of the enriched family table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRow {
    pub family: FamilyId,
    pub entity: EntityId,
    pub name: String,
    pub stage: Stage,
    pub score: Score,
    /// Gain over the previous member of the family; absent for the first.
    pub delta: Option<i64>,
}

/// The Transformer's output table, in canonical (family, score) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTable {
    pub rows: Vec<FamilyRow>,
}

impl FamilyTable {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no member survived the joins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to one family, in stage order.
    pub fn family(&self, family: FamilyId) -> impl Iterator<Item = &FamilyRow> {
        self.rows.iter().filter(move |r| r.family == family)
    }

    /// Rows at a given stage, in table order.
    pub fn at_stage(&self, stage: Stage) -> impl Iterator<Item = &FamilyRow> {
        self.rows.iter().filter(move |r| r.stage == stage)
    }

    /// First row with the given name, if any.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FamilyRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}

/// Why a family member did not make it into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// No entity carries the member's name.
    UnknownName,
    /// The entity exists but has no attribute records.
    NoAttributes,
}

/// A family member lost to an inner join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedMember {
    pub family: FamilyId,
    pub name: String,
    pub reason: DropReason,
}

/// Result of a transform run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    pub table: FamilyTable,
    pub dropped: Vec<DroppedMember>,
}

impl Transformation {
    /// Number of dropped members with the given reason.
    #[must_use]
    pub fn dropped_count(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Run the full transform over a loaded dataset.
#[must_use]
pub fn transform(dataset: &Dataset) -> Transformation {
    let scores = aggregate_scores(&dataset.attributes);
    let members = family_members(&dataset.edges);
    let (mut scored, dropped) = join_members(&members, &dataset.entities, &scores);

    // Stable: ties keep membership order.
    scored.sort_by_key(|m| (m.family, m.score));

    Transformation {
        table: assign_stages(scored),
        dropped,
    }
}

/// Sum attribute values per entity.
///
/// Entities without any record are absent from the map, never zero.
#[must_use]
pub fn aggregate_scores(records: &[AttributeRecord]) -> BTreeMap<EntityId, Score> {
    let mut scores: BTreeMap<EntityId, Score> = BTreeMap::new();
    for record in records {
        let entry = scores.entry(record.entity).or_default();
        *entry = entry.add(record.value);
    }
    scores
}

/// Collect the deduplicated members of every family.
///
/// Order: all `from` endpoints in edge order, then all `to` endpoints in
/// edge order; the first occurrence of a (family, name) pair wins. Null
/// endpoints are skipped.
#[must_use]
pub fn family_members(edges: &[EvolutionEdge]) -> Vec<FamilyMember> {
    let endpoints = edges
        .iter()
        .filter_map(|e| e.from.as_deref().map(|n| (e.family, n)))
        .chain(
            edges
                .iter()
                .filter_map(|e| e.to.as_deref().map(|n| (e.family, n))),
        );

    let mut seen: BTreeSet<(FamilyId, &str)> = BTreeSet::new();
    let mut members = Vec::new();
    for (family, name) in endpoints {
        if seen.insert((family, name)) {
            members.push(FamilyMember {
                family,
                name: name.to_string(),
            });
        }
    }
    members
}

/// A member that survived both joins, before ranking.
#[derive(Debug, Clone)]
struct ScoredMember {
    family: FamilyId,
    entity: EntityId,
    name: String,
    score: Score,
}

fn join_members(
    members: &[FamilyMember],
    entities: &[Entity],
    scores: &BTreeMap<EntityId, Score>,
) -> (Vec<ScoredMember>, Vec<DroppedMember>) {
    // Names are unique in clean data; a repeated name yields one row per id.
    let mut ids_by_name: BTreeMap<&str, Vec<EntityId>> = BTreeMap::new();
    for entity in entities {
        ids_by_name
            .entry(entity.name.as_str())
            .or_default()
            .push(entity.id);
    }

    let mut scored = Vec::with_capacity(members.len());
    let mut dropped = Vec::new();

    for member in members {
        let Some(ids) = ids_by_name.get(member.name.as_str()) else {
            dropped.push(DroppedMember {
                family: member.family,
                name: member.name.clone(),
                reason: DropReason::UnknownName,
            });
            continue;
        };

        let mut matched = false;
        for id in ids {
            if let Some(score) = scores.get(id) {
                matched = true;
                scored.push(ScoredMember {
                    family: member.family,
                    entity: *id,
                    name: member.name.clone(),
                    score: *score,
                });
            }
        }

        if !matched {
            dropped.push(DroppedMember {
                family: member.family,
                name: member.name.clone(),
                reason: DropReason::NoAttributes,
            });
        }
    }

    (scored, dropped)
}

/// Assign stage and delta over rows already sorted by (family, score).
fn assign_stages(sorted: Vec<ScoredMember>) -> FamilyTable {
    let mut rows = Vec::with_capacity(sorted.len());
    let mut previous: Option<(FamilyId, Score)> = None;
    let mut position = 0usize;

    for member in sorted {
        let delta = match previous {
            Some((family, score)) if family == member.family => {
                position = position.saturating_add(1);
                Some(member.score.gain_over(score))
            }
            _ => {
                position = 0;
                None
            }
        };
        previous = Some((member.family, member.score));

        rows.push(FamilyRow {
            family: member.family,
            entity: member.entity,
            name: member.name,
            stage: Stage::from_position(position),
            score: member.score,
            delta,
        });
    }

    FamilyTable { rows }
}

// =============================================================================
// TESTS
// =============================================================================
