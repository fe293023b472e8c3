//! # Fixed Primitives
//!
//! Compile-time constants for the evodash pipeline.
//!
//! These are immutable at runtime. Relation names have configurable
//! overrides (see `loader::SourceSchema`); everything else is fixed.

/// Highest ordinal stage a family member can be assigned.
///
/// Families with more members than this collapse the extra members into
/// the last stage.
pub const MAX_STAGE: u8 = 3;

/// The six base stats that make up an aggregate score.
pub const BASE_STAT_NAMES: [&str; 6] = [
    "hp",
    "attack",
    "defense",
    "special-attack",
    "special-defense",
    "speed",
];

/// Default path of the source database.
pub const DEFAULT_DATABASE: &str = "pokemon_dw.db";

/// Default name of the entities relation (`id`, `name`).
pub const DEFAULT_ENTITIES_RELATION: &str = "pokemon";

/// Default name of the attribute records relation (`pokemon_id`, `stat_name`, `base_stat`).
pub const DEFAULT_ATTRIBUTES_RELATION: &str = "pokemon_stats";

/// Default name of the evolution edges relation
/// (`chain_id`, `from_species`, `to_species`, `trigger`).
pub const DEFAULT_EVOLUTIONS_RELATION: &str = "evolution";

/// Maximum length of a relation name accepted from configuration.
pub const MAX_RELATION_NAME_LENGTH: usize = 64;

/// Fixed-point scale for means and quartiles (thousandths).
pub const FIXED_POINT_SCALE: i64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_base_stats() {
        assert_eq!(BASE_STAT_NAMES.len(), 6);
    }

    #[test]
    fn stage_cap_is_three() {
        assert_eq!(MAX_STAGE, 3);
    }
}
