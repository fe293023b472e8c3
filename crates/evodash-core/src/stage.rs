//! # Evolutionary Stage
//!
//! Ordinal position of a member within its family, by ascending aggregate
//! score.
//!
//! ## Stage Definitions
//!
//! | Stage | Name | Position in family | Transition it ends |
//! |-------|------|--------------------|--------------------|
//! | 1 | Base Stage | first | none |
//! | 2 | Stage 2 | second | Base → 1st Evolution |
//! | 3 | Stage 3 | third and beyond | 1st → 2nd Evolution |
//!
//! ## Cap
//!
//! Positions past the third (mega forms, branching chains) collapse into
//! stage 3 so every row lands in one of the three buckets.

use crate::primitives::MAX_STAGE;
use serde::{Deserialize, Serialize};

// =============================================================================
// STAGE ENUM
// =============================================================================

/// Evolutionary stage within a family. Serialized as its number (1, 2, 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Stage {
    /// Stage 1: the weakest member of the family.
    Base,
    /// Stage 2: first evolution.
    Second,
    /// Stage 3: second evolution and every member past it.
    Third,
}

impl Stage {
    /// All stages in ascending order.
    pub const ALL: [Stage; 3] = [Stage::Base, Stage::Second, Stage::Third];

    /// Stage of the member at 0-based `position` in its family's sorted order.
    #[must_use]
    pub fn from_position(position: usize) -> Self {
        match position {
            0 => Stage::Base,
            1 => Stage::Second,
            _ => Stage::Third,
        }
    }

    /// 1-based stage number.
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            Stage::Base => 1,
            Stage::Second => 2,
            Stage::Third => MAX_STAGE,
        }
    }

    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Base => "Base Stage",
            Stage::Second => "Stage 2",
            Stage::Third => "Stage 3",
        }
    }

    /// Label of the evolution transition that ends at this stage.
    #[must_use]
    pub fn transition(&self) -> Option<&'static str> {
        match self {
            Stage::Base => None,
            Stage::Second => Some("Base → 1st Evolution"),
            Stage::Third => Some("1st → 2nd Evolution"),
        }
    }

    /// Longer label used to group deltas in the distribution plot.
    #[must_use]
    pub fn evolution_kind(&self) -> Option<&'static str> {
        match self {
            Stage::Base => None,
            Stage::Second => Some("1st Evolution (Base → Stage 2)"),
            Stage::Third => Some("2nd Evolution (Stage 2 → Stage 3)"),
        }
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Base => Some(Stage::Second),
            Stage::Second => Some(Stage::Third),
            Stage::Third => None,
        }
    }

    /// Get the previous stage, if any.
    #[must_use]
    pub fn previous(&self) -> Option<Stage> {
        match self {
            Stage::Base => None,
            Stage::Second => Some(Stage::Base),
            Stage::Third => Some(Stage::Second),
        }
    }

    /// Check if this stage is terminal (stage 3).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Third)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.number(), f)
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.number()
    }
}

impl TryFrom<u8> for Stage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Stage::Base),
            2 => Ok(Stage::Second),
            3 => Ok(Stage::Third),
            other => Err(format!("stage must be 1..={}, got {}", MAX_STAGE, other)),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
