//! # evodash-core
//!
//! The deterministic reporting engine for evodash - THE LOGIC.
//!
//! Answers one question about a creature dataset: how much raw power does a
//! creature gain when it evolves, and does the gain differ between the first
//! and the second evolution?
//!
//! ## Pipeline
//!
//! ```text
//!  SQLite (read-only)      pure                      pure
//! ┌──────────┐   Dataset  ┌───────────┐ FamilyTable ┌──────────┐
//! │  loader  │ ─────────► │ transform │ ──────────► │  report  │
//! └──────────┘            └───────────┘             └──────────┘
//!  entities                scores, families,         means, box stats,
//!  attributes              stage (capped at 3),      trigger flow,
//!  evolution edges         delta                     table view
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Integer arithmetic only; BTreeMap for deterministic ordering
//! - Nothing derived is persisted; every run recomputes from the source

// =============================================================================
// MODULES
// =============================================================================

pub mod loader;
pub mod primitives;
pub mod report;
pub mod stage;
pub mod transform;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AttributeRecord, Dataset, Entity, EntityId, EvodashError, EvolutionEdge, FamilyId, Score,
};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use loader::{SourceSchema, load_dataset};
pub use report::{
    Bar, BoxSummary, DeltaGroup, DeltaPoint, FlowLink, MeanDelta, Report, Summary, TableRow,
    TriggerFlow, format_millis,
};
pub use stage::Stage;
pub use transform::{
    DropReason, DroppedMember, FamilyMember, FamilyRow, FamilyTable, Transformation,
    aggregate_scores, family_members, transform,
};
