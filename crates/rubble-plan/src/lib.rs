//! Support-structure placement planning for breakable tower levels.
//!
//! Given a sparse set of target positions ("where should the breakable
//! objects come to rest"), synthesizes the structure that holds them up —
//! vertical columns, connecting beams, object rests — under non-overlap and
//! support-chain constraints:
//!
//! - [`Footprint`] / [`Occupancy`] - committed-bound tracking with AABB
//!   overlap queries
//! - [`RuleId`] - the ordered support rule set
//! - [`plan`] - the greedy bottom-up planner producing a [`PlacementPlan`]
//!
//! Coordinates are screen-space with +y pointing down: the ground line sits
//! at large y and structures grow toward smaller y.
//!
//! Planning is a single forward pass with no backtracking. Candidates that
//! fail a rule are recorded in [`PlacementPlan::rejected`] and skipped;
//! under-placement is a normal outcome the caller handles by re-planning
//! with a fresh layout, not an error.
//!
//! # Example
//!
//! ```
//! use rubble_plan::{PlanConfig, TargetSpot, plan};
//!
//! let targets = vec![TargetSpot::new(0.0, 0.0), TargetSpot::new(200.0, 0.0)];
//! let config = PlanConfig {
//!     ground_y: 500.0,
//!     ..Default::default()
//! };
//!
//! let result = plan(&targets, &config);
//! assert_eq!(result.placements.len(), 2);
//! assert!(result.rejected.is_empty());
//! ```

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod bounds;
pub mod planner;
pub mod rules;

pub use bounds::{Footprint, Occupancy};
pub use planner::{
    BlockKind, Candidate, CandidateKind, PlacedTarget, PlacementPlan, PlannedBlock, Rejection, plan,
};
pub use rules::RuleId;

/// Unscaled column sprite footprint, width x height.
pub const COLUMN_BASE_SIZE: Vec2 = Vec2::new(60.0, 55.0);

/// Unscaled beam sprite footprint.
pub const BEAM_BASE_SIZE: Vec2 = Vec2::new(80.0, 40.0);

/// Unscaled target object sprite footprint.
pub const TARGET_BASE_SIZE: Vec2 = Vec2::new(36.0, 36.0);

/// Slack subtracted from every half-extent so visually touching sprites do
/// not register as overlapping.
pub const OVERLAP_MARGIN: f32 = 4.0;

/// Targets whose y lies within this distance of a row's reference y join
/// that row.
pub const ROW_CLUSTER_THRESHOLD: f32 = 40.0;

/// Per-axis tolerance for support coincidence checks.
pub const SUPPORT_TOLERANCE: f32 = 10.0;

/// A desired final rest position for one breakable object.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetSpot {
    /// Desired x, before the plan-wide horizontal offset.
    pub x: f32,
    /// Desired y; only the relative ordering matters for row assignment.
    pub y: f32,
    /// Uniform sprite scale.
    pub scale: f32,
    /// High-value variant, reported back on the placement for scoring.
    pub high_value: bool,
}

impl TargetSpot {
    /// Creates a standard target at the given position.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }
}

impl Default for TargetSpot {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            high_value: false,
        }
    }
}

/// Configuration for one planning pass.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanConfig {
    /// Y of the ground line columns stack up from.
    pub ground_y: f32,
    /// Horizontal shift applied to every target before planning.
    pub offset_x: f32,
    /// Vertical step between stacked column segments.
    pub segment: f32,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            ground_y: 500.0,
            offset_x: 0.0,
            segment: 60.0,
        }
    }
}
