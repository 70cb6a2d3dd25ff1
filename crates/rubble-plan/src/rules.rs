//! The ordered support rule set.
//!
//! Stateless predicates deciding whether a candidate placement is
//! structurally valid given what has already been committed. Rules are
//! evaluated highest priority first and short-circuit on the first failure,
//! so a rejection always names the most critical rule that refused the
//! candidate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec2;

use crate::SUPPORT_TOLERANCE;
use crate::bounds::Occupancy;
use crate::planner::{Candidate, CandidateKind};

/// Identifier of a placement rule, attached to rejection records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RuleId {
    /// Candidate footprint must not overlap any committed footprint.
    NoOverlap,
    /// A column stands on the ground line or on the column one segment
    /// below it.
    ColumnSupport,
    /// Every declared beam support point rests on a committed column.
    BeamSupport,
    /// A target object rests on a column top at its row height.
    TargetSupport,
}

impl RuleId {
    /// Evaluation priority; higher evaluates first.
    pub fn priority(&self) -> u8 {
        match self {
            RuleId::NoOverlap => 3,
            RuleId::ColumnSupport | RuleId::BeamSupport => 2,
            RuleId::TargetSupport => 1,
        }
    }
}

/// Everything the rules can see while judging a candidate.
pub struct RuleContext<'a> {
    /// Footprints committed so far.
    pub occupancy: &'a Occupancy,
    /// Centers of every committed column segment.
    pub columns: &'a [Vec2],
    /// Y of the ground line.
    pub ground_y: f32,
    /// Vertical step between stacked column segments.
    pub segment: f32,
}

/// True if a committed column lies within the support tolerance of `at`.
///
/// The tolerance applies per axis, not as a euclidean distance.
pub fn column_near(columns: &[Vec2], at: Vec2) -> bool {
    columns.iter().any(|c| {
        (c.x - at.x).abs() <= SUPPORT_TOLERANCE && (c.y - at.y).abs() <= SUPPORT_TOLERANCE
    })
}

fn column_supported(ctx: &RuleContext<'_>, at: Vec2) -> bool {
    if (at.y - ctx.ground_y).abs() <= SUPPORT_TOLERANCE {
        return true;
    }
    column_near(ctx.columns, Vec2::new(at.x, at.y + ctx.segment))
}

fn beam_supported(ctx: &RuleContext<'_>, supports: &[Vec2]) -> bool {
    !supports.is_empty() && supports.iter().all(|p| column_near(ctx.columns, *p))
}

/// Evaluates the rule set against a candidate.
///
/// `Err` carries the first rule that failed. Target rest support is judged
/// by the planner against the current row's platform height, so only the
/// overlap rule applies to target candidates here.
pub fn evaluate(candidate: &Candidate, ctx: &RuleContext<'_>) -> Result<(), RuleId> {
    if ctx.occupancy.overlaps(&candidate.footprint()) {
        return Err(RuleId::NoOverlap);
    }

    match candidate.kind {
        CandidateKind::Column => {
            if !column_supported(ctx, candidate.position) {
                return Err(RuleId::ColumnSupport);
            }
        }
        CandidateKind::Beam => {
            if !beam_supported(ctx, &candidate.supports) {
                return Err(RuleId::BeamSupport);
            }
        }
        CandidateKind::Target { .. } => {}
    }

    Ok(())
}
