//! Greedy bottom-up placement planning.
//!
//! Targets are clustered into rows by height, then processed nearest-ground
//! row first. Each target gets a column stack from the ground line up to its
//! row's platform height, a cap column, and an object rest; adjacent targets
//! far enough apart get a connecting beam. Every proposed placement is
//! judged by the rule set against the committed state, so column support is
//! always checkable bottom-up and no backtracking is needed. Rejected
//! candidates are plan output, not errors.

use std::collections::BTreeMap;

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::{Footprint, Occupancy};
use crate::rules::{self, RuleContext, RuleId};
use crate::{
    BEAM_BASE_SIZE, COLUMN_BASE_SIZE, PlanConfig, ROW_CLUSTER_THRESHOLD, TARGET_BASE_SIZE,
    TargetSpot,
};

/// Uniform scale of a stacked column segment.
pub const COLUMN_SCALE: f32 = 0.6;

/// Uniform scale of the cap column a target rests on.
pub const CAP_COLUMN_SCALE: f32 = 0.65;

/// Vertical offset of an object's rest position above its platform row.
pub const TARGET_REST_OFFSET: f32 = 32.0;

/// Minimum horizontal gap between adjacent targets worth spanning with a
/// beam.
pub const BEAM_MIN_GAP: f32 = 90.0;

/// Vertical offset of a beam above its platform row.
pub const BEAM_DROP: f32 = 30.0;

/// Gap divisor producing the beam's horizontal scale.
pub const BEAM_WIDTH_DIVISOR: f32 = 80.0;

/// Cap on the beam's horizontal scale.
pub const BEAM_MAX_SCALE_X: f32 = 1.2;

/// Fixed vertical scale of a beam.
pub const BEAM_SCALE_Y: f32 = 0.45;

/// Kind of structural block in an accepted plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlockKind {
    /// Vertically stacked support segment.
    Column,
    /// Horizontal connector resting on two columns.
    Beam,
}

impl BlockKind {
    /// Unscaled sprite footprint for this kind.
    pub fn base_size(&self) -> Vec2 {
        match self {
            BlockKind::Column => COLUMN_BASE_SIZE,
            BlockKind::Beam => BEAM_BASE_SIZE,
        }
    }

    /// Physics material density used when instantiating the block.
    pub fn density(&self) -> f32 {
        match self {
            BlockKind::Column => 0.0025,
            BlockKind::Beam => 0.0012,
        }
    }
}

/// Kind of placement being attempted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CandidateKind {
    /// A column segment.
    Column,
    /// A connecting beam.
    Beam,
    /// The rest position for the target with this input index.
    Target {
        /// Index into the planner's input slice.
        index: usize,
    },
}

/// A proposed placement, judged by the rule set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// What is being placed.
    pub kind: CandidateKind,
    /// Center of the placement.
    pub position: Vec2,
    /// Per-axis sprite scale.
    pub scale: Vec2,
    /// Points that must rest on committed columns (beams only).
    pub supports: Vec<Vec2>,
}

impl Candidate {
    /// Unscaled sprite footprint for this candidate's kind.
    pub fn base_size(&self) -> Vec2 {
        match self.kind {
            CandidateKind::Column => COLUMN_BASE_SIZE,
            CandidateKind::Beam => BEAM_BASE_SIZE,
            CandidateKind::Target { .. } => TARGET_BASE_SIZE,
        }
    }

    /// Margin-shrunk footprint at the candidate's position.
    pub fn footprint(&self) -> Footprint {
        Footprint::from_scaled(self.position, self.base_size(), self.scale)
    }
}

/// An accepted structural block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlannedBlock {
    /// Column or beam.
    pub kind: BlockKind,
    /// Center of the block.
    pub position: Vec2,
    /// Per-axis sprite scale.
    pub scale: Vec2,
}

impl PlannedBlock {
    /// Physics material density for world instantiation.
    pub fn density(&self) -> f32 {
        self.kind.density()
    }

    /// Margin-shrunk footprint of the block.
    pub fn footprint(&self) -> Footprint {
        Footprint::from_scaled(self.position, self.kind.base_size(), self.scale)
    }
}

/// Final rest state for a successfully placed target object.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedTarget {
    /// Rest position.
    pub position: Vec2,
    /// Uniform sprite scale.
    pub scale: f32,
    /// High-value variant flag, carried through from the input.
    pub high_value: bool,
}

/// A candidate the rule set refused, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rejection {
    /// The refused candidate.
    pub candidate: Candidate,
    /// The rule that refused it.
    pub rule: RuleId,
}

/// Output of one planning pass.
#[derive(Debug, Clone, Default)]
pub struct PlacementPlan {
    /// Accepted blocks; insertion order is placement order (bottom-up, row
    /// by row).
    pub blocks: Vec<PlannedBlock>,
    /// Input target index to final rest state.
    pub placements: BTreeMap<usize, PlacedTarget>,
    /// Input target index to the y of its supporting column top.
    pub supports: BTreeMap<usize, f32>,
    /// Every refused candidate with the rule that failed it, in attempt
    /// order.
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, Copy)]
struct RowItem {
    index: usize,
    x: f32,
    y: f32,
    scale: f32,
    high_value: bool,
}

#[derive(Debug, Clone)]
struct Row {
    y: f32,
    items: Vec<RowItem>,
}

/// Clusters targets into rows of similar height, nearest the ground first,
/// left to right within a row.
///
/// Clustering is greedy over the y-descending order: a target joins the
/// first row whose reference y is within the cluster threshold, otherwise
/// it starts a new row.
fn cluster_rows(targets: &[TargetSpot], offset_x: f32) -> Vec<Row> {
    let mut infos: Vec<RowItem> = targets
        .iter()
        .enumerate()
        .map(|(index, t)| RowItem {
            index,
            x: finite_or(t.x, 0.0) + offset_x,
            y: finite_or(t.y, 0.0),
            scale: if t.scale.is_finite() && t.scale > 0.0 {
                t.scale
            } else {
                1.0
            },
            high_value: t.high_value,
        })
        .collect();

    infos.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut rows: Vec<Row> = Vec::new();
    for item in infos {
        match rows
            .iter_mut()
            .find(|r| (r.y - item.y).abs() <= ROW_CLUSTER_THRESHOLD)
        {
            Some(row) => row.items.push(item),
            None => rows.push(Row {
                y: item.y,
                items: vec![item],
            }),
        }
    }

    for row in &mut rows {
        row.items.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    rows
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

struct Planner<'a> {
    config: &'a PlanConfig,
    occupancy: Occupancy,
    columns: Vec<Vec2>,
    plan: PlacementPlan,
}

impl Planner<'_> {
    fn try_commit(&mut self, candidate: Candidate) -> bool {
        let ctx = RuleContext {
            occupancy: &self.occupancy,
            columns: &self.columns,
            ground_y: self.config.ground_y,
            segment: self.config.segment,
        };

        if let Err(rule) = rules::evaluate(&candidate, &ctx) {
            self.plan.rejected.push(Rejection { candidate, rule });
            return false;
        }

        self.occupancy.commit(candidate.footprint());
        match candidate.kind {
            CandidateKind::Column => {
                self.columns.push(candidate.position);
                self.plan.blocks.push(PlannedBlock {
                    kind: BlockKind::Column,
                    position: candidate.position,
                    scale: candidate.scale,
                });
            }
            CandidateKind::Beam => {
                self.plan.blocks.push(PlannedBlock {
                    kind: BlockKind::Beam,
                    position: candidate.position,
                    scale: candidate.scale,
                });
            }
            // Target rests occupy space but are not structural blocks; the
            // caller records the placement.
            CandidateKind::Target { .. } => {}
        }
        true
    }

    fn try_column(&mut self, position: Vec2, scale: f32) -> bool {
        self.try_commit(Candidate {
            kind: CandidateKind::Column,
            position,
            scale: Vec2::splat(scale),
            supports: Vec::new(),
        })
    }

    fn try_target(&mut self, item: &RowItem, position: Vec2) -> bool {
        let placed = self.try_commit(Candidate {
            kind: CandidateKind::Target { index: item.index },
            position,
            scale: Vec2::splat(item.scale),
            supports: Vec::new(),
        });
        if placed {
            self.plan.placements.insert(
                item.index,
                PlacedTarget {
                    position,
                    scale: item.scale,
                    high_value: item.high_value,
                },
            );
        }
        placed
    }

    fn place_row(&mut self, row: &Row, platform_y: f32) {
        for item in &row.items {
            // Stack columns from the ground line up to just below the
            // platform, then cap the stack at the platform itself.
            let mut y = self.config.ground_y;
            while y > platform_y {
                self.try_column(Vec2::new(item.x, y), COLUMN_SCALE);
                y -= self.config.segment;
            }
            let capped = self.try_column(Vec2::new(item.x, platform_y), CAP_COLUMN_SCALE);

            let support = Vec2::new(item.x, platform_y);
            if capped && rules::column_near(&self.columns, support) {
                let rest = Vec2::new(item.x, platform_y - TARGET_REST_OFFSET);
                if self.try_target(item, rest) {
                    self.plan.supports.insert(item.index, platform_y);
                }
            } else {
                self.plan.rejected.push(Rejection {
                    candidate: Candidate {
                        kind: CandidateKind::Target { index: item.index },
                        position: Vec2::new(item.x, platform_y - TARGET_REST_OFFSET),
                        scale: Vec2::splat(item.scale),
                        supports: Vec::new(),
                    },
                    rule: RuleId::TargetSupport,
                });
            }
        }

        // Span beam-worthy gaps between adjacent targets. A failed beam is
        // recorded like any other rejection and never blocks later work.
        for pair in row.items.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            let gap = right.x - left.x;
            if gap < BEAM_MIN_GAP {
                continue;
            }

            self.try_commit(Candidate {
                kind: CandidateKind::Beam,
                position: Vec2::new((left.x + right.x) / 2.0, platform_y - BEAM_DROP),
                scale: Vec2::new(
                    (gap / BEAM_WIDTH_DIVISOR).min(BEAM_MAX_SCALE_X),
                    BEAM_SCALE_Y,
                ),
                supports: vec![
                    Vec2::new(left.x, platform_y),
                    Vec2::new(right.x, platform_y),
                ],
            });
        }
    }
}

/// Plans the support structure for a set of targets.
///
/// A single forward pass: rows nearest the ground are committed first so
/// column support is always decidable against already-placed state. An
/// empty target list yields an empty plan. A target whose column chain is
/// blocked is rejected along with anything depending on it, without
/// aborting the rest of the plan.
pub fn plan(targets: &[TargetSpot], config: &PlanConfig) -> PlacementPlan {
    if targets.is_empty() {
        return PlacementPlan::default();
    }

    // Degenerate configuration is substituted, not rejected: a zero or
    // non-finite segment would stall the column loop.
    let defaults = PlanConfig::default();
    let config = PlanConfig {
        ground_y: finite_or(config.ground_y, defaults.ground_y),
        offset_x: finite_or(config.offset_x, defaults.offset_x),
        segment: if config.segment.is_finite() && config.segment > 0.0 {
            config.segment
        } else {
            defaults.segment
        },
    };

    let rows = cluster_rows(targets, config.offset_x);
    let mut planner = Planner {
        config: &config,
        occupancy: Occupancy::new(),
        columns: Vec::new(),
        plan: PlacementPlan::default(),
    };

    for (row_index, row) in rows.iter().enumerate() {
        let platform_y = config.ground_y - config.segment * (row_index as f32 + 1.0);
        planner.place_row(row, platform_y);
    }

    planner.plan
}
