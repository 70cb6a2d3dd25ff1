//! Level layouts for the placement planner.
//!
//! Provides the inputs one play session starts from:
//!
//! - [`preset`] - the hand-authored layouts
//! - [`generate`] - deterministic random layouts for levels past the
//!   presets, seeded so the same seed reproduces the same level
//! - [`build`] - plan a layout, re-planning with fresh layouts (up to
//!   [`MAX_PLAN_ATTEMPTS`]) when the greedy planner places fewer objects
//!   than requested
//!
//! Under-placement is a normal planner outcome, so [`build`] treats it as a
//! cue to try another layout rather than an error; only a run where no
//! attempt places a single object fails.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rubble_plan::{PlacementPlan, PlanConfig, TargetSpot, plan};

/// One playable level: a target layout plus the shots granted to clear it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Level {
    /// Shots the player gets.
    pub projectiles: u32,
    /// Desired target rest positions, handed to the planner.
    pub targets: Vec<TargetSpot>,
}

/// Hand-authored layout for the given 1-based level number, if one exists.
pub fn preset(number: u32) -> Option<Level> {
    match number {
        // Simple tower.
        1 => Some(Level {
            projectiles: 3,
            targets: vec![
                TargetSpot::new(800.0, 600.0),
                TargetSpot::new(800.0, 520.0),
                TargetSpot::new(800.0, 440.0),
                TargetSpot {
                    x: 800.0,
                    y: 360.0,
                    scale: 1.3,
                    high_value: true,
                },
            ],
        }),
        // Wide base.
        2 => Some(Level {
            projectiles: 3,
            targets: vec![
                TargetSpot::new(750.0, 600.0),
                TargetSpot::new(850.0, 600.0),
                TargetSpot::new(800.0, 520.0),
                TargetSpot::new(800.0, 440.0),
                TargetSpot {
                    x: 800.0,
                    y: 360.0,
                    scale: 1.3,
                    high_value: true,
                },
            ],
        }),
        // Pyramid.
        3 => Some(Level {
            projectiles: 4,
            targets: vec![
                TargetSpot::new(700.0, 600.0),
                TargetSpot::new(800.0, 600.0),
                TargetSpot::new(900.0, 600.0),
                TargetSpot::new(750.0, 520.0),
                TargetSpot::new(850.0, 520.0),
                TargetSpot {
                    x: 800.0,
                    y: 440.0,
                    scale: 1.3,
                    high_value: true,
                },
            ],
        }),
        // Double tower with a bridged top.
        4 => Some(Level {
            projectiles: 4,
            targets: vec![
                TargetSpot::new(700.0, 600.0),
                TargetSpot::new(700.0, 520.0),
                TargetSpot::new(700.0, 440.0),
                TargetSpot::new(900.0, 600.0),
                TargetSpot::new(900.0, 520.0),
                TargetSpot::new(900.0, 440.0),
                TargetSpot {
                    x: 800.0,
                    y: 360.0,
                    scale: 1.3,
                    high_value: true,
                },
            ],
        }),
        // Complex structure.
        5 => Some(Level {
            projectiles: 5,
            targets: vec![
                TargetSpot::new(700.0, 600.0),
                TargetSpot::new(800.0, 600.0),
                TargetSpot::new(900.0, 600.0),
                TargetSpot::new(1000.0, 600.0),
                TargetSpot::new(750.0, 520.0),
                TargetSpot::new(850.0, 520.0),
                TargetSpot::new(950.0, 520.0),
                TargetSpot::new(800.0, 440.0),
                TargetSpot::new(900.0, 440.0),
                TargetSpot {
                    x: 850.0,
                    y: 360.0,
                    scale: 1.3,
                    high_value: true,
                },
            ],
        }),
        _ => None,
    }
}

/// Number of hand-authored levels.
pub fn preset_count() -> u32 {
    5
}

/// Simple LCG random number generator for deterministic level layouts.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Inclusive integer range.
    fn between(&mut self, min: u32, max: u32) -> u32 {
        min + (self.next_u64() % u64::from(max - min + 1)) as u32
    }
}

/// Horizontal band random layouts occupy.
const GENERATED_X_MIN: f32 = 700.0;
const GENERATED_X_MAX: f32 = 950.0;

/// Vertical spacing between generated floors.
const FLOOR_SPACING: f32 = 80.0;

/// Generates a deterministic random layout for a level number.
///
/// Targets gather around one to three cluster columns with per-target
/// jitter; target and shot counts scale gently with the level number. The
/// first target is the high-value one. The same `(level_number, seed)` pair
/// always yields the same level.
pub fn generate(level_number: u32, ground_y: f32, seed: u64) -> Level {
    let mut rng = Rng::new(seed);

    let min_targets = (3 + level_number / 5).min(6);
    let max_targets = (5 + level_number / 3).min(10);
    let count = rng.between(min_targets, max_targets) as usize;

    let clusters: Vec<f32> = (0..rng.between(1, 3))
        .map(|_| rng.range(GENERATED_X_MIN, GENERATED_X_MAX))
        .collect();

    let mut targets = Vec::with_capacity(count);
    for i in 0..count {
        let cluster = clusters[(rng.next_u64() % clusters.len() as u64) as usize];
        let x = cluster + rng.range(-40.0, 40.0);
        let floor = rng.between(0, 3) as f32;
        targets.push(TargetSpot {
            x,
            y: ground_y - floor * FLOOR_SPACING,
            scale: if i == 0 { 1.3 } else { 1.0 },
            high_value: i == 0,
        });
    }
    targets.sort_by(|a, b| b.y.total_cmp(&a.y));

    Level {
        projectiles: (3 + count as u32 / 2).min(6),
        targets,
    }
}

/// Resolves level data: the preset if one exists, a generated layout
/// otherwise.
pub fn resolve(level_number: u32, ground_y: f32, seed: u64) -> Level {
    preset(level_number).unwrap_or_else(|| generate(level_number, ground_y, seed))
}

/// Maximum planning attempts before giving up on a level.
///
/// Bounds the re-plan loop on pathological layouts; each retry explores a
/// freshly generated layout, so more attempts buy diminishing returns.
pub const MAX_PLAN_ATTEMPTS: u32 = 8;

/// Failure to produce any playable layout.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// Every attempt planned zero object placements.
    #[error("no viable placement after {attempts} attempts")]
    NoViablePlacement {
        /// Number of layouts tried.
        attempts: u32,
    },
}

/// A planned, ready-to-instantiate level.
#[derive(Debug, Clone)]
pub struct BuiltLevel {
    /// The layout that was planned.
    pub level: Level,
    /// The structure plan for it.
    pub plan: PlacementPlan,
}

impl BuiltLevel {
    /// True if every requested target found a valid placement.
    pub fn is_complete(&self) -> bool {
        self.plan.placements.len() == self.level.targets.len()
    }
}

/// Plans a layout for the level, re-planning on under-placement.
///
/// The first attempt uses the preset (or generated) layout for the level
/// number; when the planner rejects some targets, further attempts explore
/// freshly generated layouts — presets are never mutated. The best attempt
/// (most objects placed) wins once the bound is reached. The whole build is
/// reproducible from `seed`.
pub fn build(level_number: u32, config: &PlanConfig, seed: u64) -> Result<BuiltLevel, BuildError> {
    let mut seeds = Rng::new(seed);
    let mut best: Option<BuiltLevel> = None;

    for attempt in 0..MAX_PLAN_ATTEMPTS {
        let layout_seed = seeds.next_u64();
        let level = if attempt == 0 {
            resolve(level_number, config.ground_y, layout_seed)
        } else {
            generate(level_number, config.ground_y, layout_seed)
        };

        let planned = plan(&level.targets, config);
        let requested = level.targets.len();
        let placed = planned.placements.len();
        let built = BuiltLevel {
            level,
            plan: planned,
        };

        if placed == requested && placed > 0 {
            return Ok(built);
        }
        if placed > 0
            && best
                .as_ref()
                .map(|b| placed > b.plan.placements.len())
                .unwrap_or(true)
        {
            best = Some(built);
        }
    }

    best.ok_or(BuildError::NoViablePlacement {
        attempts: MAX_PLAN_ATTEMPTS,
    })
}
