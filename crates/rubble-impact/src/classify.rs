//! Pair classification and impact estimation.
//!
//! Both functions are stateless: classification maps an unordered pair of
//! role labels to a collision category, and the impact estimate is a
//! momentum-proportional heuristic over the two bodies' velocities and
//! masses. Neither consults engine state; the engine enriches the inputs
//! (volatility flags) before calling in.

use glam::Vec2;

use crate::body::{BodyRole, ContactBody};

/// Relative speed below which contact is treated as resting, not colliding.
pub const MIN_IMPACT_SPEED: f32 = 0.5;

/// Collision category for a contact pair, in triage priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairClass {
    /// Either body is unlabeled; never acted on.
    Ignore,
    /// A target crossed into the death zone.
    TargetOut,
    /// A volatile projectile touched anything.
    VolatileTrigger,
    /// A target struck the ground.
    TargetGround,
    /// A projectile struck a target.
    ProjectileTarget,
    /// A block struck a target.
    BlockTarget,
    /// A projectile struck a block.
    ProjectileBlock,
    /// Two blocks collided.
    BlockBlock,
    /// Labeled pair no rule applies to; no effect.
    Unclassified,
}

/// View of one contact side as the classifier sees it.
#[derive(Debug, Clone, Copy)]
pub struct PairSide {
    /// Role label, if any.
    pub role: Option<BodyRole>,
    /// True for a projectile armed with a volatile payload that has not
    /// triggered yet.
    pub volatile: bool,
}

impl PairSide {
    /// Creates a non-volatile side with the given role.
    pub fn new(role: BodyRole) -> Self {
        Self {
            role: Some(role),
            volatile: false,
        }
    }
}

/// Classifies an unordered pair of contact sides.
///
/// Symmetric: `classify(a, b) == classify(b, a)`.
pub fn classify(a: &PairSide, b: &PairSide) -> PairClass {
    use BodyRole::*;

    let (role_a, role_b) = match (a.role, b.role) {
        (Some(ra), Some(rb)) => (ra, rb),
        _ => return PairClass::Ignore,
    };

    let class = match (role_a, role_b) {
        (Target, DeathZone) | (DeathZone, Target) => PairClass::TargetOut,
        (Target, Ground) | (Ground, Target) => PairClass::TargetGround,
        (Projectile, Target) | (Target, Projectile) => PairClass::ProjectileTarget,
        (Block, Target) | (Target, Block) => PairClass::BlockTarget,
        (Projectile, Block) | (Block, Projectile) => PairClass::ProjectileBlock,
        (Block, Block) => PairClass::BlockBlock,
        (Ground, Ground)
        | (Ground, DeathZone)
        | (DeathZone, Ground)
        | (Ground, Block)
        | (Block, Ground)
        | (Ground, Projectile)
        | (Projectile, Ground)
        | (DeathZone, DeathZone)
        | (DeathZone, Block)
        | (Block, DeathZone)
        | (DeathZone, Projectile)
        | (Projectile, DeathZone)
        | (Target, Target)
        | (Projectile, Projectile) => PairClass::Unclassified,
    };

    // A death-zone exit is terminal and outranks everything; otherwise a
    // volatile payload triggers on any labeled contact, ahead of every
    // impact-gated category.
    if class == PairClass::TargetOut {
        return class;
    }
    if (role_a == Projectile && a.volatile) || (role_b == Projectile && b.volatile) {
        return PairClass::VolatileTrigger;
    }
    class
}

/// Momentum-proportional impact heuristic.
///
/// Relative speeds below [`MIN_IMPACT_SPEED`] count as resting contact and
/// yield zero. Otherwise the impact is `speed * (mass_a + mass_b) * 0.5`;
/// restitution and the contact normal are deliberately ignored. Non-finite
/// masses default to 1 and non-finite velocity components to 0 rather than
/// poisoning the result.
pub fn estimate_impact(a: &ContactBody, b: &ContactBody) -> f32 {
    let relative = finite_or_zero(a.velocity) - finite_or_zero(b.velocity);
    let speed = relative.length();
    if speed < MIN_IMPACT_SPEED {
        return 0.0;
    }

    let mass_a = if a.mass.is_finite() { a.mass } else { 1.0 };
    let mass_b = if b.mass.is_finite() { b.mass } else { 1.0 };
    speed * (mass_a + mass_b) * 0.5
}

fn finite_or_zero(v: Vec2) -> Vec2 {
    Vec2::new(
        if v.x.is_finite() { v.x } else { 0.0 },
        if v.y.is_finite() { v.y } else { 0.0 },
    )
}
