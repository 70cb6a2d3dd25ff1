//! Body identity, role labels, and per-entity runtime state.

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier for a runtime physics body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub u64);

/// Role attached to a body at creation. Roles never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyRole {
    /// The static ground line.
    Ground,
    /// Sensor below the play area; anything breakable that reaches it is
    /// lost.
    DeathZone,
    /// A destructible target object.
    Target,
    /// A structural block (column or beam).
    Block,
    /// A launched projectile.
    Projectile,
}

/// One side of a reported contact pair, as the physics world saw it at the
/// moment of contact.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactBody {
    /// Stable body identity.
    pub id: BodyId,
    /// Role label, if the body carries one. Unlabeled bodies classify as
    /// ignorable.
    pub role: Option<BodyRole>,
    /// Linear velocity at contact time.
    pub velocity: Vec2,
    /// Body mass; non-finite values are treated as 1.
    pub mass: f32,
    /// Physics-side static flag, used as a fallback for bodies the engine
    /// has no registered state for.
    pub is_static: bool,
}

impl ContactBody {
    /// Creates a resting, unit-mass contact view with the given role.
    pub fn new(id: BodyId, role: BodyRole) -> Self {
        Self {
            id,
            role: Some(role),
            velocity: Vec2::ZERO,
            mass: 1.0,
            is_static: false,
        }
    }

    /// Creates a contact view for a body without a role label.
    pub fn unlabeled(id: BodyId) -> Self {
        Self {
            id,
            role: None,
            velocity: Vec2::ZERO,
            mass: 1.0,
            is_static: false,
        }
    }

    /// Sets the velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the mass.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Marks the physics-side static flag.
    pub fn static_body(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Engine-owned state for a registered structure block.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockState {
    /// Last synced position.
    pub position: Vec2,
    /// Remaining health; the block breaks at or below zero.
    pub health: f32,
    /// Blocks start static and are released before the first shot.
    pub is_static: bool,
}

/// Engine-owned state for a registered target object.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetState {
    /// Last synced position.
    pub position: Vec2,
    /// High-value variant, forwarded on the destruction event.
    pub high_value: bool,
}

/// Engine-owned state for a registered projectile.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectileState {
    /// Last synced position; the detonation origin for volatile shots.
    pub position: Vec2,
    /// Whether this projectile detonates on contact.
    pub volatile: bool,
    /// Set once the detonation has fired; a volatile projectile only ever
    /// triggers once.
    pub triggered: bool,
}
