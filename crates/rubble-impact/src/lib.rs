//! Collision triage and damage resolution for breakable structures.
//!
//! Consumes raw contact-pair events from an external rigid-body world,
//! classifies each pair by role, estimates a momentum-proportional impact,
//! and turns it into destroy / damage / explode effects:
//!
//! - [`BodyRole`] / [`ContactBody`] - role labels and the per-contact view
//!   of a body
//! - [`classify`] / [`estimate_impact`] - stateless pair triage
//! - [`CooldownLedger`] - per-pair re-processing guard
//! - [`ImpactEngine`] - the resolution state machine, emitting effects
//!   through an [`EffectSink`]
//!
//! The engine owns the mutable per-entity state (block health, static
//! flags, projectile trigger flags) keyed by stable [`BodyId`]; positions
//! are mirrored in from the physics step via
//! [`ImpactEngine::set_position`]. Everything runs synchronously in the
//! order contacts are reported; there is no internal clock — callers pass
//! sim-time milliseconds into every resolution call.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use rubble_impact::{BodyId, BodyRole, ContactBody, EffectSink, ImpactConfig, ImpactEngine};
//!
//! #[derive(Default)]
//! struct Recorder {
//!     destroyed: Vec<BodyId>,
//! }
//!
//! impl EffectSink for Recorder {
//!     fn target_destroyed(&mut self, id: BodyId, _at: Vec2, _high_value: bool) {
//!         self.destroyed.push(id);
//!     }
//!     fn block_damaged(&mut self, _id: BodyId, _impact: f32) {}
//!     fn block_destroyed(&mut self, _id: BodyId, _at: Vec2) {}
//!     fn exploded(&mut self, _at: Vec2, _radius: f32) {}
//! }
//!
//! let mut engine = ImpactEngine::new(ImpactConfig::default());
//! engine.begin_session(0.0);
//! engine.add_target(BodyId(7), Vec2::new(800.0, 400.0), false);
//!
//! let ground = ContactBody::new(BodyId(1), BodyRole::Ground);
//! let target = ContactBody::new(BodyId(7), BodyRole::Target).with_velocity(Vec2::new(0.0, 6.0));
//!
//! // Past the settle grace period, a hard ground strike is fatal.
//! let mut sink = Recorder::default();
//! engine.resolve(&target, &ground, 2_000.0, &mut sink);
//! assert_eq!(sink.destroyed, vec![BodyId(7)]);
//! ```

pub mod body;
pub mod classify;
pub mod cooldown;
pub mod engine;

pub use body::{BlockState, BodyId, BodyRole, ContactBody, ProjectileState, TargetState};
pub use classify::{MIN_IMPACT_SPEED, PairClass, PairSide, classify, estimate_impact};
pub use cooldown::{CooldownLedger, PairKey};
pub use engine::{EffectSink, ImpactConfig, ImpactEngine};
