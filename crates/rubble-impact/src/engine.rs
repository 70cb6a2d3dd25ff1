//! The collision and damage resolution engine.
//!
//! One engine instance owns the per-session state: the cooldown ledger, the
//! settle grace deadline, and the registries of live blocks, targets, and
//! projectiles. Contacts are resolved synchronously in the order the
//! physics step reports them; every state-mutating step re-checks liveness
//! against the registries immediately before acting, because earlier
//! contacts in the same tick may already have destroyed a body.

use std::collections::HashMap;

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::body::{BlockState, BodyId, BodyRole, ContactBody, ProjectileState, TargetState};
use crate::classify::{PairClass, PairSide, classify, estimate_impact};
use crate::cooldown::{CooldownLedger, PairKey};

/// Tuning constants for impact triage and damage.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpactConfig {
    /// Minimum impact that destroys a target (projectile or block strike).
    pub target_threshold: f32,
    /// Minimum impact that damages a block.
    pub block_threshold: f32,
    /// Impact at or above which a block breaks outright, ignoring health.
    pub break_threshold: f32,
    /// Starting health for every registered block.
    pub block_health: f32,
    /// Health drained per unit of impact.
    pub damage_rate: f32,
    /// Ground strike that destroys a falling target outright.
    pub ground_threshold: f32,
    /// Fraction of a block-block impact each block absorbs independently.
    pub shared_damage_fraction: f32,
    /// Block-block impacts below this multiple of `block_threshold` are
    /// ignored.
    pub block_block_gate: f32,
    /// Window during which a contact pair is not re-processed (ms).
    pub cooldown_ms: f64,
    /// Settle window after session start during which all effects are
    /// suppressed (ms).
    pub grace_ms: f64,
    /// Blast radius of a volatile detonation.
    pub explosion_radius: f32,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            target_threshold: 8.5,
            block_threshold: 12.0,
            break_threshold: 35.0,
            block_health: 100.0,
            damage_rate: 1.4,
            ground_threshold: 2.0,
            shared_damage_fraction: 0.4,
            block_block_gate: 1.5,
            cooldown_ms: 200.0,
            grace_ms: 1_200.0,
            explosion_radius: 300.0,
        }
    }
}

/// Receiver for the effects the engine emits.
///
/// This is the entire contract surface toward the rendering, audio, and
/// scoring layers. Effects are invoked synchronously during resolution;
/// implementations must not call back into the engine.
pub trait EffectSink {
    /// A target was destroyed. Position and the high-value flag are carried
    /// for the external particle/score layer.
    fn target_destroyed(&mut self, id: BodyId, at: Vec2, high_value: bool);

    /// A block absorbed damage without breaking (visual feedback hint).
    fn block_damaged(&mut self, id: BodyId, impact: f32);

    /// A block broke and left the structure.
    fn block_destroyed(&mut self, id: BodyId, at: Vec2);

    /// A volatile payload detonated.
    fn exploded(&mut self, at: Vec2, radius: f32);

    /// A projectile was consumed by its own detonation.
    fn projectile_destroyed(&mut self, id: BodyId) {
        let _ = id;
    }

    /// Wake hint for a still-live body: a support member vanished, so
    /// gravity load paths may have changed.
    fn wake(&mut self, id: BodyId) {
        let _ = id;
    }
}

/// The collision and damage resolution engine for one play session.
pub struct ImpactEngine {
    config: ImpactConfig,
    ledger: CooldownLedger,
    grace_until_ms: f64,
    released: bool,
    blocks: HashMap<BodyId, BlockState>,
    targets: HashMap<BodyId, TargetState>,
    projectiles: HashMap<BodyId, ProjectileState>,
}

impl ImpactEngine {
    /// Creates an engine with the given tuning.
    pub fn new(config: ImpactConfig) -> Self {
        Self {
            config,
            ledger: CooldownLedger::new(),
            grace_until_ms: 0.0,
            released: false,
            blocks: HashMap::new(),
            targets: HashMap::new(),
            projectiles: HashMap::new(),
        }
    }

    /// Current tuning.
    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    /// Starts a fresh session at `now_ms`: clears every registry and the
    /// cooldown ledger, and arms the settle grace period. Register bodies
    /// after calling this.
    pub fn begin_session(&mut self, now_ms: f64) {
        self.ledger.clear();
        self.blocks.clear();
        self.targets.clear();
        self.projectiles.clear();
        self.released = false;
        self.grace_until_ms = now_ms + self.config.grace_ms;
    }

    /// Registers a structure block at full health. Blocks start static
    /// until [`release_all`](Self::release_all).
    pub fn add_block(&mut self, id: BodyId, position: Vec2) {
        self.blocks.insert(
            id,
            BlockState {
                position,
                health: self.config.block_health,
                is_static: true,
            },
        );
    }

    /// Registers a target object.
    pub fn add_target(&mut self, id: BodyId, position: Vec2, high_value: bool) {
        self.targets.insert(
            id,
            TargetState {
                position,
                high_value,
            },
        );
    }

    /// Registers a projectile. Volatile projectiles detonate on their first
    /// labeled contact.
    pub fn add_projectile(&mut self, id: BodyId, position: Vec2, volatile: bool) {
        self.projectiles.insert(
            id,
            ProjectileState {
                position,
                volatile,
                triggered: false,
            },
        );
    }

    /// Mirrors a body position from the physics step. Unknown ids are
    /// ignored.
    pub fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(block) = self.blocks.get_mut(&id) {
            block.position = position;
        } else if let Some(target) = self.targets.get_mut(&id) {
            target.position = position;
        } else if let Some(projectile) = self.projectiles.get_mut(&id) {
            projectile.position = position;
        }
    }

    /// Drops a body from whichever registry holds it (e.g. a projectile
    /// cleaned up by the caller after its flight timeout).
    pub fn remove_body(&mut self, id: BodyId) {
        self.blocks.remove(&id);
        self.targets.remove(&id);
        self.projectiles.remove(&id);
    }

    /// Flips every registered block to dynamic and wakes all blocks and
    /// targets. Called once before the first shot; repeat calls are no-ops.
    pub fn release_all<S: EffectSink>(&mut self, sink: &mut S) {
        if self.released {
            return;
        }
        self.released = true;

        for (id, block) in &mut self.blocks {
            block.is_static = false;
            sink.wake(*id);
        }
        for id in self.targets.keys() {
            sink.wake(*id);
        }
    }

    /// True once the structure has been released.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Number of live target objects.
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// Number of live structure blocks.
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Remaining health of a live block.
    pub fn block_health(&self, id: BodyId) -> Option<f32> {
        self.blocks.get(&id).map(|b| b.health)
    }

    /// True if a volatile projectile has already detonated.
    pub fn projectile_triggered(&self, id: BodyId) -> bool {
        self.projectiles.get(&id).map(|p| p.triggered).unwrap_or(false)
    }

    /// Resolves one reported contact pair at `now_ms`.
    ///
    /// Branches are evaluated in strict priority order and stop at the
    /// first terminal match. Contacts during the settle grace period or
    /// within a pair's cooldown window have no effect.
    pub fn resolve<S: EffectSink>(
        &mut self,
        a: &ContactBody,
        b: &ContactBody,
        now_ms: f64,
        sink: &mut S,
    ) {
        let class = classify(&self.side_view(a), &self.side_view(b));
        if matches!(class, PairClass::Ignore | PairClass::Unclassified) {
            return;
        }
        if now_ms < self.grace_until_ms {
            return;
        }

        let key = PairKey::of(a.id, b.id);
        if self.ledger.in_cooldown(key, now_ms, self.config.cooldown_ms) {
            return;
        }

        match class {
            PairClass::TargetOut => {
                // Falling out of bounds is always fatal; no cooldown is
                // recorded since the exit is a one-shot terminal event.
                if let Some(id) = role_side(a, b, BodyRole::Target) {
                    self.destroy_target(id, sink);
                }
            }
            PairClass::VolatileTrigger => self.trigger_volatile(a, b, key, now_ms, sink),
            _ => self.resolve_impact(class, a, b, key, now_ms, sink),
        }
    }

    /// Detonates at `at`: targets inside the blast radius are destroyed
    /// unconditionally, blocks take damage with linear falloff to zero at
    /// the boundary, routed through the normal damage path.
    pub fn explode_at<S: EffectSink>(&mut self, at: Vec2, sink: &mut S) {
        let radius = self.config.explosion_radius;
        sink.exploded(at, radius);

        let doomed: Vec<BodyId> = self
            .targets
            .iter()
            .filter(|(_, t)| t.position.distance(at) < radius)
            .map(|(id, _)| *id)
            .collect();
        for id in doomed {
            self.destroy_target(id, sink);
        }

        let hit: Vec<(BodyId, f32)> = self
            .blocks
            .iter()
            .filter_map(|(id, block)| {
                let distance = block.position.distance(at);
                if distance < radius {
                    let falloff = 1.0 - distance / radius;
                    Some((*id, self.config.break_threshold * 2.0 * falloff))
                } else {
                    None
                }
            })
            .collect();
        for (id, impact) in hit {
            self.apply_damage(id, impact, sink);
        }
    }

    fn side_view(&self, body: &ContactBody) -> PairSide {
        PairSide {
            role: body.role,
            volatile: self
                .projectiles
                .get(&body.id)
                .map(|p| p.volatile && !p.triggered)
                .unwrap_or(false),
        }
    }

    fn block_is_static(&self, body: &ContactBody) -> bool {
        self.blocks
            .get(&body.id)
            .map(|b| b.is_static)
            .unwrap_or(body.is_static)
    }

    fn trigger_volatile<S: EffectSink>(
        &mut self,
        a: &ContactBody,
        b: &ContactBody,
        key: PairKey,
        now_ms: f64,
        sink: &mut S,
    ) {
        let armed = [a, b].into_iter().find(|body| {
            body.role == Some(BodyRole::Projectile)
                && self
                    .projectiles
                    .get(&body.id)
                    .map(|p| p.volatile && !p.triggered)
                    .unwrap_or(false)
        });
        let id = match armed {
            Some(body) => body.id,
            None => return,
        };

        let at = match self.projectiles.get_mut(&id) {
            Some(projectile) => {
                projectile.triggered = true;
                projectile.position
            }
            None => return,
        };

        self.explode_at(at, sink);
        sink.projectile_destroyed(id);
        self.ledger.record(key, now_ms);
    }

    fn resolve_impact<S: EffectSink>(
        &mut self,
        class: PairClass,
        a: &ContactBody,
        b: &ContactBody,
        key: PairKey,
        now_ms: f64,
        sink: &mut S,
    ) {
        let impact = estimate_impact(a, b);

        // Ground strikes bypass the per-category thresholds: this path is
        // for targets that fall and hit the ground, not resting contact.
        if class == PairClass::TargetGround {
            if impact >= self.config.ground_threshold {
                if let Some(id) = role_side(a, b, BodyRole::Target) {
                    self.destroy_target(id, sink);
                }
            }
            return;
        }

        if impact <= 0.0 {
            return;
        }

        match class {
            PairClass::ProjectileTarget | PairClass::BlockTarget => {
                if impact >= self.config.target_threshold {
                    if let Some(id) = role_side(a, b, BodyRole::Target) {
                        if self.destroy_target(id, sink) {
                            self.ledger.record(key, now_ms);
                        }
                    }
                }
            }
            PairClass::ProjectileBlock => {
                if impact >= self.config.block_threshold {
                    if let Some(id) = role_side(a, b, BodyRole::Block) {
                        if self.blocks.contains_key(&id) {
                            self.apply_damage(id, impact, sink);
                            self.ledger.record(key, now_ms);
                        }
                    }
                }
            }
            PairClass::BlockBlock => {
                if self.block_is_static(a) || self.block_is_static(b) {
                    return;
                }
                if impact < self.config.block_threshold * self.config.block_block_gate {
                    return;
                }
                // Mutual damage is deliberately softened: each block takes
                // a fixed fraction rather than splitting the full impact.
                let shared = impact * self.config.shared_damage_fraction;
                self.apply_damage(a.id, shared, sink);
                self.apply_damage(b.id, shared, sink);
                self.ledger.record(key, now_ms);
            }
            _ => {}
        }
    }

    /// Applies damage to a live block: below the damage threshold nothing
    /// happens, at or above the break threshold the block shatters
    /// outright, otherwise health drains and the block breaks when it
    /// reaches zero.
    fn apply_damage<S: EffectSink>(&mut self, id: BodyId, impact: f32, sink: &mut S) {
        if impact < self.config.block_threshold {
            return;
        }
        if impact >= self.config.break_threshold {
            self.destroy_block(id, sink);
            return;
        }

        let broke = match self.blocks.get_mut(&id) {
            Some(block) => {
                block.health -= impact * self.config.damage_rate;
                block.health <= 0.0
            }
            None => return,
        };

        if broke {
            self.destroy_block(id, sink);
        } else {
            sink.block_damaged(id, impact);
        }
    }

    fn destroy_block<S: EffectSink>(&mut self, id: BodyId, sink: &mut S) {
        let state = match self.blocks.remove(&id) {
            Some(state) => state,
            None => return,
        };
        sink.block_destroyed(id, state.position);

        // A support member vanished; hint the physics world to wake every
        // remaining body so gravity can re-settle the structure.
        for remaining in self.blocks.keys() {
            sink.wake(*remaining);
        }
        for remaining in self.targets.keys() {
            sink.wake(*remaining);
        }
    }

    fn destroy_target<S: EffectSink>(&mut self, id: BodyId, sink: &mut S) -> bool {
        match self.targets.remove(&id) {
            Some(state) => {
                sink.target_destroyed(id, state.position, state.high_value);
                true
            }
            None => false,
        }
    }
}

/// Picks the id of the side carrying `role`, if either does.
fn role_side(a: &ContactBody, b: &ContactBody, role: BodyRole) -> Option<BodyId> {
    if a.role == Some(role) {
        Some(a.id)
    } else if b.role == Some(role) {
        Some(b.id)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        destroyed_targets: Vec<(BodyId, bool)>,
        damaged_blocks: Vec<(BodyId, f32)>,
        destroyed_blocks: Vec<BodyId>,
        explosions: Vec<Vec2>,
        spent_projectiles: Vec<BodyId>,
        woken: Vec<BodyId>,
    }

    impl EffectSink for Recorder {
        fn target_destroyed(&mut self, id: BodyId, _at: Vec2, high_value: bool) {
            self.destroyed_targets.push((id, high_value));
        }
        fn block_damaged(&mut self, id: BodyId, impact: f32) {
            self.damaged_blocks.push((id, impact));
        }
        fn block_destroyed(&mut self, id: BodyId, _at: Vec2) {
            self.destroyed_blocks.push(id);
        }
        fn exploded(&mut self, at: Vec2, _radius: f32) {
            self.explosions.push(at);
        }
        fn projectile_destroyed(&mut self, id: BodyId) {
            self.spent_projectiles.push(id);
        }
        fn wake(&mut self, id: BodyId) {
            self.woken.push(id);
        }
    }

    const PAST_GRACE: f64 = 5_000.0;

    fn engine() -> ImpactEngine {
        let mut engine = ImpactEngine::new(ImpactConfig::default());
        engine.begin_session(0.0);
        engine
    }

    fn ground() -> ContactBody {
        ContactBody::new(BodyId(1), BodyRole::Ground).static_body()
    }

    #[test]
    fn grace_period_suppresses_effects() {
        let mut engine = engine();
        engine.add_target(BodyId(7), Vec2::ZERO, false);
        let target = ContactBody::new(BodyId(7), BodyRole::Target).with_velocity(Vec2::new(0.0, 9.0));

        let mut sink = Recorder::default();
        engine.resolve(&target, &ground(), 600.0, &mut sink);
        assert!(sink.destroyed_targets.is_empty(), "still settling");

        engine.resolve(&target, &ground(), PAST_GRACE, &mut sink);
        assert_eq!(sink.destroyed_targets, vec![(BodyId(7), false)]);
    }

    #[test]
    fn hard_ground_strike_destroys_target_once() {
        let mut engine = engine();
        engine.add_target(BodyId(7), Vec2::new(10.0, 20.0), true);
        let target = ContactBody::new(BodyId(7), BodyRole::Target).with_velocity(Vec2::new(0.0, 3.0));

        let mut sink = Recorder::default();
        engine.resolve(&target, &ground(), PAST_GRACE, &mut sink);
        // Impact 3 clears the hard-strike threshold of 2.
        assert_eq!(sink.destroyed_targets, vec![(BodyId(7), true)]);
        assert_eq!(engine.live_targets(), 0);

        // An identical repeat contact finds the target gone.
        engine.resolve(&target, &ground(), PAST_GRACE + 50.0, &mut sink);
        assert_eq!(sink.destroyed_targets.len(), 1);
    }

    #[test]
    fn soft_ground_contact_is_free() {
        let mut engine = engine();
        engine.add_target(BodyId(7), Vec2::ZERO, false);
        let target = ContactBody::new(BodyId(7), BodyRole::Target).with_velocity(Vec2::new(0.0, 0.9));

        let mut sink = Recorder::default();
        // Relative speed 0.9, combined mass 2: impact 0.9, below the hard
        // threshold.
        engine.resolve(&target, &ground(), PAST_GRACE, &mut sink);
        assert!(sink.destroyed_targets.is_empty());
        assert_eq!(engine.live_targets(), 1);
    }

    #[test]
    fn death_zone_exit_ignores_impact() {
        let mut engine = engine();
        engine.add_target(BodyId(7), Vec2::ZERO, false);

        // Zero relative velocity: the sensor overlap alone is fatal.
        let target = ContactBody::new(BodyId(7), BodyRole::Target);
        let zone = ContactBody::new(BodyId(2), BodyRole::DeathZone).static_body();

        let mut sink = Recorder::default();
        engine.resolve(&zone, &target, PAST_GRACE, &mut sink);
        assert_eq!(sink.destroyed_targets.len(), 1);
    }

    #[test]
    fn projectile_strike_needs_threshold_impact() {
        let mut engine = engine();
        engine.add_target(BodyId(7), Vec2::ZERO, false);
        let projectile = ContactBody::new(BodyId(3), BodyRole::Projectile);
        let target = ContactBody::new(BodyId(7), BodyRole::Target);

        let mut sink = Recorder::default();
        // Impact 8 < 8.5: shrugged off.
        engine.resolve(
            &projectile.with_velocity(Vec2::new(8.0, 0.0)),
            &target,
            PAST_GRACE,
            &mut sink,
        );
        assert!(sink.destroyed_targets.is_empty());

        // Impact 9 clears it.
        engine.resolve(
            &projectile.with_velocity(Vec2::new(9.0, 0.0)),
            &target,
            PAST_GRACE + 1.0,
            &mut sink,
        );
        assert_eq!(sink.destroyed_targets, vec![(BodyId(7), false)]);
    }

    #[test]
    fn block_strike_also_destroys_target() {
        let mut engine = engine();
        engine.add_target(BodyId(7), Vec2::ZERO, false);
        let block = ContactBody::new(BodyId(4), BodyRole::Block).with_velocity(Vec2::new(0.0, 10.0));
        let target = ContactBody::new(BodyId(7), BodyRole::Target);

        let mut sink = Recorder::default();
        engine.resolve(&block, &target, PAST_GRACE, &mut sink);
        assert_eq!(sink.destroyed_targets.len(), 1);
    }

    #[test]
    fn block_damage_accumulates_under_cooldown() {
        let mut engine = engine();
        engine.add_block(BodyId(9), Vec2::ZERO);
        let projectile = ContactBody::new(BodyId(3), BodyRole::Projectile)
            .with_velocity(Vec2::new(20.0, 0.0));
        let block = ContactBody::new(BodyId(9), BodyRole::Block);

        let mut sink = Recorder::default();
        // Impact 20 drains 28 health.
        engine.resolve(&projectile, &block, PAST_GRACE, &mut sink);
        assert_eq!(engine.block_health(BodyId(9)), Some(72.0));
        assert_eq!(sink.damaged_blocks, vec![(BodyId(9), 20.0)]);

        // Same pair inside the cooldown window: no further damage.
        engine.resolve(&projectile, &block, PAST_GRACE + 100.0, &mut sink);
        assert_eq!(engine.block_health(BodyId(9)), Some(72.0));

        // Past the window the pair processes again.
        engine.resolve(&projectile, &block, PAST_GRACE + 250.0, &mut sink);
        assert_eq!(engine.block_health(BodyId(9)), Some(44.0));
    }

    #[test]
    fn drained_block_breaks_and_wakes_survivors() {
        let mut engine = engine();
        engine.add_block(BodyId(9), Vec2::ZERO);
        engine.add_block(BodyId(10), Vec2::new(100.0, 0.0));
        engine.add_target(BodyId(7), Vec2::new(50.0, -60.0), false);

        let projectile = ContactBody::new(BodyId(3), BodyRole::Projectile)
            .with_velocity(Vec2::new(20.0, 0.0));
        let block = ContactBody::new(BodyId(9), BodyRole::Block);

        let mut sink = Recorder::default();
        for i in 0..4 {
            // Space the hits outside the cooldown window.
            engine.resolve(&projectile, &block, PAST_GRACE + 300.0 * i as f64, &mut sink);
        }

        // 100 - 4 * 28 goes negative on the fourth hit.
        assert_eq!(sink.destroyed_blocks, vec![BodyId(9)]);
        assert_eq!(engine.live_blocks(), 1);
        assert!(sink.woken.contains(&BodyId(10)));
        assert!(sink.woken.contains(&BodyId(7)));
    }

    #[test]
    fn massive_impact_breaks_instantly() {
        let mut engine = engine();
        engine.add_block(BodyId(9), Vec2::ZERO);
        let projectile = ContactBody::new(BodyId(3), BodyRole::Projectile)
            .with_velocity(Vec2::new(35.0, 0.0));
        let block = ContactBody::new(BodyId(9), BodyRole::Block);

        let mut sink = Recorder::default();
        engine.resolve(&projectile, &block, PAST_GRACE, &mut sink);
        assert_eq!(sink.destroyed_blocks, vec![BodyId(9)]);
        assert!(sink.damaged_blocks.is_empty());
    }

    #[test]
    fn health_boundary_is_at_or_below_zero() {
        // Isolate the drain path with a custom tuning: unit damage rate and
        // an unreachable instant-break threshold.
        let tuning = ImpactConfig {
            damage_rate: 1.0,
            break_threshold: 1_000.0,
            block_health: 35.0,
            ..Default::default()
        };

        let mut engine = ImpactEngine::new(tuning.clone());
        engine.begin_session(0.0);
        engine.add_block(BodyId(9), Vec2::ZERO);
        let projectile = ContactBody::new(BodyId(3), BodyRole::Projectile)
            .with_velocity(Vec2::new(35.0, 0.0));
        let block = ContactBody::new(BodyId(9), BodyRole::Block);

        let mut sink = Recorder::default();
        engine.resolve(&projectile, &block, PAST_GRACE, &mut sink);
        // 35 health - 35 damage = exactly zero: destroyed.
        assert_eq!(sink.destroyed_blocks, vec![BodyId(9)]);

        // One unit of health above the drain survives.
        let mut engine = ImpactEngine::new(ImpactConfig {
            block_health: 36.0,
            ..tuning
        });
        engine.begin_session(0.0);
        engine.add_block(BodyId(9), Vec2::ZERO);
        let mut sink = Recorder::default();
        engine.resolve(&projectile, &block, PAST_GRACE, &mut sink);
        assert!(sink.destroyed_blocks.is_empty());
        assert_eq!(engine.block_health(BodyId(9)), Some(1.0));
    }

    #[test]
    fn static_blocks_never_grind_each_other() {
        let mut engine = engine();
        engine.add_block(BodyId(9), Vec2::ZERO);
        engine.add_block(BodyId(10), Vec2::new(60.0, 0.0));

        let a = ContactBody::new(BodyId(9), BodyRole::Block).with_velocity(Vec2::new(40.0, 0.0));
        let b = ContactBody::new(BodyId(10), BodyRole::Block);

        let mut sink = Recorder::default();
        // Blocks are still static pre-release: nothing happens.
        engine.resolve(&a, &b, PAST_GRACE, &mut sink);
        assert_eq!(engine.block_health(BodyId(9)), Some(100.0));

        engine.release_all(&mut sink);
        engine.resolve(&a, &b, PAST_GRACE + 1.0, &mut sink);
        // Impact 40, each side absorbs 0.4 of it: 16 damage, 22.4 drain.
        assert_eq!(engine.block_health(BodyId(9)), Some(100.0 - 22.4));
        assert_eq!(engine.block_health(BodyId(10)), Some(100.0 - 22.4));
    }

    #[test]
    fn gated_block_grind_still_below_damage_threshold_is_free() {
        let mut engine = engine();
        engine.add_block(BodyId(9), Vec2::ZERO);
        engine.add_block(BodyId(10), Vec2::new(60.0, 0.0));
        let mut sink = Recorder::default();
        engine.release_all(&mut sink);

        // Impact 20 passes the block-block gate (18) but the softened share
        // of 8 sits below the per-block damage threshold: a recorded no-op.
        let a = ContactBody::new(BodyId(9), BodyRole::Block).with_velocity(Vec2::new(20.0, 0.0));
        let b = ContactBody::new(BodyId(10), BodyRole::Block);
        engine.resolve(&a, &b, PAST_GRACE, &mut sink);

        assert_eq!(engine.block_health(BodyId(9)), Some(100.0));
        assert!(sink.damaged_blocks.is_empty());
    }

    #[test]
    fn release_all_is_idempotent() {
        let mut engine = engine();
        engine.add_block(BodyId(9), Vec2::ZERO);
        engine.add_target(BodyId(7), Vec2::ZERO, false);

        let mut sink = Recorder::default();
        engine.release_all(&mut sink);
        assert_eq!(sink.woken.len(), 2);
        assert!(engine.is_released());

        engine.release_all(&mut sink);
        assert_eq!(sink.woken.len(), 2, "repeat release must not re-wake");
    }

    #[test]
    fn volatile_projectile_detonates_exactly_once() {
        let mut engine = engine();
        engine.add_projectile(BodyId(3), Vec2::ZERO, true);
        engine.add_target(BodyId(7), Vec2::new(100.0, 0.0), false);
        engine.add_target(BodyId(8), Vec2::new(400.0, 0.0), false);
        engine.add_block(BodyId(9), Vec2::ZERO);
        engine.add_block(BodyId(10), Vec2::new(200.0, 0.0));
        engine.add_block(BodyId(11), Vec2::new(290.0, 0.0));

        let projectile = ContactBody::new(BodyId(3), BodyRole::Projectile);
        let block_a = ContactBody::new(BodyId(9), BodyRole::Block);
        let block_b = ContactBody::new(BodyId(10), BodyRole::Block);

        let mut sink = Recorder::default();
        engine.resolve(&projectile, &block_a, PAST_GRACE, &mut sink);

        assert_eq!(sink.explosions, vec![Vec2::ZERO]);
        assert_eq!(sink.spent_projectiles, vec![BodyId(3)]);
        assert!(engine.projectile_triggered(BodyId(3)));

        // Target inside the blast radius dies, the far one survives.
        assert_eq!(sink.destroyed_targets, vec![(BodyId(7), false)]);
        assert_eq!(engine.live_targets(), 1);

        // Block at the center takes break-level damage; at 200 units the
        // falloff drains health; at 290 the falloff is below the damage
        // threshold.
        assert!(sink.destroyed_blocks.contains(&BodyId(9)));
        let health_mid = engine.block_health(BodyId(10)).unwrap();
        assert!(health_mid < 100.0 && health_mid > 0.0);
        assert_eq!(engine.block_health(BodyId(11)), Some(100.0));

        // A second simultaneous pair sees the triggered flag and does not
        // re-detonate.
        engine.resolve(&projectile, &block_b, PAST_GRACE, &mut sink);
        assert_eq!(sink.explosions.len(), 1);
    }

    #[test]
    fn inert_projectile_never_detonates() {
        let mut engine = engine();
        engine.add_projectile(BodyId(3), Vec2::ZERO, false);
        engine.add_block(BodyId(9), Vec2::ZERO);

        let projectile = ContactBody::new(BodyId(3), BodyRole::Projectile);
        let block = ContactBody::new(BodyId(9), BodyRole::Block);

        let mut sink = Recorder::default();
        engine.resolve(&projectile, &block, PAST_GRACE, &mut sink);
        assert!(sink.explosions.is_empty());
    }

    #[test]
    fn unlabeled_and_unmatched_pairs_do_nothing() {
        let mut engine = engine();
        engine.add_block(BodyId(9), Vec2::ZERO);

        let mut sink = Recorder::default();
        engine.resolve(
            &ground(),
            &ContactBody::unlabeled(BodyId(99)).with_velocity(Vec2::new(50.0, 0.0)),
            PAST_GRACE,
            &mut sink,
        );
        engine.resolve(
            &ground(),
            &ContactBody::new(BodyId(9), BodyRole::Block).with_velocity(Vec2::new(50.0, 0.0)),
            PAST_GRACE,
            &mut sink,
        );

        assert!(sink.destroyed_targets.is_empty());
        assert!(sink.damaged_blocks.is_empty());
        assert!(sink.destroyed_blocks.is_empty());
    }

    #[test]
    fn begin_session_resets_state() {
        let mut engine = engine();
        engine.add_block(BodyId(9), Vec2::ZERO);
        let mut sink = Recorder::default();
        engine.release_all(&mut sink);

        engine.begin_session(10_000.0);
        assert_eq!(engine.live_blocks(), 0);
        assert!(!engine.is_released());

        // Grace is re-armed relative to the new session start.
        engine.add_target(BodyId(7), Vec2::ZERO, false);
        let target = ContactBody::new(BodyId(7), BodyRole::Target).with_velocity(Vec2::new(0.0, 9.0));
        engine.resolve(&target, &ground(), 10_600.0, &mut sink);
        assert!(sink.destroyed_targets.is_empty());
        engine.resolve(&target, &ground(), 11_300.0, &mut sink);
        assert_eq!(sink.destroyed_targets.len(), 1);
    }
}
