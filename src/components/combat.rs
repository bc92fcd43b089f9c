use std::collections::HashMap;

use glam::Vec2;

use super::Faction;

/// Slack when comparing a countdown against zero, so a cooldown and a timed
/// state of the same length expire on the same tick.
const COOLDOWN_EPSILON: f32 = 1e-4;

/// Actions that are rate-limited by a cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Melee,
    Shoot,
    Roll,
    Contact,
}

/// Remaining cooldown per action, in seconds. Each entry only ever counts
/// down toward zero between restarts.
#[derive(Debug, Clone, Default)]
pub struct Cooldowns {
    remaining: HashMap<ActionKind, f32>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self, kind: ActionKind) -> f32 {
        self.remaining.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn ready(&self, kind: ActionKind) -> bool {
        self.remaining(kind) <= COOLDOWN_EPSILON
    }

    pub fn start(&mut self, kind: ActionKind, seconds: f32) {
        self.remaining.insert(kind, seconds.max(0.0));
    }

    /// Start the cooldown if it is ready. Returns whether it was.
    pub fn try_start(&mut self, kind: ActionKind, seconds: f32) -> bool {
        if !self.ready(kind) {
            return false;
        }
        self.start(kind, seconds);
        true
    }

    pub fn tick(&mut self, dt: f32) {
        for remaining in self.remaining.values_mut() {
            *remaining = (*remaining - dt).max(0.0);
        }
    }
}

/// Path a projectile follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trajectory {
    /// Integrated from `Velocity` each tick.
    Straight,
    /// Sinusoidal lob: x lerps `start -> end`, y lerps plus
    /// `height * sin(pi * progress)`. Lands on `end` after `duration`.
    Arc {
        start: Vec2,
        end: Vec2,
        duration: f32,
        height: f32,
        elapsed: f32,
    },
}

/// Transient damaging entity.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub damage: i32,
    pub owner: Faction,
    pub time_to_live: f32,
    pub radius: f32,
    pub trajectory: Trajectory,
    /// Blast radius. `None` = damages only the actor it touches.
    pub explosive: Option<f32>,
}

/// What a combat trigger asks the spawner to create.
#[derive(Debug, Clone)]
pub struct ProjectileSpawnRequest {
    pub position: Vec2,
    pub velocity: Vec2,
    pub projectile: Projectile,
}

/// Per-shot projectile parameters.
#[derive(Debug, Clone, Copy)]
pub struct ProjectileSpec {
    pub speed: f32,
    pub damage: i32,
    pub time_to_live: f32,
    pub radius: f32,
    pub explosive: Option<f32>,
}

#[derive(Debug, Clone, Copy)]
pub enum Delivery {
    Straight,
    Arc { height: f32 },
}

/// Attack bands and timing for an actor. Melee and shoot bands never
/// overlap: a distance inside `melee_range` is always a melee distance.
#[derive(Debug, Clone, Copy)]
pub struct Weapon {
    pub owner: Faction,
    pub melee_range: f32,
    pub shoot_range: f32,
    pub cooldown: f32,
    pub projectile: ProjectileSpec,
    pub delivery: Delivery,
}

/// Damage dealt to the opposing side on body contact, rate-limited by the
/// `Contact` cooldown.
#[derive(Debug, Clone, Copy)]
pub struct ContactDamage {
    pub amount: i32,
    pub cooldown: f32,
}

/// One-way damage request applied by the health system at the end of a tick.
#[derive(Debug, Clone, Copy)]
pub struct DamageEvent {
    pub target: hecs::Entity,
    pub amount: i32,
    pub source: Faction,
}
