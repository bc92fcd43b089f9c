use glam::Vec2;

use crate::components::{ActorState, Facing};

/// What the controller (input or AI) wants this tick.
#[derive(Debug, Clone, Copy)]
pub struct Drive {
    /// Desired horizontal direction, `-1..=1`. Also decides facing.
    pub heading: f32,
    pub speed: f32,
    /// Run / crouch / alerted multiplier applied on top of `speed`.
    pub multiplier: f32,
    /// Velocity carried in from the last tick.
    pub velocity: Vec2,
    /// Length of the climb animation, used to turn the climb lerp into a velocity.
    pub climb_duration: f32,
}

impl Drive {
    pub fn new(heading: f32, speed: f32, velocity: Vec2) -> Self {
        Self {
            heading,
            speed,
            multiplier: 1.0,
            velocity,
            climb_duration: 0.0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_climb_duration(mut self, seconds: f32) -> Self {
        self.climb_duration = seconds;
        self
    }
}

/// Resolved motion for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub velocity: Vec2,
    /// New facing, or `None` to keep the current one.
    pub facing: Option<Facing>,
    pub gravity: bool,
}

/// Map a state and a drive onto a velocity and facing.
///
/// Only the horizontal component is driven for ground and air states; the
/// vertical one is left to gravity. Scripted states (`Rolling`, `Climbing`)
/// override both components and suspend gravity. `Shooting` keeps the
/// drive as given: the player keeps running while firing, enemies hand in a
/// zero speed.
pub fn resolve(state: &ActorState, drive: &Drive) -> Motion {
    let gravity = !state.suspends_gravity();
    let horizontal = drive.heading * drive.speed * drive.multiplier;
    let face = Facing::from_x(drive.heading);

    let (velocity, facing) = match state {
        ActorState::Dead | ActorState::Hanging => (Vec2::ZERO, None),
        ActorState::Rolling { direction, speed, .. } => {
            (Vec2::new(direction * speed, 0.0), Facing::from_x(*direction))
        }
        ActorState::Climbing { from, to, .. } => {
            let v = if drive.climb_duration > 0.0 {
                (*to - *from) / drive.climb_duration
            } else {
                Vec2::ZERO
            };
            (v, None)
        }
        ActorState::Idle | ActorState::Attacking { .. } => {
            (Vec2::new(0.0, drive.velocity.y), face)
        }
        ActorState::Patrolling
        | ActorState::Moving
        | ActorState::Shooting { .. }
        | ActorState::Crouching
        | ActorState::Jumping
        | ActorState::Falling => (Vec2::new(horizontal, drive.velocity.y), face),
    };

    Motion { velocity, facing, gravity }
}
