use glam::Vec2;

use crate::fsm::{StateMachine, Terminal};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Marker: this entity is the player.
pub struct Player;

/// Which enemy behaviour drives this entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    /// Walks up to the player and swings after a wind-up.
    Brawler,
    /// Keeps its distance and lobs grenades on an arc.
    Bomber,
}

/// Marker + archetype: this entity is an enemy.
#[derive(Debug, Clone, Copy)]
pub struct Enemy(pub EnemyKind);

/// Side an actor or projectile fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
}

/// Marker: enemy has been hurt and now pursues at run speed regardless of range.
pub struct Alerted;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing implied by a horizontal velocity; `None` when standing still.
    pub fn from_x(x: f32) -> Option<Facing> {
        if x > 0.0 {
            Some(Facing::Right)
        } else if x < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

/// Hit points. Invariant: `0 <= current <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn full(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

/// Jumps left before the player has to touch ground again.
pub struct Jumps {
    pub remaining: u32,
}

/// Seconds left until the entity is removed from the world.
pub struct DespawnTimer(pub f32);

// ---------------------------------------------------------------------------
// Actor state machine
// ---------------------------------------------------------------------------

/// All discrete states an actor can be in. Player and enemies share the enum;
/// each side only ever enters the variants its transition table produces.
///
/// Timed variants carry their own timer, counted up each tick. While a timed
/// state's timer is below its duration the actor is busy and no other
/// behaviour is selected.
#[derive(Debug, Clone, PartialEq)]
pub enum ActorState {
    Idle,
    /// Enemy walking its patrol route.
    Patrolling,
    /// Enemy chasing the target, or player walking/running on the ground.
    Moving,
    /// Melee swing. The hit is resolved once, after the wind-up.
    Attacking { timer: f32, resolved: bool },
    /// Brief hold after firing a projectile.
    Shooting { timer: f32 },
    Crouching,
    /// Scripted horizontal burst; gravity is suspended.
    Rolling { direction: f32, speed: f32, timer: f32 },
    /// Scripted lerp from a ledge hang up onto the platform.
    Climbing { from: Vec2, to: Vec2, timer: f32 },
    /// Ascending after a jump impulse.
    Jumping,
    Falling,
    /// Holding onto a ledge, waiting for climb or drop input.
    Hanging,
    Dead,
}

impl Terminal for ActorState {
    fn is_terminal(&self) -> bool {
        matches!(self, ActorState::Dead)
    }
}

impl ActorState {
    /// Advance the timers stored inside timed variants.
    pub fn tick_timers(&mut self, dt: f32) {
        match self {
            Self::Attacking { timer, .. }
            | Self::Shooting { timer }
            | Self::Rolling { timer, .. }
            | Self::Climbing { timer, .. } => *timer += dt,
            _ => {}
        }
    }

    /// Gravity does not act on the actor in these states.
    pub fn suspends_gravity(&self) -> bool {
        matches!(
            self,
            Self::Rolling { .. } | Self::Climbing { .. } | Self::Hanging | Self::Dead
        )
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self, Self::Jumping | Self::Falling)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Patrolling => "Patrolling",
            Self::Moving => "Moving",
            Self::Attacking { .. } => "Attacking",
            Self::Shooting { .. } => "Shooting",
            Self::Crouching => "Crouching",
            Self::Rolling { .. } => "Rolling",
            Self::Climbing { .. } => "Climbing",
            Self::Jumping => "Jumping",
            Self::Falling => "Falling",
            Self::Hanging => "Hanging",
            Self::Dead => "Dead",
        }
    }
}

/// FSM component attached to every actor.
pub type ActorFsm = StateMachine<ActorState>;

// ---------------------------------------------------------------------------
// Patrol
// ---------------------------------------------------------------------------

/// How an enemy picks where to walk while nothing is in range.
#[derive(Debug, Clone)]
pub enum PatrolRoute {
    /// Random horizontal offsets from the origin with
    /// `min_distance <= |offset| <= range`.
    Random { range: f32, min_distance: f32 },
    /// Fixed points visited in order, wrapping around.
    Waypoints { points: Vec<Vec2>, next: usize },
    /// Walk along a platform, turning around where the ground ends.
    Edges {
        direction: f32,
        look_ahead: f32,
        look_depth: f32,
    },
}

/// Patrol bookkeeping for an enemy.
#[derive(Debug, Clone)]
pub struct Patrol {
    pub origin: Vec2,
    pub route: PatrolRoute,
    pub waypoint: Option<Vec2>,
    /// Seconds left standing at the last reached waypoint.
    pub wait_remaining: f32,
    pub wait_time: f32,
}

impl Patrol {
    pub fn new(origin: Vec2, route: PatrolRoute, wait_time: f32) -> Self {
        Self {
            origin,
            route,
            waypoint: None,
            wait_remaining: 0.0,
            wait_time,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.wait_remaining > 0.0
    }
}

// ---------------------------------------------------------------------------
// Ledge sensing
// ---------------------------------------------------------------------------

/// Sensor boxes used to detect a grabbable ledge, relative to the actor centre.
/// The x offset is mirrored by facing.
#[derive(Debug, Clone, Copy)]
pub struct LedgeSensor {
    /// Must overlap ground: the lip of the ledge.
    pub grip_offset: Vec2,
    pub grip_size: Vec2,
    /// Must be empty: head room above the lip.
    pub clear_offset: Vec2,
    pub clear_size: Vec2,
}
