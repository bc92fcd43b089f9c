use glam::Vec2;
use hecs::{CommandBuffer, World};
use tracing::{debug, info};

use crate::components::{
    ActionKind, ActorFsm, ActorState, Animator, CollisionEvent, Cooldowns, DespawnTimer, Facing,
    GravityScale, Grounded, Health, Jumps, LedgeSensor, Player, Position, Surface, Velocity,
};
use crate::config::{PlayerTuning, Tuning};
use crate::engine::anim::AnimationSink;
use crate::engine::input::{Action, InputState};
use crate::scene::level::Level;
use crate::scene::prefabs::spawn_projectile;
use crate::systems::combat::fire_forward;
use crate::systems::ledge::sense_ledge;
use crate::systems::locomotion::{resolve, Drive};

/// Stick deflection below this counts as no movement input.
const MOVE_DEADZONE: f32 = 0.1;

// ---------------------------------------------------------------------------
// Player transition logic
// ---------------------------------------------------------------------------

/// Context passed to [`ActorState::next_player`] each tick.
pub struct PlayerCtx<'a> {
    pub input: &'a InputState,
    pub tuning: &'a PlayerTuning,
    pub grounded: bool,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub health: i32,
    pub jumps_left: u32,
    pub roll_ready: bool,
    /// A shot left the barrel this tick.
    pub fired: bool,
    /// Ledge sensors report a grabbable lip ahead.
    pub ledge: bool,
}

impl ActorState {
    /// Whether a jump press is honoured in this state (given jumps left).
    /// Hanging has its own jump meaning: climb.
    pub fn can_jump(&self) -> bool {
        !matches!(
            self,
            Self::Rolling { .. } | Self::Climbing { .. } | Self::Hanging | Self::Dead
        )
    }

    /// States the gun may be fired from.
    pub fn can_fire(&self) -> bool {
        self.can_jump()
    }

    fn is_grounded_state(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Moving | Self::Crouching | Self::Shooting { .. }
        )
    }

    /// Per-state player transitions. Global transitions (death, jump,
    /// walk-off-edge) are checked separately in [`check_global_transitions`]
    /// and evaluated first.
    pub fn next_player(&self, ctx: &PlayerCtx) -> Option<ActorState> {
        let t = ctx.tuning;
        match self {
            Self::Dead => None,

            Self::Rolling { timer, .. } => {
                if *timer < t.roll_duration {
                    None
                } else if ctx.grounded {
                    Some(Self::Idle)
                } else {
                    Some(Self::Falling)
                }
            }

            Self::Climbing { timer, .. } => (*timer >= t.climb_duration).then_some(Self::Idle),

            Self::Hanging => {
                if ctx.input.triggered(Action::Jump) {
                    let offset = Vec2::new(t.climb_offset.x * ctx.facing.sign(), t.climb_offset.y);
                    Some(Self::Climbing {
                        from: ctx.position,
                        to: ctx.position + offset,
                        timer: 0.0,
                    })
                } else if ctx.input.triggered(Action::Crouch) {
                    Some(Self::Falling)
                } else {
                    None
                }
            }

            Self::Jumping if ctx.ledge => Some(Self::Hanging),
            Self::Jumping => (ctx.velocity.y <= 0.0).then_some(Self::Falling),

            Self::Falling if ctx.ledge => Some(Self::Hanging),
            Self::Falling => ctx.grounded.then_some(Self::Idle),

            Self::Idle | Self::Moving | Self::Crouching | Self::Shooting { .. } => {
                if ctx.input.triggered(Action::Roll) && ctx.roll_ready {
                    let heading = ctx.input.movement.x;
                    let direction = if heading.abs() > MOVE_DEADZONE {
                        heading.signum()
                    } else {
                        ctx.facing.sign()
                    };
                    let speed = if t.roll_duration > 0.0 {
                        t.roll_distance / t.roll_duration
                    } else {
                        0.0
                    };
                    return Some(Self::Rolling { direction, speed, timer: 0.0 });
                }
                if ctx.fired {
                    return Some(Self::Shooting { timer: 0.0 });
                }
                if matches!(self, Self::Shooting { timer } if *timer < t.shoot_hold) {
                    return None;
                }

                let desired = if ctx.input.is_held(Action::Crouch) {
                    Self::Crouching
                } else if ctx.input.movement.x.abs() > MOVE_DEADZONE {
                    Self::Moving
                } else {
                    Self::Idle
                };
                (std::mem::discriminant(self) != std::mem::discriminant(&desired)).then_some(desired)
            }

            // Enemy-only states: fall back to the ground/air default.
            Self::Patrolling | Self::Attacking { .. } => {
                Some(if ctx.grounded { Self::Idle } else { Self::Falling })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Global transitions (any-state rules, checked before per-state logic)
// ---------------------------------------------------------------------------

/// Returns a transition that should fire regardless of current state, or `None`.
fn check_global_transitions(state: &ActorState, ctx: &PlayerCtx) -> Option<ActorState> {
    if matches!(state, ActorState::Dead) {
        return None;
    }
    if ctx.health <= 0 {
        return Some(ActorState::Dead);
    }

    // Ground jump or air jump, as long as jumps remain.
    if ctx.input.triggered(Action::Jump) && state.can_jump() && ctx.jumps_left > 0 {
        return Some(ActorState::Jumping);
    }

    // Walked off an edge.
    if !ctx.grounded && state.is_grounded_state() {
        return Some(ActorState::Falling);
    }

    None
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Drive player FSM transitions and the side effects of entering a state
/// (jump impulse, gun fire, roll cooldown, climb snap). Runs **before**
/// [`player_movement_system`].
///
/// `fsm.tick(dt)` runs first so `just_entered` stays `true` for the whole
/// tick a transition fires, letting movement and animation react on it.
pub fn player_state_system(
    world: &mut World,
    input: &InputState,
    tuning: &Tuning,
    level: &Level,
    cmd: &mut CommandBuffer,
    dt: f32,
) {
    let t = &tuning.player;
    let weapon = tuning.player_weapon();

    for (entity, (_player, fsm, pos, vel, facing, health, jumps, cooldowns, gravity, sensor, anim, grounded)) in
        world.query_mut::<(
            &Player,
            &mut ActorFsm,
            &mut Position,
            &mut Velocity,
            &Facing,
            &Health,
            &mut Jumps,
            &mut Cooldowns,
            &mut GravityScale,
            &LedgeSensor,
            &mut Animator,
            Option<&Grounded>,
        )>()
    {
        let is_grounded = grounded.is_some();

        // 1. Advance elapsed timer and clear last tick's just_entered flag.
        fsm.tick(dt);

        // Landing restores the jump budget and normal gravity.
        if is_grounded && vel.0.y <= 0.0 && !matches!(fsm.state, ActorState::Jumping) {
            jumps.remaining = t.max_jumps;
            gravity.0 = t.normal_gravity;
        }

        // Fire first so the state machine can react to the shot this tick.
        let mut fired = false;
        if input.triggered(Action::Shoot) && fsm.state.can_fire() && !health.is_depleted() {
            let origin = pos.0 + Vec2::new(t.fire_offset.x * facing.sign(), t.fire_offset.y);
            if let Some(request) = fire_forward(cooldowns, &weapon, origin, *facing) {
                spawn_projectile(cmd, request);
                anim.set_trigger("shoot");
                fired = true;
            }
        }

        let ctx = PlayerCtx {
            input,
            tuning: t,
            grounded: is_grounded,
            position: pos.0,
            velocity: vel.0,
            facing: *facing,
            health: health.current,
            jumps_left: jumps.remaining,
            roll_ready: cooldowns.ready(ActionKind::Roll),
            fired,
            ledge: fsm.state.is_airborne() && sense_ledge(pos.0, *facing, sensor, level),
        };

        // 2. Global transitions (death, jump, walk-off-edge) take priority.
        if let Some(next) = check_global_transitions(&fsm.state, &ctx) {
            if matches!(next, ActorState::Jumping) {
                // Apply jump impulse here so movement never needs to.
                vel.0.y = t.jump_force;
                jumps.remaining -= 1;
                gravity.0 = t.falling_gravity;
                anim.set_trigger("jump");
            }
            fsm.force_go(next);
        } else {
            // 3. Advance intra-state timers, then check per-state transitions.
            let finished_climb = match &fsm.state {
                ActorState::Climbing { to, .. } => Some(*to),
                _ => None,
            };
            fsm.state.tick_timers(dt);
            if let Some(next) = fsm.state.next_player(&ctx) {
                if let (Some(to), ActorState::Idle) = (finished_climb, &next) {
                    pos.0 = to;
                    vel.0 = Vec2::ZERO;
                    gravity.0 = t.normal_gravity;
                }
                fsm.force_go(next);
            }
        }

        if !fsm.just_entered() {
            continue;
        }

        match &fsm.state {
            ActorState::Rolling { .. } => {
                cooldowns.start(ActionKind::Roll, t.roll_cooldown);
                anim.set_trigger("roll");
            }
            ActorState::Hanging => {
                vel.0 = Vec2::ZERO;
                jumps.remaining = t.max_jumps;
            }
            ActorState::Climbing { .. } => anim.set_trigger("climb"),
            ActorState::Dead => {
                vel.0 = Vec2::ZERO;
                cmd.insert_one(entity, DespawnTimer(tuning.world.death_removal_delay));
                info!(?entity, "player died");
            }
            _ => {}
        }

        debug!(
            ?entity,
            from = fsm.previous.label(),
            to = fsm.state.label(),
            "player state"
        );
    }
}

/// Apply movement based on the current FSM state. Jump velocity is already
/// applied by [`player_state_system`].
pub fn player_movement_system(world: &mut World, input: &InputState, tuning: &PlayerTuning) {
    for (_entity, (_player, fsm, vel, facing)) in
        world.query_mut::<(&Player, &ActorFsm, &mut Velocity, &mut Facing)>()
    {
        let multiplier = match fsm.state {
            ActorState::Crouching => tuning.crouch_multiplier,
            _ if input.is_held(Action::Run) => tuning.run_multiplier,
            _ => 1.0,
        };
        let drive = Drive::new(input.movement.x, tuning.move_speed, vel.0)
            .with_multiplier(multiplier)
            .with_climb_duration(tuning.climb_duration);
        let motion = resolve(&fsm.state, &drive);
        vel.0 = motion.velocity;
        if let Some(face) = motion.facing {
            *facing = face;
        }
    }
}

// ---------------------------------------------------------------------------
// Grounded detection
// ---------------------------------------------------------------------------

/// Rebuild the `Grounded` marker from one physics step's contacts: an actor
/// is grounded when it was pushed up out of a `Ground` surface.
pub fn grounded_system(world: &mut World, events: &[CollisionEvent]) {
    let grounded: Vec<_> = world
        .query_mut::<&Grounded>()
        .into_iter()
        .map(|(e, _)| e)
        .collect();
    for entity in grounded {
        let _ = world.remove_one::<Grounded>(entity);
    }

    for event in events {
        if event.surface == Surface::Ground && event.normal.dot(Vec2::Y) > 0.7 {
            let _ = world.insert_one(event.entity, Grounded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Projectile;
    use crate::scene::prefabs::spawn_player;

    struct Rig {
        world: World,
        tuning: Tuning,
        level: Level,
        player: hecs::Entity,
    }

    impl Rig {
        fn grounded() -> Self {
            let tuning = Tuning::default();
            let mut world = World::new();
            let player = spawn_player(&mut world, &tuning, Vec2::new(0.0, 0.9));
            world.insert_one(player, Grounded).unwrap();
            let mut rig = Rig { world, tuning, level: Level::default(), player };
            rig.step(&InputState::new());
            assert_eq!(rig.state(), ActorState::Idle);
            rig
        }

        fn step(&mut self, input: &InputState) -> usize {
            let mut cmd = CommandBuffer::new();
            for (_e, cd) in self.world.query_mut::<&mut Cooldowns>() {
                cd.tick(1.0 / 60.0);
            }
            player_state_system(&mut self.world, input, &self.tuning, &self.level, &mut cmd, 1.0 / 60.0);
            player_movement_system(&mut self.world, input, &self.tuning.player);
            cmd.run_on(&mut self.world);
            self.world.query::<&Projectile>().iter().count()
        }

        fn state(&self) -> ActorState {
            self.world.get::<&ActorFsm>(self.player).unwrap().state.clone()
        }

        fn velocity(&self) -> Vec2 {
            self.world.get::<&Velocity>(self.player).unwrap().0
        }

        fn airborne(&mut self) {
            self.world.remove_one::<Grounded>(self.player).unwrap();
        }
    }

    fn pressing(action: Action) -> InputState {
        let mut input = InputState::new();
        input.press(action);
        input
    }

    #[test]
    fn jump_applies_impulse_and_heavier_gravity() {
        let mut rig = Rig::grounded();
        rig.step(&pressing(Action::Jump));
        assert_eq!(rig.state(), ActorState::Jumping);
        assert_eq!(rig.velocity().y, 8.0);
        assert_eq!(rig.world.get::<&Jumps>(rig.player).unwrap().remaining, 1);
        assert_eq!(rig.world.get::<&GravityScale>(rig.player).unwrap().0, 5.0);
    }

    #[test]
    fn double_jump_then_no_more() {
        let mut rig = Rig::grounded();
        rig.step(&pressing(Action::Jump));
        rig.airborne();
        rig.world.get::<&mut Velocity>(rig.player).unwrap().0.y = -1.0;
        rig.step(&InputState::new());
        assert_eq!(rig.state(), ActorState::Falling);

        rig.step(&pressing(Action::Jump));
        assert_eq!(rig.state(), ActorState::Jumping);
        assert_eq!(rig.world.get::<&Jumps>(rig.player).unwrap().remaining, 0);

        rig.world.get::<&mut Velocity>(rig.player).unwrap().0.y = -1.0;
        rig.step(&InputState::new());
        rig.step(&pressing(Action::Jump));
        assert_eq!(rig.state(), ActorState::Falling);
        assert_eq!(rig.velocity().y, -1.0);
    }

    #[test]
    fn landing_restores_jumps_and_gravity() {
        let mut rig = Rig::grounded();
        rig.step(&pressing(Action::Jump));
        rig.airborne();
        rig.world.get::<&mut Velocity>(rig.player).unwrap().0.y = -2.0;
        rig.step(&InputState::new());
        rig.world.insert_one(rig.player, Grounded).unwrap();
        rig.world.get::<&mut Velocity>(rig.player).unwrap().0.y = 0.0;
        rig.step(&InputState::new());
        assert_eq!(rig.state(), ActorState::Idle);
        assert_eq!(rig.world.get::<&Jumps>(rig.player).unwrap().remaining, 2);
        assert_eq!(rig.world.get::<&GravityScale>(rig.player).unwrap().0, 1.0);
    }

    #[test]
    fn walking_runs_and_crouching_slows() {
        let mut rig = Rig::grounded();
        let mut input = InputState::new();
        input.set_movement(Vec2::new(-1.0, 0.0));
        rig.step(&input);
        assert_eq!(rig.state(), ActorState::Moving);
        assert_eq!(rig.velocity().x, -10.0);
        assert_eq!(*rig.world.get::<&Facing>(rig.player).unwrap(), Facing::Left);

        input.hold(Action::Run);
        rig.step(&input);
        assert_eq!(rig.velocity().x, -15.0);

        let mut crouch = InputState::new();
        crouch.set_movement(Vec2::new(1.0, 0.0));
        crouch.hold(Action::Crouch);
        rig.step(&crouch);
        assert_eq!(rig.state(), ActorState::Crouching);
        assert!((rig.velocity().x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn roll_is_timed_and_rate_limited() {
        let mut rig = Rig::grounded();
        rig.step(&pressing(Action::Roll));
        assert!(matches!(rig.state(), ActorState::Rolling { direction, .. } if direction == 1.0));
        assert!((rig.velocity().x - 10.0).abs() < 1e-5);
        assert_eq!(rig.velocity().y, 0.0);

        // 0.4 s roll.
        for _ in 0..25 {
            rig.step(&InputState::new());
        }
        assert_eq!(rig.state(), ActorState::Idle);

        // Still inside the 0.8 s cooldown.
        rig.step(&pressing(Action::Roll));
        assert_eq!(rig.state(), ActorState::Idle);
    }

    #[test]
    fn shooting_spawns_bullet_and_holds_briefly() {
        let mut rig = Rig::grounded();
        assert_eq!(rig.step(&pressing(Action::Shoot)), 1);
        assert!(matches!(rig.state(), ActorState::Shooting { .. }));
        assert!(rig.world.get::<&Animator>(rig.player).unwrap().triggered("shoot"));

        // Cooldown blocks the next press.
        assert_eq!(rig.step(&pressing(Action::Shoot)), 1);
        for _ in 0..15 {
            rig.step(&InputState::new());
        }
        assert_eq!(rig.state(), ActorState::Idle);
    }

    #[test]
    fn ledge_hang_climb_and_drop() {
        let tuning = Tuning::default();
        let mut level = Level::default();
        level.add(Vec2::new(12.0, 0.0), Vec2::new(18.0, 2.5), Surface::Ground);
        let mut world = World::new();
        let player = spawn_player(&mut world, &tuning, Vec2::new(11.6, 1.6));
        let mut rig = Rig { world, tuning, level, player };

        rig.step(&InputState::new());
        assert_eq!(rig.state(), ActorState::Hanging);
        assert_eq!(rig.velocity(), Vec2::ZERO);

        rig.step(&pressing(Action::Jump));
        let to = match rig.state() {
            ActorState::Climbing { from, to, .. } => {
                assert_eq!(from, Vec2::new(11.6, 1.6));
                to
            }
            other => panic!("expected climb, got {other:?}"),
        };
        assert!((to - Vec2::new(12.6, 3.6)).length() < 1e-5);

        // 0.5 s climb.
        let mut ticks = 0;
        while matches!(rig.state(), ActorState::Climbing { .. }) {
            rig.step(&InputState::new());
            ticks += 1;
            assert!(ticks <= 32, "climb never finished");
        }
        assert!(ticks >= 29);
        assert_eq!(rig.state(), ActorState::Idle);
        assert_eq!(rig.world.get::<&Position>(rig.player).unwrap().0, to);
    }

    #[test]
    fn crouch_drops_from_ledge() {
        let tuning = Tuning::default();
        let mut level = Level::default();
        level.add(Vec2::new(12.0, 0.0), Vec2::new(18.0, 2.5), Surface::Ground);
        let mut world = World::new();
        let player = spawn_player(&mut world, &tuning, Vec2::new(11.6, 1.6));
        let mut rig = Rig { world, tuning, level, player };
        rig.step(&InputState::new());
        assert_eq!(rig.state(), ActorState::Hanging);

        rig.step(&pressing(Action::Crouch));
        assert_eq!(rig.state(), ActorState::Falling);
    }

    #[test]
    fn depleted_player_dies_and_stays_dead() {
        let mut rig = Rig::grounded();
        rig.world.get::<&mut Health>(rig.player).unwrap().current = 0;
        rig.step(&pressing(Action::Jump));
        assert_eq!(rig.state(), ActorState::Dead);
        rig.world.get::<&mut Health>(rig.player).unwrap().current = 50;
        rig.step(&pressing(Action::Jump));
        assert_eq!(rig.state(), ActorState::Dead);
        assert_eq!(rig.velocity(), Vec2::ZERO);
    }

    #[test]
    fn grounded_rebuilt_from_contacts() {
        let mut world = World::new();
        let a = world.spawn((Grounded,));
        let b = world.spawn((Position(Vec2::ZERO),));
        let events = [
            CollisionEvent { entity: b, surface: Surface::Ground, normal: Vec2::Y },
            CollisionEvent { entity: a, surface: Surface::Wall, normal: Vec2::Y },
        ];
        grounded_system(&mut world, &events);
        assert!(world.get::<&Grounded>(a).is_err());
        assert!(world.get::<&Grounded>(b).is_ok());

        // Side contact with a ground block does not count as standing on it.
        let side = [CollisionEvent { entity: b, surface: Surface::Ground, normal: Vec2::X }];
        grounded_system(&mut world, &side);
        assert!(world.get::<&Grounded>(b).is_err());
    }
}
