use glam::Vec2;
use hecs::{CommandBuffer, Entity, World};
use rand::Rng;
use tracing::{debug, warn};

use crate::components::{
    ActionKind, ActorFsm, ActorState, Alerted, Animator, Body, Cooldowns, DamageEvent,
    DespawnTimer, Enemy, EnemyKind, Facing, Faction, Health, Patrol, Player, Position, Velocity,
    Weapon,
};
use crate::config::Tuning;
use crate::engine::anim::AnimationSink;
use crate::scene::level::Level;
use crate::scene::prefabs::spawn_projectile;
use crate::systems::combat::{classify_range, resolve_melee, try_attack, try_melee, RangeBand};
use crate::systems::locomotion::{resolve, Drive};
use crate::systems::patrol::{step_patrol, PatrolStep};

/// Per-archetype numbers the enemy brain needs, pulled out of [`Tuning`].
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub weapon: Weapon,
    pub speed: f32,
    pub run_multiplier: f32,
    pub detection_range: f32,
    /// Delay from the start of a swing to its hit check.
    pub windup: f32,
    /// How long a swing keeps the enemy busy.
    pub attack_duration: f32,
    /// How long the enemy stands still after throwing.
    pub shoot_hold: f32,
    pub fire_offset: Vec2,
}

impl Profile {
    pub fn for_kind(kind: EnemyKind, tuning: &Tuning) -> Self {
        match kind {
            EnemyKind::Brawler => {
                let t = &tuning.brawler;
                Self {
                    weapon: t.weapon(),
                    speed: t.move_speed,
                    run_multiplier: t.run_multiplier,
                    detection_range: t.detection_range,
                    windup: t.attack_windup,
                    attack_duration: t.attack_cooldown,
                    shoot_hold: 0.0,
                    fire_offset: Vec2::ZERO,
                }
            }
            EnemyKind::Bomber => {
                let t = &tuning.bomber;
                Self {
                    weapon: t.weapon(),
                    speed: t.patrol_speed,
                    run_multiplier: 1.0,
                    detection_range: t.detection_range,
                    windup: 0.0,
                    attack_duration: 0.0,
                    shoot_hold: t.shoot_hold,
                    fire_offset: t.fire_offset,
                }
            }
        }
    }
}

/// Everything an enemy's transition function looks at.
pub struct EnemyCtx<'a> {
    pub health: i32,
    pub position: Vec2,
    /// Where a thrown projectile would leave from. The shoot band is
    /// measured from here so the choice to shoot matches the throw itself.
    pub fire_origin: Vec2,
    /// Living target, if any.
    pub target: Option<Vec2>,
    pub alerted: bool,
    pub has_patrol: bool,
    pub cooldowns: &'a Cooldowns,
    pub profile: &'a Profile,
}

impl ActorState {
    /// Enemy transition table, highest priority first:
    /// death, busy timed action, no target, melee band, shoot band, chase,
    /// patrol, idle.
    ///
    /// Returns `None` to stay. Timed states are only returned when a fresh
    /// action starts, so the caller can restart them unconditionally.
    pub fn next_enemy(&self, ctx: &EnemyCtx) -> Option<ActorState> {
        if matches!(self, Self::Dead) {
            return None;
        }
        if ctx.health <= 0 {
            return Some(Self::Dead);
        }

        match self {
            Self::Attacking { timer, .. } if *timer < ctx.profile.attack_duration => return None,
            Self::Shooting { timer } if *timer < ctx.profile.shoot_hold => return None,
            _ => {}
        }

        let desired = match ctx.target {
            None => Self::Idle,
            Some(target) => {
                let weapon = &ctx.profile.weapon;
                let distance = ctx.position.distance(target);
                let band = match classify_range(weapon, distance) {
                    Some(RangeBand::Melee) => Some(RangeBand::Melee),
                    _ => classify_range(weapon, ctx.fire_origin.distance(target))
                        .filter(|band| *band == RangeBand::Shoot),
                };
                match band {
                    Some(RangeBand::Melee) if ctx.cooldowns.ready(ActionKind::Melee) => {
                        Self::Attacking { timer: 0.0, resolved: false }
                    }
                    Some(RangeBand::Shoot) if ctx.cooldowns.ready(ActionKind::Shoot) => {
                        Self::Shooting { timer: 0.0 }
                    }
                    Some(_) => Self::Idle,
                    None if distance <= ctx.profile.detection_range || ctx.alerted => Self::Moving,
                    None if ctx.has_patrol => Self::Patrolling,
                    None => Self::Idle,
                }
            }
        };

        let fresh_action = matches!(desired, Self::Attacking { .. } | Self::Shooting { .. });
        if fresh_action || std::mem::discriminant(self) != std::mem::discriminant(&desired) {
            Some(desired)
        } else {
            None
        }
    }
}

/// Projectile spawn point: `offset` from the body centre, x mirrored by facing.
fn fire_origin(position: Vec2, offset: Vec2, facing: Facing) -> Vec2 {
    position + Vec2::new(offset.x * facing.sign(), offset.y)
}

/// Tick the machine and apply at most one transition. Returns the state
/// the actor is in afterwards.
pub fn advance(fsm: &mut ActorFsm, ctx: &EnemyCtx, dt: f32) -> ActorState {
    fsm.tick(dt);
    if fsm.is_finished() {
        return fsm.state.clone();
    }
    fsm.state.tick_timers(dt);
    if let Some(next) = fsm.state.next_enemy(ctx) {
        fsm.force_go(next);
    }
    fsm.state.clone()
}

/// Drive every enemy for one tick: pick a state, fire or swing, then set
/// velocity and facing. Returns melee hits for the damage system; thrown
/// projectiles go through `cmd`.
pub fn enemy_system<R: Rng + ?Sized>(
    world: &mut World,
    tuning: &Tuning,
    level: &Level,
    rng: &mut R,
    cmd: &mut CommandBuffer,
    dt: f32,
) -> Vec<DamageEvent> {
    let player: Option<(Entity, Vec2, bool)> = world
        .query::<(&Player, &Position, &Health)>()
        .iter()
        .next()
        .map(|(e, (_p, pos, health))| (e, pos.0, !health.is_depleted()));
    let target = player.filter(|(_, _, alive)| *alive).map(|(_, pos, _)| pos);

    let mut hits = Vec::new();

    for (entity, (enemy, fsm, pos, vel, facing, cooldowns, body, patrol, alerted, anim, health)) in
        world.query_mut::<(
            &Enemy,
            &mut ActorFsm,
            &Position,
            &mut Velocity,
            &mut Facing,
            &mut Cooldowns,
            &Body,
            Option<&mut Patrol>,
            Option<&Alerted>,
            &mut Animator,
            &Health,
        )>()
    {
        let profile = Profile::for_kind(enemy.0, tuning);
        let toward_target = target.map_or(0.0, |t| {
            let dx = t.x - pos.0.x;
            if dx.abs() > tuning.world.arrival_epsilon {
                dx.signum()
            } else {
                0.0
            }
        });
        let aim = Facing::from_x(toward_target).unwrap_or(*facing);
        let fire_origin = fire_origin(pos.0, profile.fire_offset, aim);

        let ctx = EnemyCtx {
            health: health.current,
            position: pos.0,
            fire_origin,
            target,
            alerted: alerted.is_some(),
            has_patrol: patrol.is_some(),
            cooldowns,
            profile: &profile,
        };
        advance(fsm, &ctx, dt);

        if fsm.just_entered() {
            debug!(
                ?entity,
                kind = ?enemy.0,
                from = fsm.previous.label(),
                to = fsm.state.label(),
                "enemy state"
            );
            if fsm.state == ActorState::Dead {
                vel.0 = Vec2::ZERO;
                cmd.insert_one(entity, DespawnTimer(tuning.world.death_removal_delay));
            }
            if target.is_none() && fsm.state == ActorState::Idle {
                warn!(?entity, "no living target, idling");
            }
        }

        if fsm.just_entered() {
            if let (Some(target), ActorState::Attacking { .. }) = (target, &fsm.state) {
                try_melee(cooldowns, &profile.weapon, pos.0, target);
                anim.set_trigger(if rng.gen_bool(0.5) { "attack1" } else { "attack2" });
            }
            if let (Some(target), ActorState::Shooting { .. }) = (target, &fsm.state) {
                *facing = aim;
                if let Some(request) = try_attack(cooldowns, &profile.weapon, fire_origin, target) {
                    spawn_projectile(cmd, request);
                    anim.set_trigger("shoot");
                }
            }
        }

        if let ActorState::Attacking { timer, resolved } = &mut fsm.state {
            if !*resolved && *timer >= profile.windup {
                *resolved = true;
                let target_now = player.map(|(_, p, alive)| (p, alive));
                match player {
                    Some((player_entity, _, _))
                        if resolve_melee(&profile.weapon, pos.0, target_now) =>
                    {
                        debug!(?entity, "melee hit");
                        hits.push(DamageEvent {
                            target: player_entity,
                            amount: profile.weapon.projectile.damage,
                            source: Faction::Enemy,
                        });
                    }
                    _ => debug!(?entity, "melee fizzled"),
                }
            }
        }

        let drive = match &fsm.state {
            ActorState::Moving => {
                let multiplier = if alerted.is_some() { profile.run_multiplier } else { 1.0 };
                Drive::new(toward_target, profile.speed, vel.0).with_multiplier(multiplier)
            }
            ActorState::Patrolling => {
                let heading = match patrol {
                    Some(patrol) => match step_patrol(
                        patrol,
                        pos.0,
                        body.half_extents,
                        level,
                        rng,
                        tuning.world.arrival_epsilon,
                        dt,
                    ) {
                        PatrolStep::Walk(h) => h.x,
                        PatrolStep::Wait => 0.0,
                    },
                    None => 0.0,
                };
                Drive::new(heading, profile.speed, vel.0)
            }
            _ => Drive::new(toward_target, 0.0, vel.0),
        };
        let motion = resolve(&fsm.state, &drive);
        vel.0 = motion.velocity;
        if let Some(face) = motion.facing {
            *facing = face;
        }
    }

    hits
}
