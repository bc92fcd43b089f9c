use glam::Vec2;
use hecs::{CommandBuffer, Entity, World};
use tracing::debug;

use crate::components::*;
use crate::config::Tuning;

/// Spawn the player. Starts in `Falling` so a player dropped above the floor
/// lands through the normal transition instead of a fake grounded state.
pub fn spawn_player(world: &mut World, tuning: &Tuning, pos: Vec2) -> Entity {
    let t = &tuning.player;
    world.spawn((
        Position(pos),
        Velocity(Vec2::ZERO),
        GravityScale(t.normal_gravity),
        Body { half_extents: t.half_extents },
        Player,
        Faction::Player,
        Health::full(t.max_health),
        ActorFsm::new(ActorState::Falling),
        Facing::Right,
        Cooldowns::new(),
        Jumps { remaining: t.max_jumps },
        t.ledge_sensor(),
        Animator::new(),
    ))
}

/// Melee walker that patrols random offsets around its spawn point.
pub fn spawn_brawler(world: &mut World, tuning: &Tuning, pos: Vec2) -> Entity {
    let t = &tuning.brawler;
    let route = PatrolRoute::Random {
        range: t.patrol_range,
        min_distance: t.min_patrol_distance,
    };
    world.spawn((
        Position(pos),
        Velocity(Vec2::ZERO),
        GravityScale(1.0),
        Body { half_extents: t.half_extents },
        Enemy(EnemyKind::Brawler),
        Faction::Enemy,
        Health::full(t.max_health),
        ActorFsm::new(ActorState::Idle),
        Facing::Left,
        Cooldowns::new(),
        Patrol::new(pos, route, t.patrol_wait),
        ContactDamage {
            amount: t.contact_damage,
            cooldown: t.contact_cooldown,
        },
        Animator::new(),
    ))
}

/// Grenade thrower that walks its platform edge to edge.
pub fn spawn_bomber(world: &mut World, tuning: &Tuning, pos: Vec2) -> Entity {
    let t = &tuning.bomber;
    let route = PatrolRoute::Edges {
        direction: 1.0,
        look_ahead: t.look_ahead,
        look_depth: t.look_depth,
    };
    world.spawn((
        Position(pos),
        Velocity(Vec2::ZERO),
        GravityScale(1.0),
        Body { half_extents: t.half_extents },
        Enemy(EnemyKind::Bomber),
        Faction::Enemy,
        Health::full(t.max_health),
        ActorFsm::new(ActorState::Idle),
        Facing::Right,
        Cooldowns::new(),
        Patrol::new(pos, route, 0.0),
        Animator::new(),
    ))
}

/// Queue a projectile spawn; it enters the world when the buffer is applied.
pub fn spawn_projectile(cmd: &mut CommandBuffer, request: ProjectileSpawnRequest) {
    debug!(
        owner = ?request.projectile.owner,
        x = request.position.x,
        y = request.position.y,
        "projectile spawned"
    );
    cmd.spawn((
        Position(request.position),
        Velocity(request.velocity),
        request.projectile,
    ));
}
