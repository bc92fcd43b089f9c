use glam::Vec2;
use hecs::{CommandBuffer, Entity, World};
use tracing::debug;

use crate::components::{Body, DamageEvent, Faction, Health, Position, Projectile, Trajectory, Velocity};
use crate::scene::level::Level;
use crate::systems::collision::{circle_overlaps_box, Aabb};
use crate::systems::combat::arc_point;

struct Target {
    entity: Entity,
    bounds: Aabb,
    faction: Faction,
}

/// Move projectiles, expire them, and resolve hits.
///
/// A projectile is removed on its first qualifying contact: a living actor of
/// the opposing faction, or any level geometry. Arc projectiles also detonate
/// when they reach their end point. Explosive payloads damage every opposing
/// actor whose body the blast circle touches; plain ones damage only
/// the actor they touched. Own-faction actors are never hit.
pub fn projectile_system(
    world: &mut World,
    level: &Level,
    cmd: &mut CommandBuffer,
    dt: f32,
) -> Vec<DamageEvent> {
    let targets: Vec<Target> = world
        .query::<(&Position, &Body, &Faction, &Health)>()
        .iter()
        .filter(|(_e, (_p, _b, _f, health))| !health.is_depleted())
        .map(|(entity, (pos, body, faction, _h))| Target {
            entity,
            bounds: Aabb::from_center(pos.0, body.half_extents),
            faction: *faction,
        })
        .collect();

    let mut events = Vec::new();

    for (entity, (pos, vel, projectile)) in
        world.query_mut::<(&mut Position, &Velocity, &mut Projectile)>()
    {
        projectile.time_to_live -= dt;
        if projectile.time_to_live <= 0.0 {
            debug!(?entity, "projectile expired");
            cmd.despawn(entity);
            continue;
        }

        let mut landed = false;
        match &mut projectile.trajectory {
            Trajectory::Straight => pos.0 += vel.0 * dt,
            Trajectory::Arc { start, end, duration, height, elapsed } => {
                *elapsed += dt;
                let progress = if *duration > 0.0 { *elapsed / *duration } else { 1.0 };
                if progress >= 1.0 {
                    pos.0 = *end;
                    landed = true;
                } else {
                    pos.0 = arc_point(*start, *end, *height, progress);
                }
            }
        }

        let owner = projectile.owner;
        let struck = targets
            .iter()
            .find(|t| t.faction != owner && circle_overlaps_box(pos.0, projectile.radius, &t.bounds));
        let hit_level = level
            .platforms()
            .iter()
            .any(|p| circle_overlaps_box(pos.0, projectile.radius, &Aabb::of_platform(p)));

        if struck.is_none() && !hit_level && !landed {
            continue;
        }

        match projectile.explosive {
            Some(radius) => {
                debug!(?entity, x = pos.0.x, y = pos.0.y, radius, "explosion");
                for t in targets
                    .iter()
                    .filter(|t| t.faction != owner && circle_overlaps_box(pos.0, radius, &t.bounds))
                {
                    events.push(DamageEvent { target: t.entity, amount: projectile.damage, source: owner });
                }
            }
            None => {
                if let Some(t) = struck {
                    debug!(?entity, target = ?t.entity, "projectile hit");
                    events.push(DamageEvent { target: t.entity, amount: projectile.damage, source: owner });
                }
            }
        }
        cmd.despawn(entity);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Surface;

    const DT: f32 = 1.0 / 60.0;

    fn actor(world: &mut World, at: Vec2, faction: Faction) -> Entity {
        world.spawn((
            Position(at),
            Body { half_extents: Vec2::new(0.5, 0.8) },
            faction,
            Health::full(100),
        ))
    }

    fn bullet(world: &mut World, at: Vec2, velocity: Vec2, owner: Faction) -> Entity {
        world.spawn((
            Position(at),
            Velocity(velocity),
            Projectile {
                damage: 10,
                owner,
                time_to_live: 5.0,
                radius: 0.1,
                trajectory: Trajectory::Straight,
                explosive: None,
            },
        ))
    }

    fn run(world: &mut World, level: &Level, ticks: usize) -> Vec<DamageEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            let mut cmd = CommandBuffer::new();
            events.extend(projectile_system(world, level, &mut cmd, DT));
            cmd.run_on(world);
        }
        events
    }

    #[test]
    fn enemy_projectile_never_damages_enemy() {
        let mut world = World::new();
        let level = Level::default();
        actor(&mut world, Vec2::new(2.0, 0.0), Faction::Enemy);
        let shot = bullet(&mut world, Vec2::ZERO, Vec2::new(10.0, 0.0), Faction::Enemy);

        assert!(run(&mut world, &level, 30).is_empty());
        assert!(world.contains(shot));
    }

    #[test]
    fn bullet_hits_opposing_actor_once() {
        let mut world = World::new();
        let level = Level::default();
        let enemy = actor(&mut world, Vec2::new(2.0, 0.0), Faction::Enemy);
        let shot = bullet(&mut world, Vec2::ZERO, Vec2::new(20.0, 0.0), Faction::Player);

        let events = run(&mut world, &level, 30);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, enemy);
        assert_eq!(events[0].source, Faction::Player);
        assert!(!world.contains(shot));
    }

    #[test]
    fn wall_stops_bullet() {
        let mut world = World::new();
        let mut level = Level::default();
        level.add(Vec2::new(1.0, -5.0), Vec2::new(2.0, 5.0), Surface::Wall);
        actor(&mut world, Vec2::new(4.0, 0.0), Faction::Enemy);
        let shot = bullet(&mut world, Vec2::ZERO, Vec2::new(20.0, 0.0), Faction::Player);

        assert!(run(&mut world, &level, 30).is_empty());
        assert!(!world.contains(shot));
    }

    #[test]
    fn bullet_expires() {
        let mut world = World::new();
        let level = Level::default();
        let shot = bullet(&mut world, Vec2::ZERO, Vec2::new(1.0, 0.0), Faction::Player);
        world.get::<&mut Projectile>(shot).unwrap().time_to_live = 0.1;
        run(&mut world, &level, 5);
        assert!(world.contains(shot));
        run(&mut world, &level, 2);
        assert!(!world.contains(shot));
    }

    #[test]
    fn grenade_lands_on_target_and_blasts_opposing_side() {
        let mut world = World::new();
        let level = Level::default();
        let player = actor(&mut world, Vec2::new(5.0, 0.0), Faction::Player);
        let ally = actor(&mut world, Vec2::new(5.5, 0.0), Faction::Enemy);
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(5.0, 0.0);
        let grenade = world.spawn((
            Position(start),
            Velocity(Vec2::new(5.0, 0.0)),
            Projectile {
                damage: 20,
                owner: Faction::Enemy,
                time_to_live: 10.0,
                radius: 0.15,
                // Arc apex at 3 keeps it clear of both actors until it drops.
                trajectory: Trajectory::Arc { start, end, duration: 1.0, height: 3.0, elapsed: 0.0 },
                explosive: Some(1.5),
            },
        ));

        let events = run(&mut world, &level, 61);
        assert!(!world.contains(grenade));
        assert!(events.iter().all(|e| e.target == player && e.amount == 20));
        assert_eq!(events.len(), 1);
        assert!(events.iter().all(|e| e.target != ally));
    }

    #[test]
    fn blast_reaches_bodies_whose_centre_is_outside_the_radius() {
        let mut world = World::new();
        let mut level = Level::default();
        level.add(Vec2::new(-10.0, -1.0), Vec2::new(10.0, 0.0), Surface::Ground);
        // Box edge 1.3 from the impact, centre about 1.9 away.
        let near = actor(&mut world, Vec2::new(6.8, 0.8), Faction::Player);
        let far = actor(&mut world, Vec2::new(8.0, 0.8), Faction::Player);
        world.spawn((
            Position(Vec2::new(5.0, 0.3)),
            Velocity(Vec2::new(0.0, -10.0)),
            Projectile {
                damage: 20,
                owner: Faction::Enemy,
                time_to_live: 10.0,
                radius: 0.15,
                trajectory: Trajectory::Straight,
                explosive: Some(1.5),
            },
        ));

        let events = run(&mut world, &level, 5);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, near);
        assert!(events.iter().all(|e| e.target != far));
    }
}
