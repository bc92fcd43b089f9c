use glam::Vec2;
use hecs::World;
use tracing::debug;

use crate::components::{
    ActionKind, ContactDamage, Cooldowns, DamageEvent, Delivery, Facing, Faction, Projectile,
    ProjectileSpawnRequest, Trajectory, Weapon,
};
use crate::systems::collision::hostile_overlaps;

/// Shortest flight time for an arc, so a target at point-blank range still
/// gets a well-defined trajectory.
const MIN_ARC_DURATION: f32 = 0.05;

/// Which attack band a distance falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBand {
    Melee,
    Shoot,
}

/// The bands are exclusive and the closer one wins: anything inside
/// `melee_range` is a melee distance even if it is also inside `shoot_range`.
pub fn classify_range(weapon: &Weapon, distance: f32) -> Option<RangeBand> {
    if weapon.melee_range > 0.0 && distance <= weapon.melee_range {
        Some(RangeBand::Melee)
    } else if weapon.shoot_range > 0.0 && distance <= weapon.shoot_range {
        Some(RangeBand::Shoot)
    } else {
        None
    }
}

/// Fire at `target` if it is in the shoot band and the shoot cooldown is ready.
///
/// On fire the cooldown restarts and a spawn request aimed at the target's
/// current position is returned. Melee distances never produce a projectile.
pub fn try_attack(
    cooldowns: &mut Cooldowns,
    weapon: &Weapon,
    from: Vec2,
    target: Vec2,
) -> Option<ProjectileSpawnRequest> {
    if classify_range(weapon, from.distance(target)) != Some(RangeBand::Shoot) {
        return None;
    }
    if !cooldowns.try_start(ActionKind::Shoot, weapon.cooldown) {
        return None;
    }
    Some(aimed_request(weapon, from, target))
}

/// Start a melee swing if the target is in the melee band and the swing is
/// off cooldown.
pub fn try_melee(cooldowns: &mut Cooldowns, weapon: &Weapon, from: Vec2, target: Vec2) -> bool {
    classify_range(weapon, from.distance(target)) == Some(RangeBand::Melee)
        && cooldowns.try_start(ActionKind::Melee, weapon.cooldown)
}

/// Hit check at the end of a wind-up. Fizzles if the target left the melee
/// band or is already dead.
pub fn resolve_melee(weapon: &Weapon, from: Vec2, target: Option<(Vec2, bool)>) -> bool {
    match target {
        Some((pos, alive)) => {
            alive && classify_range(weapon, from.distance(pos)) == Some(RangeBand::Melee)
        }
        None => false,
    }
}

/// Fire straight along `facing` without a target (the player's gun).
pub fn fire_forward(
    cooldowns: &mut Cooldowns,
    weapon: &Weapon,
    origin: Vec2,
    facing: Facing,
) -> Option<ProjectileSpawnRequest> {
    if !cooldowns.try_start(ActionKind::Shoot, weapon.cooldown) {
        return None;
    }
    let spec = weapon.projectile;
    Some(ProjectileSpawnRequest {
        position: origin,
        velocity: Vec2::new(facing.sign() * spec.speed, 0.0),
        projectile: projectile(weapon, Trajectory::Straight),
    })
}

/// Position along a sinusoidal arc at `progress` in `[0, 1]`.
pub fn arc_point(start: Vec2, end: Vec2, height: f32, progress: f32) -> Vec2 {
    let t = progress.clamp(0.0, 1.0);
    let base = start.lerp(end, t);
    Vec2::new(base.x, base.y + height * (std::f32::consts::PI * t).sin())
}

fn projectile(weapon: &Weapon, trajectory: Trajectory) -> Projectile {
    let spec = weapon.projectile;
    Projectile {
        damage: spec.damage,
        owner: weapon.owner,
        time_to_live: spec.time_to_live,
        radius: spec.radius,
        trajectory,
        explosive: spec.explosive,
    }
}

fn aimed_request(weapon: &Weapon, from: Vec2, target: Vec2) -> ProjectileSpawnRequest {
    let speed = weapon.projectile.speed;
    match weapon.delivery {
        Delivery::Straight => ProjectileSpawnRequest {
            position: from,
            velocity: (target - from).normalize_or(Vec2::X) * speed,
            projectile: projectile(weapon, Trajectory::Straight),
        },
        Delivery::Arc { height } => {
            let distance = from.distance(target);
            let duration = if speed > 0.0 {
                (distance / speed).max(MIN_ARC_DURATION)
            } else {
                MIN_ARC_DURATION
            };
            ProjectileSpawnRequest {
                position: from,
                velocity: (target - from) / duration,
                projectile: projectile(
                    weapon,
                    Trajectory::Arc {
                        start: from,
                        end: target,
                        duration,
                        height,
                        elapsed: 0.0,
                    },
                ),
            }
        }
    }
}

/// Enemies with [`ContactDamage`] hurt the player they overlap, at most once
/// per their own contact cooldown.
pub fn contact_damage_system(world: &mut World) -> Vec<DamageEvent> {
    let mut events = Vec::new();
    for (player, enemy) in hostile_overlaps(world) {
        let Ok(mut query) = world.query_one::<(&ContactDamage, &mut Cooldowns, &Faction)>(enemy)
        else {
            continue;
        };
        let Some((contact, cooldowns, faction)) = query.get() else {
            continue;
        };
        if cooldowns.try_start(ActionKind::Contact, contact.cooldown) {
            debug!(?enemy, ?player, amount = contact.amount, "contact hit");
            events.push(DamageEvent {
                target: player,
                amount: contact.amount,
                source: *faction,
            });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Body, Health, Position, ProjectileSpec};
    use crate::config::Tuning;

    fn gun(shoot_range: f32) -> Weapon {
        Weapon {
            owner: Faction::Enemy,
            melee_range: 2.0,
            shoot_range,
            cooldown: 1.0,
            projectile: ProjectileSpec {
                speed: 10.0,
                damage: 5,
                time_to_live: 3.0,
                radius: 0.1,
                explosive: None,
            },
            delivery: Delivery::Straight,
        }
    }

    #[test]
    fn closer_band_wins() {
        let w = gun(8.0);
        assert_eq!(classify_range(&w, 1.0), Some(RangeBand::Melee));
        assert_eq!(classify_range(&w, 2.0), Some(RangeBand::Melee));
        assert_eq!(classify_range(&w, 5.0), Some(RangeBand::Shoot));
        assert_eq!(classify_range(&w, 9.0), None);
    }

    #[test]
    fn at_most_one_shot_per_cooldown() {
        let w = gun(8.0);
        let mut cd = Cooldowns::new();
        let from = Vec2::ZERO;
        let target = Vec2::new(5.0, 0.0);

        let mut shots = 0;
        // Twenty attempts spread over 0.95 s: all within one cooldown.
        for _ in 0..20 {
            if try_attack(&mut cd, &w, from, target).is_some() {
                shots += 1;
            }
            cd.tick(0.05);
        }
        assert_eq!(shots, 1);

        cd.tick(0.1);
        assert!(try_attack(&mut cd, &w, from, target).is_some());
    }

    #[test]
    fn out_of_band_does_not_consume_cooldown() {
        let w = gun(8.0);
        let mut cd = Cooldowns::new();
        assert!(try_attack(&mut cd, &w, Vec2::ZERO, Vec2::new(20.0, 0.0)).is_none());
        assert!(try_attack(&mut cd, &w, Vec2::ZERO, Vec2::new(1.0, 0.0)).is_none());
        assert!(cd.ready(ActionKind::Shoot));
    }

    #[test]
    fn straight_shot_aims_at_target() {
        let w = gun(8.0);
        let mut cd = Cooldowns::new();
        let req = try_attack(&mut cd, &w, Vec2::ZERO, Vec2::new(0.0, -4.0)).expect("fires");
        assert_eq!(req.velocity, Vec2::new(0.0, -10.0));
        assert_eq!(req.projectile.owner, Faction::Enemy);
        assert_eq!(req.projectile.trajectory, Trajectory::Straight);
    }

    #[test]
    fn grenade_arc_takes_distance_over_speed() {
        let tuning = Tuning::default();
        let w = tuning.bomber.weapon();
        let mut cd = Cooldowns::new();
        let from = Vec2::new(15.0, 3.5);
        let target = Vec2::new(10.0, 3.5);
        let req = try_attack(&mut cd, &w, from, target).expect("in range");
        match req.projectile.trajectory {
            Trajectory::Arc { start, end, duration, height, .. } => {
                assert_eq!(start, from);
                assert_eq!(end, target);
                assert!((duration - 1.0).abs() < 1e-6);
                assert_eq!(height, 2.0);
            }
            other => panic!("expected arc, got {other:?}"),
        }
        assert_eq!(req.projectile.explosive, Some(1.5));
    }

    #[test]
    fn arc_peaks_midway_and_lands_on_target() {
        let start = Vec2::new(0.0, 1.0);
        let end = Vec2::new(4.0, 1.0);
        assert_eq!(arc_point(start, end, 2.0, 0.0), start);
        let mid = arc_point(start, end, 2.0, 0.5);
        assert!((mid - Vec2::new(2.0, 3.0)).length() < 1e-5);
        assert!((arc_point(start, end, 2.0, 1.0) - end).length() < 1e-5);
    }

    #[test]
    fn melee_fizzles_when_target_leaves_or_dies() {
        let w = gun(0.0);
        assert!(resolve_melee(&w, Vec2::ZERO, Some((Vec2::new(1.5, 0.0), true))));
        assert!(!resolve_melee(&w, Vec2::ZERO, Some((Vec2::new(3.0, 0.0), true))));
        assert!(!resolve_melee(&w, Vec2::ZERO, Some((Vec2::new(1.0, 0.0), false))));
        assert!(!resolve_melee(&w, Vec2::ZERO, None));
    }

    #[test]
    fn forward_fire_follows_facing() {
        let tuning = Tuning::default();
        let w = tuning.player_weapon();
        let mut cd = Cooldowns::new();
        let req = fire_forward(&mut cd, &w, Vec2::ZERO, Facing::Left).expect("ready");
        assert_eq!(req.velocity, Vec2::new(-20.0, 0.0));
        assert_eq!(req.projectile.owner, Faction::Player);
        assert!(fire_forward(&mut cd, &w, Vec2::ZERO, Facing::Left).is_none());
    }

    #[test]
    fn contact_damage_is_rate_limited() {
        let mut world = World::new();
        let player = world.spawn((
            Position(Vec2::ZERO),
            Body { half_extents: Vec2::new(0.4, 0.9) },
            Faction::Player,
            Health::full(100),
        ));
        world.spawn((
            Position(Vec2::new(0.5, 0.0)),
            Body { half_extents: Vec2::new(0.5, 0.8) },
            Faction::Enemy,
            Health::full(100),
            Cooldowns::new(),
            ContactDamage { amount: 10, cooldown: 1.0 },
        ));

        let first = contact_damage_system(&mut world);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].target, player);
        assert_eq!(first[0].source, Faction::Enemy);
        assert!(contact_damage_system(&mut world).is_empty());
    }
}
