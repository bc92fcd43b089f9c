use glam::Vec2;
use hecs::{Entity, World};
use tracing::{debug, info};

use crate::components::{
    ActorFsm, ActorState, Alerted, Animator, DamageEvent, DespawnTimer, Enemy, Faction, Health,
    Velocity,
};
use crate::engine::anim::AnimationSink;

/// Subtract `amount` (negatives count as 0), flooring at 0.
///
/// Returns the new health and whether this call took the actor from alive to
/// depleted. Damage on an already depleted actor changes nothing and never
/// reports a second transition.
pub fn apply_damage(health: &mut Health, amount: i32) -> (i32, bool) {
    if health.is_depleted() {
        return (health.current, false);
    }
    health.current = health.current.saturating_sub(amount.max(0)).clamp(0, health.max);
    (health.current, health.is_depleted())
}

/// Add `amount`, capped at `max`. No-op on a depleted actor.
pub fn heal(health: &mut Health, amount: i32) -> i32 {
    if !health.is_depleted() {
        health.current = health.current.saturating_add(amount.max(0)).min(health.max);
    }
    health.current
}

/// Share of health left, in `[0, 1]`.
pub fn fraction(health: &Health) -> f32 {
    if health.max <= 0 {
        return 0.0;
    }
    (health.current as f32 / health.max as f32).clamp(0.0, 1.0)
}

/// Move an actor into `Dead`: stop it, freeze it, and schedule its removal.
/// Returns `false` if the actor was already dead.
pub fn enter_dead(world: &mut World, entity: Entity, removal_delay: f32) -> bool {
    let entered = match world.get::<&mut ActorFsm>(entity) {
        Ok(mut fsm) => fsm.go(ActorState::Dead),
        Err(_) => false,
    };
    if !entered {
        return false;
    }
    if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
        vel.0 = Vec2::ZERO;
    }
    if let Ok(mut anim) = world.get::<&mut Animator>(entity) {
        anim.set_bool("isDead", true);
    }
    if let Err(err) = world.insert_one(entity, DespawnTimer(removal_delay)) {
        debug!(?entity, %err, "removal timer not scheduled");
    }
    true
}

/// Apply queued damage in order. Enemies that survive a hit become alerted;
/// actors whose health crosses zero enter `Dead` exactly once.
pub fn damage_system(world: &mut World, events: &[DamageEvent], removal_delay: f32) {
    for event in events {
        let Ok(faction) = world.get::<&Faction>(event.target).map(|f| *f) else {
            // Target was removed earlier this tick.
            continue;
        };
        if faction == event.source {
            continue;
        }

        let outcome = match world.get::<&mut Health>(event.target) {
            Ok(mut health) => {
                let was_depleted = health.is_depleted();
                let (now, died) = apply_damage(&mut health, event.amount);
                (!was_depleted).then_some((now, died))
            }
            Err(_) => None,
        };
        let Some((now, died)) = outcome else {
            continue;
        };

        debug!(target = ?event.target, amount = event.amount, health = now, "damage applied");

        if died {
            if enter_dead(world, event.target, removal_delay) {
                info!(entity = ?event.target, ?faction, "actor died");
            }
            continue;
        }

        if let Ok(mut anim) = world.get::<&mut Animator>(event.target) {
            anim.set_trigger("takeDamage");
        }
        if world.get::<&Enemy>(event.target).is_ok() && world.get::<&Alerted>(event.target).is_err() {
            match world.insert_one(event.target, Alerted) {
                Ok(()) => info!(entity = ?event.target, "enemy alerted"),
                Err(err) => debug!(entity = ?event.target, %err, "enemy not alerted"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::EnemyKind;

    #[test]
    fn damage_then_death_scenario() {
        let mut hp = Health::full(100);
        assert_eq!(apply_damage(&mut hp, 50), (50, false));
        assert_eq!(apply_damage(&mut hp, 60), (0, true));
        assert_eq!(hp.current, 0);
    }

    #[test]
    fn damage_stays_within_bounds() {
        for max in [1, 7, 100] {
            for amount in 0..=250 {
                let mut hp = Health::full(max);
                let (now, _) = apply_damage(&mut hp, amount);
                assert!((0..=max).contains(&now), "max={max} amount={amount}");
                let (again, _) = apply_damage(&mut hp, amount);
                assert!((0..=max).contains(&again));
            }
        }
    }

    #[test]
    fn negative_damage_does_not_heal() {
        let mut hp = Health { current: 40, max: 100 };
        assert_eq!(apply_damage(&mut hp, -30), (40, false));
    }

    #[test]
    fn repeated_damage_on_depleted_is_noop() {
        let mut hp = Health::full(10);
        assert_eq!(apply_damage(&mut hp, 10), (0, true));
        assert_eq!(apply_damage(&mut hp, 10), (0, false));
        assert_eq!(apply_damage(&mut hp, 0), (0, false));
    }

    #[test]
    fn heal_caps_and_ignores_dead() {
        let mut hp = Health { current: 90, max: 100 };
        assert_eq!(heal(&mut hp, 25), 100);
        let mut dead = Health { current: 0, max: 100 };
        assert_eq!(heal(&mut dead, 25), 0);
    }

    #[test]
    fn huge_heal_and_damage_stay_in_bounds() {
        let mut hp = Health { current: 50, max: 100 };
        assert_eq!(heal(&mut hp, i32::MAX), 100);
        assert_eq!(apply_damage(&mut hp, i32::MAX), (0, true));
        assert_eq!(heal(&mut hp, i32::MAX), 0);
    }

    #[test]
    fn fraction_tracks_health() {
        assert_eq!(fraction(&Health { current: 25, max: 100 }), 0.25);
        assert_eq!(fraction(&Health { current: 0, max: 100 }), 0.0);
    }

    fn spawn_target(world: &mut World, faction: Faction) -> Entity {
        world.spawn((
            Health::full(100),
            faction,
            ActorFsm::new(ActorState::Patrolling),
            Velocity(Vec2::new(3.0, -1.0)),
            Animator::new(),
            Enemy(EnemyKind::Brawler),
        ))
    }

    #[test]
    fn lethal_damage_kills_once_and_schedules_removal() {
        let mut world = World::new();
        let e = spawn_target(&mut world, Faction::Enemy);
        let hit = DamageEvent { target: e, amount: 60, source: Faction::Player };

        damage_system(&mut world, &[hit], 5.0);
        assert_eq!(world.get::<&ActorFsm>(e).unwrap().state, ActorState::Patrolling);
        assert_eq!(world.get::<&Health>(e).unwrap().current, 40);
        assert!(world.get::<&DespawnTimer>(e).is_err());

        damage_system(&mut world, &[hit], 5.0);
        assert_eq!(world.get::<&Health>(e).unwrap().current, 0);
        let fsm = world.get::<&ActorFsm>(e).unwrap();
        assert_eq!(fsm.state, ActorState::Dead);
        assert_eq!(fsm.previous, ActorState::Patrolling);
        assert!(world.get::<&DespawnTimer>(e).is_ok());
    }

    #[test]
    fn death_transition_fires_exactly_once() {
        let mut world = World::new();
        let e = spawn_target(&mut world, Faction::Enemy);
        let lethal = DamageEvent { target: e, amount: 150, source: Faction::Player };

        damage_system(&mut world, &[lethal], 5.0);
        {
            let fsm = world.get::<&ActorFsm>(e).unwrap();
            assert_eq!(fsm.state, ActorState::Dead);
            assert_eq!(world.get::<&Velocity>(e).unwrap().0, Vec2::ZERO);
            assert_eq!(world.get::<&DespawnTimer>(e).unwrap().0, 5.0);
        }
        world.get::<&mut DespawnTimer>(e).unwrap().0 = 1.0;

        damage_system(&mut world, &[lethal], 5.0);
        assert_eq!(world.get::<&Health>(e).unwrap().current, 0);
        // Removal countdown was not restarted by the second hit.
        assert_eq!(world.get::<&DespawnTimer>(e).unwrap().0, 1.0);
    }

    #[test]
    fn surviving_enemy_becomes_alerted() {
        let mut world = World::new();
        let e = spawn_target(&mut world, Faction::Enemy);
        damage_system(
            &mut world,
            &[DamageEvent { target: e, amount: 10, source: Faction::Player }],
            5.0,
        );
        assert!(world.get::<&Alerted>(e).is_ok());
        assert!(world.get::<&Animator>(e).unwrap().triggered("takeDamage"));
    }

    #[test]
    fn friendly_damage_is_ignored() {
        let mut world = World::new();
        let e = spawn_target(&mut world, Faction::Enemy);
        damage_system(
            &mut world,
            &[DamageEvent { target: e, amount: 500, source: Faction::Enemy }],
            5.0,
        );
        assert_eq!(world.get::<&Health>(e).unwrap().current, 100);
        assert!(world.get::<&Alerted>(e).is_err());
    }
}
