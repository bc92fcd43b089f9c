use hecs::World;

use crate::components::{
    ActorFsm, ActorState, Body, CollisionEvent, GravityScale, Position, Velocity,
};
use crate::scene::level::Level;
use crate::systems::collision::{box_contact, Aabb};

/// One fixed physics step for every body: gravity, integration, then
/// push-out against level geometry. Returns one event per resolved contact.
///
/// Gravity is skipped for states that suspend it; climbing bodies also skip
/// collision so the scripted lerp can pass over the lip of the ledge.
pub fn physics_step(world: &mut World, level: &Level, gravity: f32, dt: f32) -> Vec<CollisionEvent> {
    let mut events = Vec::new();

    for (entity, (pos, vel, body, scale, fsm)) in world.query_mut::<(
        &mut Position,
        &mut Velocity,
        &Body,
        Option<&GravityScale>,
        Option<&ActorFsm>,
    )>() {
        let state = fsm.map(|f| &f.state);
        let suspended = state.is_some_and(ActorState::suspends_gravity);
        if !suspended {
            let scale = scale.map_or(1.0, |s| s.0);
            vel.0.y -= gravity * scale * dt;
        }

        // Semi-implicit Euler: update velocity first, then position.
        pos.0 += vel.0 * dt;

        if matches!(state, Some(ActorState::Climbing { .. })) {
            continue;
        }

        for platform in level.platforms() {
            let moving = Aabb::from_center(pos.0, body.half_extents);
            let Some(contact) = box_contact(&moving, &Aabb::of_platform(platform)) else {
                continue;
            };
            pos.0 += contact.normal * contact.depth;
            // Cancel only the velocity component driving into the surface.
            let into = vel.0.dot(contact.normal);
            if into < 0.0 {
                vel.0 -= contact.normal * into;
            }
            events.push(CollisionEvent {
                entity,
                surface: platform.surface,
                normal: contact.normal,
            });
        }
    }

    events
}
