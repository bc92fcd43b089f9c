use hecs::{CommandBuffer, World};
use tracing::info;

use crate::components::{Cooldowns, DespawnTimer};

/// Count every action cooldown down by `dt`. Runs first in the tick so a
/// cooldown and a timed state of the same length expire together.
pub fn cooldown_system(world: &mut World, dt: f32) {
    for (_e, cooldowns) in world.query_mut::<&mut Cooldowns>() {
        cooldowns.tick(dt);
    }
}

/// Count removal timers down and queue removal of entities whose timer ran out.
pub fn despawn_system(world: &mut World, cmd: &mut CommandBuffer, dt: f32) {
    for (entity, timer) in world.query_mut::<&mut DespawnTimer>() {
        timer.0 -= dt;
        if timer.0 <= 0.0 {
            info!(?entity, "removed");
            cmd.despawn(entity);
        }
    }
}
