use glam::Vec2;
use hecs::{Entity, World};

use crate::components::Surface;
use crate::config::Tuning;
use crate::scene::level::Level;
use crate::scene::prefabs::{spawn_bomber, spawn_brawler, spawn_player};

/// Build and populate the default arena: a walled floor with one raised
/// block, a brawler patrolling the left side and a bomber on top of the block.
/// Returns the level geometry and the player entity.
pub fn load_arena(world: &mut World, tuning: &Tuning) -> (Level, Entity) {
    let mut level = Level::default();

    level.add(Vec2::new(-30.0, -1.0), Vec2::new(30.0, 0.0), Surface::Ground);
    level.add(Vec2::new(-31.0, -1.0), Vec2::new(-30.0, 20.0), Surface::Wall);
    level.add(Vec2::new(30.0, -1.0), Vec2::new(31.0, 20.0), Surface::Wall);
    // Raised block: its left lip is the ledge the player can grab.
    level.add(Vec2::new(12.0, 0.0), Vec2::new(18.0, 2.5), Surface::Ground);

    let player = spawn_player(world, tuning, Vec2::new(0.0, 2.0));
    spawn_brawler(world, tuning, Vec2::new(-16.0, 1.0));
    spawn_bomber(world, tuning, Vec2::new(15.0, 3.2));

    (level, player)
}
