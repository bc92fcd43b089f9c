use glam::Vec2;

use crate::components::{Facing, LedgeSensor, Surface};
use crate::scene::level::Level;
use crate::systems::collision::Aabb;

/// World-space sensor boxes for an actor at `position` facing `facing`.
/// Returns `(grip, clear)`.
pub fn sensor_boxes(position: Vec2, facing: Facing, sensor: &LedgeSensor) -> (Aabb, Aabb) {
    let mirror = |offset: Vec2| Vec2::new(offset.x * facing.sign(), offset.y);
    let grip = Aabb::from_center(position + mirror(sensor.grip_offset), sensor.grip_size * 0.5);
    let clear = Aabb::from_center(position + mirror(sensor.clear_offset), sensor.clear_size * 0.5);
    (grip, clear)
}

/// A grabbable ledge is in front: the grip box touches ground and the box
/// above it is empty.
pub fn sense_ledge(position: Vec2, facing: Facing, sensor: &LedgeSensor, level: &Level) -> bool {
    let (grip, clear) = sensor_boxes(position, facing, sensor);
    level.overlaps(&grip, Some(Surface::Ground)) && !level.overlaps(&clear, None)
}
