use glam::Vec2;
use hecs::Entity;

/// World-space position of the entity's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

/// Linear velocity in world units per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec2);

/// Multiplier on world gravity. 0.0 = floats, 1.0 = normal fall.
#[derive(Debug, Clone, Copy)]
pub struct GravityScale(pub f32);

/// Axis-aligned collision box centred on `Position`.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub half_extents: Vec2,
}

/// Marker: entity is standing on a ground surface (rebuilt every physics step).
pub struct Grounded;

/// What a piece of level geometry counts as for collision reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Ground,
    Wall,
}

/// Static level geometry. Not an entity: the level owns the list.
#[derive(Debug, Clone, Copy)]
pub struct Platform {
    pub min: Vec2,
    pub max: Vec2,
    pub surface: Surface,
}

/// Contact between an actor body and level geometry produced by the physics step.
/// `normal` points away from the surface, toward the actor.
#[derive(Debug, Clone, Copy)]
pub struct CollisionEvent {
    pub entity: Entity,
    pub surface: Surface,
    pub normal: Vec2,
}
