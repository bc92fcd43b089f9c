use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Body, Faction, Health, Platform, Position};

/// Axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn of_platform(platform: &Platform) -> Self {
        Self {
            min: platform.min,
            max: platform.max,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

/// How to push a moving box out of a static one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit axis pointing from the static box toward the moving one.
    pub normal: Vec2,
    pub depth: f32,
}

/// Separate `moving` from `fixed` along the axis of least penetration.
/// All returned normals point from `fixed` toward `moving`.
pub fn box_contact(moving: &Aabb, fixed: &Aabb) -> Option<Contact> {
    if !moving.overlaps(fixed) {
        return None;
    }
    let push_right = fixed.max.x - moving.min.x;
    let push_left = moving.max.x - fixed.min.x;
    let push_up = fixed.max.y - moving.min.y;
    let push_down = moving.max.y - fixed.min.y;

    let (normal, depth) = [
        (Vec2::X, push_right),
        (Vec2::NEG_X, push_left),
        (Vec2::Y, push_up),
        (Vec2::NEG_Y, push_down),
    ]
    .into_iter()
    .min_by(|a, b| a.1.total_cmp(&b.1))?;

    Some(Contact { normal, depth })
}

pub fn circle_overlaps_box(center: Vec2, radius: f32, aabb: &Aabb) -> bool {
    aabb.closest_point(center).distance_squared(center) <= radius * radius
}

/// Pairs of living actors from opposite factions whose bodies overlap.
/// Each pair is reported once, player-faction entity first.
pub fn hostile_overlaps(world: &World) -> Vec<(Entity, Entity)> {
    let actors: Vec<(Entity, Aabb, Faction)> = world
        .query::<(&Position, &Body, &Faction, &Health)>()
        .iter()
        .filter(|(_e, (_p, _b, _f, health))| !health.is_depleted())
        .map(|(e, (pos, body, faction, _h))| (e, Aabb::from_center(pos.0, body.half_extents), *faction))
        .collect();

    let mut pairs = Vec::new();
    for (i, (a, box_a, faction_a)) in actors.iter().enumerate() {
        for (b, box_b, faction_b) in &actors[i + 1..] {
            if faction_a == faction_b || !box_a.overlaps(box_b) {
                continue;
            }
            if *faction_a == Faction::Player {
                pairs.push((*a, *b));
            } else {
                pairs.push((*b, *a));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_pushes_up() {
        let floor = Aabb { min: Vec2::new(-10.0, -1.0), max: Vec2::new(10.0, 0.0) };
        let body = Aabb::from_center(Vec2::new(0.0, 0.85), Vec2::new(0.4, 0.9));
        let contact = box_contact(&body, &floor).expect("overlap");
        assert_eq!(contact.normal, Vec2::Y);
        assert!((contact.depth - 0.05).abs() < 1e-5);
    }

    #[test]
    fn wall_pushes_sideways() {
        let wall = Aabb { min: Vec2::new(5.0, 0.0), max: Vec2::new(6.0, 10.0) };
        let body = Aabb::from_center(Vec2::new(4.7, 3.0), Vec2::new(0.4, 0.9));
        let contact = box_contact(&body, &wall).expect("overlap");
        assert_eq!(contact.normal, Vec2::NEG_X);
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let floor = Aabb { min: Vec2::new(-10.0, -1.0), max: Vec2::new(10.0, 0.0) };
        let body = Aabb::from_center(Vec2::new(0.0, 0.9), Vec2::new(0.4, 0.9));
        assert!(box_contact(&body, &floor).is_none());
    }

    #[test]
    fn circle_against_box() {
        let b = Aabb { min: Vec2::ZERO, max: Vec2::ONE };
        assert!(circle_overlaps_box(Vec2::new(1.05, 0.5), 0.1, &b));
        assert!(!circle_overlaps_box(Vec2::new(1.2, 0.5), 0.1, &b));
        assert!(circle_overlaps_box(Vec2::new(0.5, 0.5), 0.01, &b));
    }
}
