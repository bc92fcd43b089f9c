use glam::Vec2;

use crate::components::{Platform, Surface};
use crate::systems::collision::Aabb;

/// How far a ground top may sit above a sensor point and still count as
/// "below" it. Covers push-out rounding for bodies resting on that top.
const GROUND_SLACK: f32 = 1e-3;

/// Static level geometry plus spawn points.
#[derive(Debug, Clone, Default)]
pub struct Level {
    platforms: Vec<Platform>,
}

impl Level {
    pub fn new(platforms: Vec<Platform>) -> Self {
        Self { platforms }
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn add(&mut self, min: Vec2, max: Vec2, surface: Surface) {
        self.platforms.push(Platform { min, max, surface });
    }

    /// Platforms whose box overlaps `aabb`, optionally filtered by surface.
    pub fn overlaps(&self, aabb: &Aabb, surface: Option<Surface>) -> bool {
        self.platforms
            .iter()
            .filter(|p| surface.map_or(true, |s| p.surface == s))
            .any(|p| Aabb::of_platform(p).overlaps(aabb))
    }

    /// Whether a ground top lies under `point` within `depth`.
    pub fn has_ground_below(&self, point: Vec2, depth: f32) -> bool {
        self.platforms.iter().any(|p| {
            p.surface == Surface::Ground
                && point.x >= p.min.x
                && point.x <= p.max.x
                && p.max.y <= point.y + GROUND_SLACK
                && p.max.y >= point.y - depth
        })
    }
}
