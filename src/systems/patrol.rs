use glam::Vec2;
use rand::Rng;

use crate::components::{Patrol, PatrolRoute};
use crate::scene::level::Level;

/// What a patrolling actor should do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatrolStep {
    /// Walk along this horizontal heading (`x` is -1 or 1).
    Walk(Vec2),
    /// Stand still: waiting at a waypoint, or no usable route.
    Wait,
}

/// Pick a horizontal patrol offset with `min_distance <= |offset| <= range`.
///
/// Samples the magnitude directly from the allowed band and flips a coin for
/// the side, so it always terminates. Returns `None` for a zero-length or
/// empty band (`range <= 0` or `min_distance > range`).
pub fn pick_offset<R: Rng + ?Sized>(rng: &mut R, range: f32, min_distance: f32) -> Option<f32> {
    let min_distance = min_distance.max(0.0);
    if range <= 0.0 || min_distance > range {
        return None;
    }
    let magnitude = if min_distance < range {
        rng.gen_range(min_distance..=range)
    } else {
        range
    };
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Some(magnitude * sign)
}

fn next_waypoint<R: Rng + ?Sized>(patrol: &mut Patrol, rng: &mut R) -> Option<Vec2> {
    match &mut patrol.route {
        PatrolRoute::Random { range, min_distance } => {
            pick_offset(rng, *range, *min_distance).map(|dx| patrol.origin + Vec2::new(dx, 0.0))
        }
        PatrolRoute::Waypoints { points, next } => {
            if points.is_empty() {
                return None;
            }
            let point = points[*next % points.len()];
            *next = (*next + 1) % points.len();
            Some(point)
        }
        PatrolRoute::Edges { .. } => None,
    }
}

/// Advance a patrol by one tick.
///
/// Waypoint routes walk toward the current waypoint; once within `epsilon`
/// (measured horizontally, since walkers cannot change height) the actor waits
/// `wait_time` seconds and then heads for a freshly chosen waypoint. Edge routes
/// walk the current platform and turn around where the ground sensor ahead
/// finds nothing.
pub fn step_patrol<R: Rng + ?Sized>(
    patrol: &mut Patrol,
    position: Vec2,
    half_extents: Vec2,
    level: &Level,
    rng: &mut R,
    epsilon: f32,
    dt: f32,
) -> PatrolStep {
    if let PatrolRoute::Edges { direction, look_ahead, look_depth } = &mut patrol.route {
        let sensor = |dir: f32| {
            Vec2::new(
                position.x + dir * (half_extents.x + *look_ahead),
                position.y - half_extents.y,
            )
        };
        if !level.has_ground_below(sensor(*direction), *look_depth) {
            *direction = -*direction;
            if !level.has_ground_below(sensor(*direction), *look_depth) {
                return PatrolStep::Wait;
            }
        }
        return PatrolStep::Walk(Vec2::new(*direction, 0.0));
    }

    if patrol.is_waiting() {
        patrol.wait_remaining -= dt;
        if patrol.wait_remaining <= 0.0 {
            patrol.wait_remaining = 0.0;
            patrol.waypoint = next_waypoint(patrol, rng);
        }
        return PatrolStep::Wait;
    }

    if patrol.waypoint.is_none() {
        patrol.waypoint = next_waypoint(patrol, rng);
    }
    let Some(waypoint) = patrol.waypoint else {
        return PatrolStep::Wait;
    };

    let dx = waypoint.x - position.x;
    if dx.abs() < epsilon {
        patrol.wait_remaining = patrol.wait_time;
        if patrol.wait_remaining <= 0.0 {
            patrol.waypoint = next_waypoint(patrol, rng);
        }
        return PatrolStep::Wait;
    }
    PatrolStep::Walk(Vec2::new(dx.signum(), 0.0))
}
