use std::collections::HashSet;

use glam::Vec2;

/// Discrete player actions the simulation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Jump,
    Shoot,
    Roll,
    Crouch,
    Run,
}

/// Input sampled for one tick: a normalized movement vector, the actions held
/// down, and the actions pressed this tick.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub movement: Vec2,
    held: HashSet<Action>,
    pressed: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the movement vector, clamped to unit length.
    pub fn set_movement(&mut self, movement: Vec2) {
        self.movement = movement.clamp_length_max(1.0);
    }

    /// Mark `action` as held; pressing also holds it for this tick.
    pub fn hold(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn press(&mut self, action: Action) {
        self.pressed.insert(action);
        self.held.insert(action);
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// `true` only on the tick the action was pressed.
    pub fn triggered(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }
}

/// A span of scripted input: `movement` and `held` apply for the whole span,
/// `press` fires once on the tick the span starts.
#[derive(Debug, Clone)]
pub struct InputSegment {
    pub start: f32,
    pub end: f32,
    pub movement: Vec2,
    pub held: Vec<Action>,
    pub press: Vec<Action>,
}

impl InputSegment {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            movement: Vec2::ZERO,
            held: Vec::new(),
            press: Vec::new(),
        }
    }

    pub fn moving(mut self, x: f32) -> Self {
        self.movement = Vec2::new(x, 0.0);
        self
    }

    pub fn holding(mut self, action: Action) -> Self {
        self.held.push(action);
        self
    }

    pub fn pressing(mut self, action: Action) -> Self {
        self.press.push(action);
        self
    }
}

/// Timed input replay, standing in for a device reader in headless runs.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    segments: Vec<InputSegment>,
}

impl InputScript {
    pub fn new(segments: Vec<InputSegment>) -> Self {
        Self { segments }
    }

    /// Names accepted by [`InputScript::builtin`].
    pub const BUILTINS: [&'static str; 3] = ["idle", "assault", "parkour"];

    pub fn builtin(name: &str) -> Option<Self> {
        use Action::*;
        let segments = match name {
            "idle" => Vec::new(),
            // Push right into the brawler's patrol, shooting and dodging.
            "assault" => vec![
                InputSegment::new(0.5, 3.0).moving(1.0),
                InputSegment::new(3.0, 3.2).pressing(Shoot),
                InputSegment::new(3.5, 3.7).pressing(Shoot),
                InputSegment::new(4.0, 6.0).moving(1.0).holding(Run),
                InputSegment::new(6.0, 6.1).pressing(Roll),
                InputSegment::new(6.6, 6.8).pressing(Shoot),
                InputSegment::new(7.0, 7.2).pressing(Shoot),
                InputSegment::new(7.4, 7.6).pressing(Shoot),
                InputSegment::new(8.0, 8.1).pressing(Jump),
                InputSegment::new(8.2, 8.3).pressing(Jump),
                InputSegment::new(9.0, 12.0).moving(-1.0),
                InputSegment::new(12.0, 13.0).holding(Crouch),
            ],
            // Run at the raised platform, jump, catch the ledge and climb.
            "parkour" => vec![
                InputSegment::new(0.2, 1.2).moving(1.0).holding(Run),
                InputSegment::new(1.2, 1.3).moving(1.0).pressing(Jump),
                InputSegment::new(1.3, 2.0).moving(1.0),
                InputSegment::new(2.5, 2.6).pressing(Jump),
                InputSegment::new(3.5, 5.0).moving(1.0),
            ],
            _ => return None,
        };
        Some(Self::new(segments))
    }

    /// Input for the tick covering `(prev, now]` seconds of script time.
    pub fn sample(&self, prev: f32, now: f32) -> InputState {
        let mut input = InputState::new();
        for seg in &self.segments {
            if now >= seg.start && now < seg.end {
                input.set_movement(seg.movement);
                for &action in &seg.held {
                    input.hold(action);
                }
            }
            if seg.start > prev && seg.start <= now {
                for &action in &seg.press {
                    input.press(action);
                }
            }
        }
        input
    }
}
