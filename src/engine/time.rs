use std::time::Instant;

/// Length of one simulation tick in seconds.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Upper bound on the frame time fed into the accumulator, so a stalled host
/// does not trigger a burst of catch-up ticks.
const MAX_FRAME_DT: f32 = 0.25;

/// Wall-clock frame timer, used when pacing a run in real time.
pub struct FrameTimer {
    last: Instant,
    pub dt: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            dt: 0.0,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
    }
}

/// Fixed-timestep accumulator: turns variable frame times into a whole number
/// of `FIXED_DT` ticks, carrying the remainder over to the next frame.
#[derive(Debug, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `frame_dt` seconds and return how many ticks are now due.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut ticks = 0;
        while self.accumulator >= FIXED_DT {
            self.accumulator -= FIXED_DT;
            ticks += 1;
        }
        ticks
    }
}
