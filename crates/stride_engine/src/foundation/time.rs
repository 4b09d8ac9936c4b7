//! Time management utilities

/// Fixed-timestep accumulator decoupling simulation ticks from render frames.
///
/// Feed it wall-clock frame deltas with [`advance`](Self::advance) and run one
/// simulation step per returned tick. [`alpha`](Self::alpha) exposes the
/// fraction of a tick left in the accumulator, for interpolating presentation
/// state between the previous and current simulation poses.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FixedTimestep {
    /// Create an accumulator running at `tick_rate` ticks per second
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            step: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
        }
    }

    /// Duration of one simulation tick in seconds
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Add a frame's elapsed time and return how many whole ticks to simulate
    pub fn advance(&mut self, frame_seconds: f32) -> u32 {
        self.accumulator += frame_seconds.max(0.0);
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        ticks
    }

    /// Fraction of the next tick already elapsed, in `[0, 1)`
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Drop any accumulated time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
