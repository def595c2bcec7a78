//! Frame clocks that feed [`Simulation::advance`](crate::Simulation::advance).

use std::time::{Duration, Instant};

use dungeon_crawler_core::Clock;

/// Longest frame delta the simulation accepts in one update.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Clock that only moves when told to, by a fixed step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedStepClock {
    step: Duration,
    elapsed: Duration,
}

impl FixedStepClock {
    /// Creates a clock at zero that advances by `step` per [`tick`](Self::tick).
    #[must_use]
    pub const fn new(step: Duration) -> Self {
        Self {
            step,
            elapsed: Duration::ZERO,
        }
    }

    /// Moves the clock forward by one step.
    pub fn tick(&mut self) {
        self.elapsed = self.elapsed.saturating_add(self.step);
    }

    /// Step applied by each tick.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }
}

impl Clock for FixedStepClock {
    fn now(&self) -> Duration {
        self.elapsed
    }
}

/// Wall clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    /// Starts measuring from now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Clamps a raw frame delta to [`MAX_FRAME_DELTA`].
#[must_use]
pub fn clamp_frame_delta(dt: Duration) -> Duration {
    dt.min(MAX_FRAME_DELTA)
}
