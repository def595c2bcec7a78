//! Virtual clock advanced exclusively by tick commands.

use std::time::Duration;

use dungeon_crawler_core::Clock;

/// Monotonic simulated time measured from world creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct GameClock {
    elapsed: Duration,
}

impl GameClock {
    /// Moves the clock forward by `dt`.
    pub(crate) fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }
}

impl Clock for GameClock {
    fn now(&self) -> Duration {
        self.elapsed
    }
}

/// Reports whether a cooldown that last started at `last_use` has elapsed.
///
/// Abilities that were never used are always ready.
pub(crate) fn cooldown_elapsed(
    last_use: Option<Duration>,
    cooldown: Duration,
    now: Duration,
) -> bool {
    last_use.map_or(true, |started| now.saturating_sub(started) >= cooldown)
}
