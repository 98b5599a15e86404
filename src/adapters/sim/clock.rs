//! Manually advanced clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::ports::clock::Clock;

/// Clock that only moves when told to.
///
/// The simulation loop advances it by one tick period per `execute()`, which
/// makes every state-machine transition reproducible.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock starting at the given time.
    #[must_use]
    pub fn starting_at(micros: u64) -> Self {
        Self { micros: AtomicU64::new(micros) }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let step = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_add(step, Ordering::SeqCst);
    }

    /// Moves the clock forward by a raw number of microseconds.
    pub fn advance_micros(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u64 {
        self.micros.load(Ordering::SeqCst)
    }
}
