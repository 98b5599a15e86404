//! Live clock backed by the system's monotonic clock.

use std::time::Instant;

use crate::ports::clock::Clock;

/// Live clock that reports microseconds elapsed since it was created.
pub struct LiveClock {
    origin: Instant,
}

impl LiveClock {
    /// Creates a clock whose zero is the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for LiveClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for LiveClock {
    fn now_micros(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_never_goes_backwards() {
        let clock = LiveClock::new();
        let first = clock.now_micros();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = clock.now_micros();

        assert!(second >= first + 1_000);
    }
}
