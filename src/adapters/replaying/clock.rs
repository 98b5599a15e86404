//! Replaying adapter for the `Clock` port.

use std::sync::Mutex;

use super::next_output;
use crate::cassette::{Cassette, CassetteReplayer};
use crate::ports::clock::Clock;

/// Serves recorded clock reads in order.
pub struct ReplayingClock {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingClock {
    /// Creates a replaying clock from the clock entries of a cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        Self { replayer: Mutex::new(CassetteReplayer::for_ports(cassette, |p| p == "clock")) }
    }
}

impl Clock for ReplayingClock {
    fn now_micros(&self) -> u64 {
        next_output(&self.replayer, "clock", "now_micros")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::test_support::cassette;
    use serde_json::json;

    #[test]
    fn serves_recorded_times() {
        let cassette = cassette(&[
            ("clock", "now_micros", json!(0)),
            ("motor:1", "position", json!(3)),
            ("clock", "now_micros", json!(20_000)),
        ]);
        let clock = ReplayingClock::new(&cassette);
        assert_eq!(clock.now_micros(), 0);
        assert_eq!(clock.now_micros(), 20_000);
    }
}
