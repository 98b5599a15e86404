//! Replaying adapter for the `MotorController` port.

use std::sync::Mutex;

use super::next_output;
use crate::cassette::format::motor_port;
use crate::cassette::{Cassette, CassetteReplayer};
use crate::ports::MotorController;

/// A device that answers from a cassette instead of hardware.
pub struct ReplayingMotor {
    id: i32,
    port: String,
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingMotor {
    /// Creates a replaying device serving the `motor:<id>` entries of a cassette.
    #[must_use]
    pub fn new(id: i32, cassette: &Cassette) -> Self {
        let port = motor_port(id);
        let replayer = CassetteReplayer::for_ports(cassette, |p| p == port);
        Self { id, port, replayer: Mutex::new(replayer) }
    }
}

impl MotorController for ReplayingMotor {
    fn device_id(&self) -> i32 {
        self.id
    }

    fn set_percent_output(&self, _output: f64) {
        let () = next_output(&self.replayer, &self.port, "set_percent_output");
    }

    fn position(&self) -> i64 {
        next_output(&self.replayer, &self.port, "position")
    }

    fn velocity(&self) -> f64 {
        next_output(&self.replayer, &self.port, "velocity")
    }

    fn output_voltage(&self) -> f64 {
        next_output(&self.replayer, &self.port, "output_voltage")
    }

    fn supply_current(&self) -> f64 {
        next_output(&self.replayer, &self.port, "supply_current")
    }

    fn stator_current(&self) -> f64 {
        next_output(&self.replayer, &self.port, "stator_current")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::test_support::cassette;
    use serde_json::json;

    #[test]
    fn answers_only_from_its_own_port() {
        let cassette = cassette(&[
            ("motor:4", "set_percent_output", json!(null)),
            ("motor:5", "position", json!(999)),
            ("motor:4", "position", json!(120)),
            ("motor:4", "supply_current", json!(3.25)),
        ]);
        let motor = ReplayingMotor::new(4, &cassette);

        motor.set_percent_output(0.5);
        assert_eq!(motor.position(), 120);
        assert!((motor.supply_current() - 3.25).abs() < f64::EPSILON);
        assert_eq!(motor.device_id(), 4);
    }

    #[test]
    #[should_panic(expected = "Cassette exhausted")]
    fn reading_past_the_recording_panics() {
        let cassette = cassette(&[("motor:4", "velocity", json!(1.0))]);
        let motor = ReplayingMotor::new(4, &cassette);
        let _ = motor.velocity();
        let _ = motor.velocity();
    }
}
