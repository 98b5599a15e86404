//! Recording adapter for the `MotorController` port.

use serde::Serialize;

use super::{record_interaction, SharedRecorder};
use crate::cassette::format::motor_port;
use crate::ports::{DeviceHandle, MotorController};

/// Records commands and telemetry reads of one device.
pub struct RecordingMotor {
    inner: DeviceHandle,
    port: String,
    recorder: SharedRecorder,
}

impl RecordingMotor {
    /// Wraps `inner`; interactions are recorded under `motor:<id>`.
    pub fn new(inner: DeviceHandle, recorder: SharedRecorder) -> Self {
        let port = motor_port(inner.device_id());
        Self { inner, port, recorder }
    }

    fn read<T: Serialize + Copy>(&self, method: &str, value: T) -> T {
        record_interaction(&self.recorder, &self.port, method, &(), &value);
        value
    }
}

impl MotorController for RecordingMotor {
    fn device_id(&self) -> i32 {
        self.inner.device_id()
    }

    fn set_percent_output(&self, output: f64) {
        self.inner.set_percent_output(output);
        record_interaction(&self.recorder, &self.port, "set_percent_output", &output, &());
    }

    fn position(&self) -> i64 {
        self.read("position", self.inner.position())
    }

    fn velocity(&self) -> f64 {
        self.read("velocity", self.inner.velocity())
    }

    fn output_voltage(&self) -> f64 {
        self.read("output_voltage", self.inner.output_voltage())
    }

    fn supply_current(&self) -> f64 {
        self.read("supply_current", self.inner.supply_current())
    }

    fn stator_current(&self) -> f64 {
        self.read("stator_current", self.inner.stator_current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::recording::shared;
    use crate::adapters::sim::{ManualClock, SimParams, SimulatedMotor};
    use crate::cassette::CassetteRecorder;
    use std::sync::Arc;

    #[test]
    fn records_commands_and_reads_under_device_port() {
        let dir = std::env::temp_dir().join("healthcheck_recording_motor_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("motor.cassette.yaml");

        let recorder = shared(CassetteRecorder::new(&path, "test", "test"));
        let clock = Arc::new(ManualClock::new());
        let sim: DeviceHandle = Arc::new(SimulatedMotor::new(12, SimParams::default(), clock));
        {
            let motor = RecordingMotor::new(sim, Arc::clone(&recorder));
            motor.set_percent_output(0.3);
            let _ = motor.position();
            let _ = motor.output_voltage();
            assert_eq!(motor.device_id(), 12);
        }

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        recorder.save().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("motor:12"));
        assert!(content.contains("set_percent_output"));
        assert!(content.contains("output_voltage"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
