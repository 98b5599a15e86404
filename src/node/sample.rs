//! Measurement snapshots.

use serde::{Deserialize, Serialize};

use crate::ports::MotorController;

/// One measurement taken while a case is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Clock time of the measurement, microseconds.
    pub timestamp: u64,
    /// Applied motor voltage.
    pub voltage: f64,
    /// Encoder position, ticks.
    pub position: i64,
    /// Encoder velocity, ticks per 100 ms.
    pub speed: f64,
    /// Supply current, amps.
    pub supply_current: f64,
    /// Stator current, amps.
    pub stator_current: f64,
}

impl Sample {
    /// Reads a full snapshot from `device`.
    pub fn measure(device: &dyn MotorController, timestamp: u64) -> Self {
        Self {
            timestamp,
            voltage: device.output_voltage(),
            position: device.position(),
            speed: device.velocity(),
            supply_current: device.supply_current(),
            stator_current: device.stator_current(),
        }
    }
}

/// Mean values over a run of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Averages {
    /// Mean voltage.
    pub voltage: f64,
    /// Mean speed.
    pub speed: f64,
    /// Mean supply current.
    pub supply_current: f64,
    /// Mean stator current.
    pub stator_current: f64,
}

impl Averages {
    /// Averages `samples`; all zero when there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(samples: &[Sample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let sum = samples.iter().fold(Self::default(), |acc, s| Self {
            voltage: acc.voltage + s.voltage,
            speed: acc.speed + s.speed,
            supply_current: acc.supply_current + s.supply_current,
            stator_current: acc.stator_current + s.stator_current,
        });
        Self {
            voltage: sum.voltage / n,
            speed: sum.speed / n,
            supply_current: sum.supply_current / n,
            stator_current: sum.stator_current / n,
        }
    }
}
