//! Test doubles shared by unit tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::ports::MotorController;

/// Motor whose position is set by the test and whose commands are logged.
pub struct ProbeMotor {
    id: i32,
    position: AtomicI64,
    outputs: Mutex<Vec<f64>>,
}

impl ProbeMotor {
    pub fn new(id: i32) -> Self {
        Self { id, position: AtomicI64::new(0), outputs: Mutex::new(Vec::new()) }
    }

    pub fn set_position(&self, ticks: i64) {
        self.position.store(ticks, Ordering::SeqCst);
    }

    pub fn outputs(&self) -> Vec<f64> {
        self.outputs.lock().unwrap().clone()
    }
}

impl MotorController for ProbeMotor {
    fn device_id(&self) -> i32 {
        self.id
    }

    fn set_percent_output(&self, output: f64) {
        self.outputs.lock().unwrap().push(output);
    }

    fn position(&self) -> i64 {
        self.position.load(Ordering::SeqCst)
    }

    fn velocity(&self) -> f64 {
        100.0
    }

    fn output_voltage(&self) -> f64 {
        6.0
    }

    fn supply_current(&self) -> f64 {
        2.0
    }

    fn stator_current(&self) -> f64 {
        4.0
    }
}
