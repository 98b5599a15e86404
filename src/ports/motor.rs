//! Motor-controller port.

use std::sync::Arc;

/// A motor controller under test.
///
/// The driver behind this trait is owned elsewhere; the check engine only
/// commands open-loop output and reads telemetry. Methods take `&self` so a
/// single device can be shared between the cases that exercise it and the
/// leader cases it follows.
pub trait MotorController: Send + Sync {
    /// Returns the CAN id (or equivalent) of this device.
    fn device_id(&self) -> i32;

    /// Commands an open-loop output in the range `-1.0..=1.0`.
    fn set_percent_output(&self, output: f64);

    /// Returns the selected encoder position in native ticks.
    fn position(&self) -> i64;

    /// Returns the selected encoder velocity in native ticks per 100 ms.
    fn velocity(&self) -> f64;

    /// Returns the voltage currently applied to the motor.
    fn output_voltage(&self) -> f64;

    /// Returns the current drawn from the supply, in amps.
    fn supply_current(&self) -> f64;

    /// Returns the current through the motor windings, in amps.
    fn stator_current(&self) -> f64;
}

/// Shared handle to a device under test.
pub type DeviceHandle = Arc<dyn MotorController>;
