//! Simulated motor controller.
//!
//! Models a brushed/brushless DC motor as a first-order speed response to the
//! commanded output. Position integrates velocity; currents follow the
//! `I = (V - back_emf) / R` shape scaled to the configured stall current.
//! State is advanced lazily from the shared clock whenever the device is
//! touched, so the model needs no thread of its own.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::ports::{Clock, MotorController};

/// Physical parameters of a simulated motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Encoder velocity at full output, in ticks per 100 ms.
    pub free_speed: f64,
    /// Time constant of the speed response, in seconds.
    pub time_constant: f64,
    /// Supply voltage.
    pub bus_voltage: f64,
    /// Stator current with the rotor locked at full output, in amps.
    pub stall_current: f64,
    /// Stator current when spinning freely, in amps.
    pub free_current: f64,
    /// Simulates a mechanically jammed or unplugged motor: output is accepted
    /// but the rotor never turns.
    pub stalled: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            free_speed: 20_000.0,
            time_constant: 0.05,
            bus_voltage: 12.0,
            stall_current: 40.0,
            free_current: 1.5,
            stalled: false,
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    output: f64,
    velocity: f64,
    position: f64,
    last_update: Option<u64>,
}

/// In-process stand-in for a motor controller.
pub struct SimulatedMotor {
    id: i32,
    params: SimParams,
    clock: Arc<dyn Clock>,
    state: Mutex<SimState>,
}

impl SimulatedMotor {
    /// Creates a motor at rest at position zero.
    #[must_use]
    pub fn new(id: i32, params: SimParams, clock: Arc<dyn Clock>) -> Self {
        Self { id, params, clock, state: Mutex::new(SimState::default()) }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SimState, &SimParams) -> T) -> T {
        let now = self.clock.now_micros();
        let mut state = self.state.lock().expect("simulated motor lock poisoned");
        self.integrate(&mut state, now);
        f(&mut state, &self.params)
    }

    #[allow(clippy::cast_precision_loss)]
    fn integrate(&self, state: &mut SimState, now: u64) {
        let Some(last) = state.last_update.replace(now) else {
            return;
        };
        let dt = now.saturating_sub(last) as f64 / 1e6;
        if dt <= 0.0 {
            return;
        }
        let target = if self.params.stalled { 0.0 } else { state.output * self.params.free_speed };
        let alpha = if self.params.time_constant > 0.0 {
            1.0 - (-dt / self.params.time_constant).exp()
        } else {
            1.0
        };
        state.velocity += (target - state.velocity) * alpha;
        // velocity is per 100 ms
        state.position += state.velocity * dt * 10.0;
    }

    fn stator(state: &SimState, params: &SimParams) -> f64 {
        if state.output == 0.0 {
            return 0.0;
        }
        let back_emf =
            if params.free_speed > 0.0 { state.velocity / params.free_speed } else { 0.0 };
        params.free_current + params.stall_current * (state.output - back_emf).abs().min(1.0)
    }
}

impl MotorController for SimulatedMotor {
    fn device_id(&self) -> i32 {
        self.id
    }

    fn set_percent_output(&self, output: f64) {
        self.with_state(|state, _| state.output = output.clamp(-1.0, 1.0));
    }

    #[allow(clippy::cast_possible_truncation)]
    fn position(&self) -> i64 {
        self.with_state(|state, _| state.position.round() as i64)
    }

    fn velocity(&self) -> f64 {
        self.with_state(|state, _| state.velocity)
    }

    fn output_voltage(&self) -> f64 {
        self.with_state(|state, params| state.output * params.bus_voltage)
    }

    fn supply_current(&self) -> f64 {
        self.with_state(|state, params| Self::stator(state, params) * state.output.abs())
    }

    fn stator_current(&self) -> f64 {
        self.with_state(|state, params| Self::stator(state, params))
    }
}
