//! Deterministic adapters for simulation and tests.

pub mod clock;
pub mod id_gen;
pub mod motor;

pub use clock::ManualClock;
pub use id_gen::SequentialIdGenerator;
pub use motor::{SimParams, SimulatedMotor};
