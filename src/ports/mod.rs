//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the check engine and an
//! external system (time, identifiers, motor controllers).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod id_gen;
pub mod motor;

pub use clock::Clock;
pub use id_gen::IdGenerator;
pub use motor::{DeviceHandle, MotorController};
