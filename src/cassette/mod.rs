//! Cassettes: recorded device and clock interactions.
//!
//! A run against real (or simulated) hardware can be captured and later
//! replayed without any devices attached, regenerating the same report.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{Cassette, Interaction};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;
