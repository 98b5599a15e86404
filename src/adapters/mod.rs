//! Adapter implementations of the port traits.
//!
//! - `live`: real clock and random identifiers.
//! - `sim`: deterministic clock, identifiers and a simulated motor.
//! - `recording`: wrappers that capture interactions to a cassette.
//! - `replaying`: adapters that serve interactions back from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
pub mod sim;
