//! Declarative check specifications.
//!
//! These are the per-field declarations a subsystem makes about its devices:
//! which kind of check to run, at which outputs, and with which limits.
//! The builder turns them into cases.

mod check;
mod limits;

pub use check::{CheckDecl, CheckSpec, ConflictingKinds, FollowSpec, PositionSpec, TimedSpec};
pub use limits::{Limits, LimitsSpec};
