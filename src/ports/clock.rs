//! Clock port for obtaining monotonic time.

/// Provides monotonic time in microseconds.
///
/// Cases measure every state duration against this clock, so tests and
/// cassette playback substitute a manual or recorded clock.
pub trait Clock: Send + Sync {
    /// Returns the current monotonic time in microseconds.
    fn now_micros(&self) -> u64;
}
