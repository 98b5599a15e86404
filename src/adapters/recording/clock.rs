//! Recording adapter for the `Clock` port.

use std::sync::Arc;

use super::{record_interaction, SharedRecorder};
use crate::ports::Clock;

/// Records every clock read while delegating to an inner clock.
pub struct RecordingClock {
    inner: Arc<dyn Clock>,
    recorder: SharedRecorder,
}

impl RecordingClock {
    /// Wraps `inner`, appending reads to `recorder`.
    pub fn new(inner: Arc<dyn Clock>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl Clock for RecordingClock {
    fn now_micros(&self) -> u64 {
        let now = self.inner.now_micros();
        record_interaction(&self.recorder, "clock", "now_micros", &(), &now);
        now
    }
}
