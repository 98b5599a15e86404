//! Recording adapters that capture interactions to a cassette.

pub mod clock;
pub mod motor;

pub use clock::RecordingClock;
pub use motor::RecordingMotor;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

/// Shared recorder handle; every recording adapter of a session appends to
/// the same cassette so that sequence numbers interleave.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Creates a shared recorder for a session.
pub fn shared(recorder: CassetteRecorder) -> SharedRecorder {
    Arc::new(Mutex::new(recorder))
}

/// Appends one interaction to the shared recorder.
///
/// Mirror of `replaying::next_output`.
pub(crate) fn record_interaction<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let input_json = serde_json::to_value(input).expect("failed to serialize recording input");
    let output_json = serde_json::to_value(output).expect("failed to serialize recording output");

    let mut guard = recorder.lock().expect("recorder lock poisoned");
    guard.record(port, method, input_json, output_json);
}
