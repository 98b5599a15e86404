//! Replaying adapters that serve recorded interactions.

pub mod clock;
pub mod motor;

pub use clock::ReplayingClock;
pub use motor::ReplayingMotor;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;

/// Pops the next recorded output for `port`/`method` and deserializes it.
///
/// Mirror of `recording::record_interaction`.
pub(crate) fn next_output<T: DeserializeOwned>(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> T {
    let output = {
        let mut replayer = replayer.lock().expect("replayer lock poisoned");
        replayer.next_interaction(port, method).output.clone()
    };
    serde_json::from_value(output)
        .unwrap_or_else(|e| panic!("{port}::{method}: recorded output has wrong shape: {e}"))
}
