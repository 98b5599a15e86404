//! Service context bundling the port trait objects of one session.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use log::info;

use crate::adapters::live::{LiveClock, LiveIdGenerator};
use crate::adapters::recording::{self, RecordingClock, RecordingMotor, SharedRecorder};
use crate::adapters::replaying::{ReplayingClock, ReplayingMotor};
use crate::adapters::sim::{ManualClock, SequentialIdGenerator, SimParams, SimulatedMotor};
use crate::builder::{Builder, CheckSettings};
use crate::cassette::{Cassette, CassetteRecorder};
use crate::error::CassetteError;
use crate::ports::{Clock, DeviceHandle, IdGenerator};

/// Where devices come from.
enum Devices {
    /// Simulated motors integrating on `clock`.
    Simulated { clock: Arc<dyn Clock> },
    /// Devices answering from a cassette.
    Replaying(Box<Cassette>),
}

/// How the session moves time forward between ticks.
enum Pacing {
    /// Advance a manual clock by one period.
    Manual(Arc<ManualClock>),
    /// Sleep for one period of wall time.
    RealTime,
    /// Time is read from a cassette.
    Replayed,
}

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up different adapter implementations (simulated, live,
/// recording, replaying); the rest of the crate only sees the ports.
pub struct ServiceContext {
    /// Clock read by every case.
    pub clock: Arc<dyn Clock>,
    /// Source of case ids.
    pub id_gen: Arc<dyn IdGenerator>,
    devices: Devices,
    pacing: Pacing,
    recorder: Option<SharedRecorder>,
}

impl ServiceContext {
    /// Fully deterministic simulation: manual clock, sequential ids,
    /// simulated motors.
    #[must_use]
    pub fn simulated() -> Self {
        let clock = Arc::new(ManualClock::new());
        Self {
            clock: clock.clone(),
            id_gen: Arc::new(SequentialIdGenerator::new("case")),
            devices: Devices::Simulated { clock: clock.clone() },
            pacing: Pacing::Manual(clock),
            recorder: None,
        }
    }

    /// Simulated motors running in wall time with random case ids.
    #[must_use]
    pub fn live() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(LiveClock::new());
        Self {
            clock: Arc::clone(&clock),
            id_gen: Arc::new(LiveIdGenerator::new()),
            devices: Devices::Simulated { clock },
            pacing: Pacing::RealTime,
            recorder: None,
        }
    }

    /// Deterministic simulation whose clock and device interactions are
    /// recorded to a cassette at `path`. Call [`ServiceContext::finish`] to
    /// write it.
    #[must_use]
    pub fn recording(path: &Path, source: &str) -> Self {
        let recorder = recording::shared(CassetteRecorder::new(path, "healthcheck-run", source));
        let clock = Arc::new(ManualClock::new());
        Self {
            clock: Arc::new(RecordingClock::new(clock.clone(), Arc::clone(&recorder))),
            id_gen: Arc::new(SequentialIdGenerator::new("case")),
            devices: Devices::Simulated { clock: clock.clone() },
            pacing: Pacing::Manual(clock),
            recorder: Some(recorder),
        }
    }

    /// Replays a recorded session.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, CassetteError> {
        let cassette = Cassette::load(path)?;
        info!("replaying {} interactions from {}", cassette.interactions.len(), path.display());
        Ok(Self {
            clock: Arc::new(ReplayingClock::new(&cassette)),
            id_gen: Arc::new(SequentialIdGenerator::new("case")),
            devices: Devices::Replaying(Box::new(cassette)),
            pacing: Pacing::Replayed,
            recorder: None,
        })
    }

    /// Returns the device with `id`, wrapped for recording when this session
    /// records.
    pub fn device(&self, id: i32, params: &SimParams) -> DeviceHandle {
        let device: DeviceHandle = match &self.devices {
            Devices::Simulated { clock } => {
                Arc::new(SimulatedMotor::new(id, params.clone(), Arc::clone(clock)))
            }
            Devices::Replaying(cassette) => Arc::new(ReplayingMotor::new(id, cassette)),
        };
        match &self.recorder {
            Some(recorder) => Arc::new(RecordingMotor::new(device, Arc::clone(recorder))),
            None => device,
        }
    }

    /// A builder reading this session's clock and ids.
    #[must_use]
    pub fn builder(&self, settings: CheckSettings) -> Builder {
        Builder::new(Arc::clone(&self.clock), Arc::clone(&self.id_gen)).with_settings(settings)
    }

    /// Lets one scheduler period pass.
    pub fn step(&self, period: Duration) {
        match &self.pacing {
            Pacing::Manual(clock) => clock.advance(period),
            Pacing::RealTime => std::thread::sleep(period),
            Pacing::Replayed => {}
        }
    }

    /// Writes the cassette of a recording session; returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn finish(self) -> Result<Option<PathBuf>, CassetteError> {
        match self.recorder {
            Some(recorder) => {
                let guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
                info!("writing {} recorded interactions", guard.len());
                guard.save().map(Some)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_step_advances_the_clock() {
        let ctx = ServiceContext::simulated();
        ctx.step(Duration::from_millis(20));
        ctx.step(Duration::from_millis(20));
        assert_eq!(ctx.clock.now_micros(), 40_000);
        assert_eq!(ctx.id_gen.case_id(), "case-0");
    }

    #[test]
    fn simulated_devices_respond_to_output() {
        let ctx = ServiceContext::simulated();
        let motor = ctx.device(4, &SimParams::default());
        motor.set_percent_output(1.0);
        ctx.step(Duration::from_millis(500));
        assert_eq!(motor.device_id(), 4);
        assert!(motor.velocity() > 0.0);
    }

    #[test]
    fn recorded_session_replays_the_same_readings() {
        let path = std::env::temp_dir().join("healthcheck-context-roundtrip.yaml");
        let ctx = ServiceContext::recording(&path, "unit-test");
        let motor = ctx.device(9, &SimParams::default());
        motor.set_percent_output(0.5);
        ctx.step(Duration::from_millis(100));
        let recorded = (ctx.clock.now_micros(), motor.position(), motor.velocity());
        assert_eq!(ctx.finish().unwrap(), Some(path.clone()));

        let replay = ServiceContext::replaying(&path).unwrap();
        let motor = replay.device(9, &SimParams::default());
        motor.set_percent_output(0.5);
        replay.step(Duration::from_millis(100));
        let replayed = (replay.clock.now_micros(), motor.position(), motor.velocity());
        std::fs::remove_file(&path).ok();

        assert_eq!(replayed, recorded);
    }

    #[test]
    fn plain_sessions_have_nothing_to_finish() {
        assert_eq!(ServiceContext::simulated().finish().unwrap(), None);
    }
}
