//! Leaf check: one device at one output level.
//!
//! A case walks its device through
//! `Initializing -> [Reversing] -> Starting -> Running -> Stopping`, one
//! transition per `execute()` at most, and records a [`Sample`] for the
//! device (and for each attached follower) on every running tick.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;

use super::sample::{Averages, Sample};
use crate::ports::{Clock, DeviceHandle};
use crate::spec::Limits;

/// Time allowed for a device to coast down before it is driven in the
/// opposite direction.
pub const REVERSING_DURATION_MICROS: u64 = 1_000_000;

/// Phases of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    /// Output zeroed, about to start or reverse.
    Initializing,
    /// Waiting for the device to coast down after a direction change.
    Reversing,
    /// Output applied; running begins on the next tick.
    Starting,
    /// Sampling until the exit condition holds.
    Running,
    /// Output zeroed, case done.
    Stopping,
}

/// What ends the running phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCondition {
    /// Running lasts longer than this many microseconds.
    Elapsed {
        /// Microseconds.
        micros: u64,
    },
    /// The encoder has moved at least this many ticks from where running began.
    EncoderChange {
        /// Encoder ticks.
        ticks: i64,
    },
}

impl ExitCondition {
    /// Short name of the variant as reported to clients.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Elapsed { .. } => "timed",
            Self::EncoderChange { .. } => "position",
        }
    }
}

/// A device measured under another device's case.
pub struct Follower {
    device: DeviceHandle,
    field: String,
    samples: Vec<Sample>,
}

impl Follower {
    /// Id of the follower device.
    #[must_use]
    pub fn device_id(&self) -> i32 {
        self.device.device_id()
    }

    /// Field the follower was declared on.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Samples recorded during the leader's running phase.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Mean of the recorded samples.
    #[must_use]
    pub fn averages(&self) -> Averages {
        Averages::of(&self.samples)
    }
}

/// Returns `true` if output `index` drives the device in the opposite
/// direction to output `index - 1`. Zero has no direction.
#[must_use]
pub fn is_reversing(outputs: &[f64], index: usize) -> bool {
    fn sign(x: f64) -> i8 {
        if x > 0.0 {
            1
        } else if x < 0.0 {
            -1
        } else {
            0
        }
    }
    match index.checked_sub(1).and_then(|prev| outputs.get(prev)) {
        Some(&prev) => outputs.get(index).is_some_and(|&cur| sign(prev) * sign(cur) < 0),
        None => false,
    }
}

/// A single-output-level physical test of one device.
pub struct Case {
    id: String,
    subsystem: String,
    index: usize,
    output: f64,
    exit: ExitCondition,
    reversing: bool,
    limits: Limits,
    timeout: Option<u64>,
    device: DeviceHandle,
    clock: Arc<dyn Clock>,
    followers: Vec<Follower>,

    state: CaseState,
    initialized_at: u64,
    running_at: u64,
    start_position: i64,
    samples: Vec<Sample>,
    timed_out: bool,
    finished: bool,
}

impl Case {
    /// Creates a case for output `index` of a device.
    pub fn new(
        id: impl Into<String>,
        subsystem: impl Into<String>,
        device: DeviceHandle,
        index: usize,
        output: f64,
        exit: ExitCondition,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id: id.into(),
            subsystem: subsystem.into(),
            index,
            output,
            exit,
            reversing: false,
            limits: Limits::default(),
            timeout: None,
            device,
            clock,
            followers: Vec::new(),
            state: CaseState::Initializing,
            initialized_at: 0,
            running_at: 0,
            start_position: 0,
            samples: Vec::new(),
            timed_out: false,
            finished: false,
        }
    }

    /// Marks the case as a direction change from the previous output.
    #[must_use]
    pub fn reversing(mut self, reversing: bool) -> Self {
        self.reversing = reversing;
        self
    }

    /// Sets the limits the averages are judged against.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Stops the running phase after `timeout` even if the exit condition
    /// was never met.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.map(|t| u64::try_from(t.as_micros()).unwrap_or(u64::MAX));
        self
    }

    /// Records `device` on every running tick of this case.
    pub fn add_follower(&mut self, device: DeviceHandle, field: impl Into<String>) {
        self.followers.push(Follower { device, field: field.into(), samples: Vec::new() });
    }

    /// Unique identity of the case.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, e.g. `case 1 (-50%)`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("case {} ({:+.0}%)", self.index, self.output * 100.0)
    }

    /// Owning subsystem.
    #[must_use]
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Output index within the device's declaration.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Device under test.
    #[must_use]
    pub fn device_id(&self) -> i32 {
        self.device.device_id()
    }

    /// Configured open-loop output.
    #[must_use]
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Exit condition of the running phase.
    #[must_use]
    pub fn exit(&self) -> ExitCondition {
        self.exit
    }

    /// Whether this case reverses the previous one's direction.
    #[must_use]
    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    /// Configured limits.
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> CaseState {
        self.state
    }

    /// Clock time at which running began.
    #[must_use]
    pub fn running_at(&self) -> u64 {
        self.running_at
    }

    /// Leader samples.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Attached followers.
    #[must_use]
    pub fn followers(&self) -> &[Follower] {
        &self.followers
    }

    /// Whether the running phase was cut short by the timeout.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Whether the case has reached `Stopping`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Mean of the leader samples.
    #[must_use]
    pub fn averages(&self) -> Averages {
        Averages::of(&self.samples)
    }

    /// Limit violations of the leader averages; empty when passing or unchecked.
    #[must_use]
    pub fn violations(&self) -> Vec<String> {
        let avg = self.averages();
        let mut out = self.limits.violations(avg.supply_current, avg.speed);
        if self.timed_out {
            out.push("timed out before reaching encoder change".to_string());
        }
        out
    }

    /// Returns the case to `Initializing` and discards earlier samples.
    pub fn initialize(&mut self) {
        self.state = CaseState::Initializing;
        self.samples.clear();
        for follower in &mut self.followers {
            follower.samples.clear();
        }
        self.timed_out = false;
        self.finished = false;
    }

    /// Advances the state machine by one tick.
    pub fn execute(&mut self) {
        if self.finished {
            return;
        }
        let now = self.clock.now_micros();
        match self.state {
            CaseState::Initializing => {
                self.device.set_percent_output(0.0);
                self.initialized_at = now;
                if self.reversing {
                    self.enter(CaseState::Reversing);
                } else {
                    self.start();
                }
            }
            CaseState::Reversing => {
                if now.saturating_sub(self.initialized_at) > REVERSING_DURATION_MICROS {
                    self.start();
                }
            }
            CaseState::Starting => {
                self.running_at = now;
                self.start_position = self.device.position();
                self.enter(CaseState::Running);
            }
            CaseState::Running => self.run(now),
            CaseState::Stopping => self.finished = true,
        }
    }

    fn start(&mut self) {
        self.device.set_percent_output(self.output);
        self.enter(CaseState::Starting);
    }

    fn run(&mut self, now: u64) {
        let elapsed = now.saturating_sub(self.running_at);
        match self.exit {
            ExitCondition::Elapsed { micros } => {
                self.measure(now);
                if elapsed > micros {
                    self.stop();
                }
            }
            ExitCondition::EncoderChange { ticks } => {
                let travelled = self.device.position().abs_diff(self.start_position);
                if travelled >= ticks.unsigned_abs() {
                    self.stop();
                } else if self.timeout.is_some_and(|limit| elapsed > limit) {
                    warn!(
                        "{} device {} {}: moved {travelled} of {ticks} ticks before timing out",
                        self.subsystem,
                        self.device_id(),
                        self.name()
                    );
                    self.timed_out = true;
                    self.stop();
                } else {
                    self.measure(now);
                }
            }
        }
    }

    fn measure(&mut self, now: u64) {
        self.samples.push(Sample::measure(self.device.as_ref(), now));
        for follower in &mut self.followers {
            follower.samples.push(Sample::measure(follower.device.as_ref(), now));
        }
    }

    fn stop(&mut self) {
        self.device.set_percent_output(0.0);
        self.enter(CaseState::Stopping);
        self.finished = true;
    }

    fn enter(&mut self, state: CaseState) {
        debug!("device {} {}: {:?} -> {state:?}", self.device_id(), self.name(), self.state);
        self.state = state;
    }
}
