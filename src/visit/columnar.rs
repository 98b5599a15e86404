//! Flat, column-oriented report for charting clients.
//!
//! Cases are numbered by a running counter across the whole tree. `meta`
//! describes each case under its counter; `data` holds one row per sample
//! (leader and followers alike) in parallel arrays, tagged with that counter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{walk, Visitor};
use crate::node::{Case, ExitCondition, Node, Sample};

/// Per-case description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseMeta {
    /// Output index within the device declaration.
    pub case: usize,
    /// Unique case id.
    pub uuid: String,
    /// Owning subsystem.
    pub subsystem: String,
    /// Device under test.
    pub device: i32,
    /// `timed` or `position`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Configured output.
    pub output: f64,
    /// Running duration in seconds, for timed cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Required encoder travel, for position cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoder_change: Option<i64>,
}

/// Sample rows as parallel arrays. Every array has the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Columns {
    /// Microseconds since the case entered running.
    pub timestamp: Vec<u64>,
    /// Device the row was measured on.
    pub device: Vec<i32>,
    /// Running case counter.
    pub case: Vec<usize>,
    /// Applied voltage.
    pub voltage: Vec<f64>,
    /// Encoder position.
    pub position: Vec<i64>,
    /// Encoder velocity.
    pub speed: Vec<f64>,
    /// Supply current.
    pub supply_current: Vec<f64>,
    /// Stator current.
    pub stator_current: Vec<f64>,
}

impl Columns {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    fn push(&mut self, counter: usize, device: i32, running_at: u64, sample: &Sample) {
        self.timestamp.push(sample.timestamp.saturating_sub(running_at));
        self.device.push(device);
        self.case.push(counter);
        self.voltage.push(sample.voltage);
        self.position.push(sample.position);
        self.speed.push(sample.speed);
        self.supply_current.push(sample.supply_current);
        self.stator_current.push(sample.stator_current);
    }
}

/// The `/data` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnarReport {
    /// Case descriptions keyed by running counter.
    pub meta: BTreeMap<usize, CaseMeta>,
    /// Sample rows.
    pub data: Columns,
}

impl ColumnarReport {
    /// Flattens every case below `root`.
    #[must_use]
    pub fn from_tree(root: &Node) -> Self {
        let mut visitor = ColumnarVisitor::default();
        walk(root, &mut visitor);
        visitor.report
    }

    /// Serializes the report.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; in practice only non-finite floats can
    /// cause one.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Default)]
struct ColumnarVisitor {
    report: ColumnarReport,
}

impl Visitor for ColumnarVisitor {
    #[allow(clippy::cast_precision_loss)]
    fn visit_case(&mut self, case: &Case, _depth: usize) {
        let counter = self.report.meta.len();
        let (duration, encoder_change) = match case.exit() {
            ExitCondition::Elapsed { micros } => (Some(micros as f64 / 1e6), None),
            ExitCondition::EncoderChange { ticks } => (None, Some(ticks)),
        };
        self.report.meta.insert(
            counter,
            CaseMeta {
                case: case.index(),
                uuid: case.id().to_string(),
                subsystem: case.subsystem().to_string(),
                device: case.device_id(),
                kind: case.exit().kind().to_string(),
                output: case.output(),
                duration,
                encoder_change,
            },
        );

        let running_at = case.running_at();
        for sample in case.samples() {
            self.report.data.push(counter, case.device_id(), running_at, sample);
        }
        for follower in case.followers() {
            for sample in follower.samples() {
                self.report.data.push(counter, follower.device_id(), running_at, sample);
            }
        }
    }
}
