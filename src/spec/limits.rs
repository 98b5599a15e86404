//! Pass/fail limits for case measurements.

use serde::{Deserialize, Serialize};

/// Limits for one output level. All zero means "not checked".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Minimum average supply current, amps.
    pub current_min: f64,
    /// Maximum average supply current, amps.
    pub current_max: f64,
    /// Minimum average speed, ticks per 100 ms.
    pub speed_min: f64,
    /// Maximum average speed, ticks per 100 ms.
    pub speed_max: f64,
}

impl Limits {
    /// Returns `true` when no limit was configured.
    #[must_use]
    pub fn is_unchecked(&self) -> bool {
        *self == Self::default()
    }

    /// Compares averages against these limits, returning one message per
    /// violated bound.
    #[must_use]
    pub fn violations(&self, supply_current: f64, speed: f64) -> Vec<String> {
        if self.is_unchecked() {
            return Vec::new();
        }
        let mut out = Vec::new();
        if supply_current < self.current_min {
            out.push(format!("supply current {supply_current:.2} A below {:.2} A", self.current_min));
        }
        if supply_current > self.current_max {
            out.push(format!("supply current {supply_current:.2} A above {:.2} A", self.current_max));
        }
        if speed < self.speed_min {
            out.push(format!("speed {speed:.1} below {:.1}", self.speed_min));
        }
        if speed > self.speed_max {
            out.push(format!("speed {speed:.1} above {:.1}", self.speed_max));
        }
        out
    }
}

/// Flat limit values as declared: `current_min, current_max, speed_min,
/// speed_max`, repeated for each output index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LimitsSpec {
    /// Repeating groups of four values.
    pub values: Vec<f64>,
}

impl LimitsSpec {
    /// Returns the limits for output `index`; an incomplete group of values
    /// yields unchecked limits.
    #[must_use]
    pub fn for_output(&self, index: usize) -> Limits {
        match self.values.get(index * 4..index * 4 + 4) {
            Some(&[current_min, current_max, speed_min, speed_max]) => {
                Limits { current_min, current_max, speed_min, speed_max }
            }
            _ => Limits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_of_four_per_output() {
        let spec = LimitsSpec { values: vec![1.0, 5.0, 100.0, 200.0, 2.0, 6.0, -200.0, -100.0] };
        assert_eq!(
            spec.for_output(1),
            Limits { current_min: 2.0, current_max: 6.0, speed_min: -200.0, speed_max: -100.0 }
        );
        assert_eq!(spec.for_output(0).current_max, 5.0);
    }

    #[test]
    fn short_group_is_unchecked() {
        let spec = LimitsSpec { values: vec![1.0, 5.0, 100.0, 200.0, 2.0, 6.0] };
        assert!(spec.for_output(1).is_unchecked());
        assert!(spec.for_output(7).is_unchecked());
    }

    #[test]
    fn violations_report_each_bound() {
        let limits = Limits { current_min: 1.0, current_max: 5.0, speed_min: 100.0, speed_max: 200.0 };
        assert!(limits.violations(3.0, 150.0).is_empty());

        let failures = limits.violations(7.5, 50.0);
        assert_eq!(failures.len(), 2);
        assert!(failures[0].contains("above"));
        assert!(failures[1].contains("below"));
    }

    #[test]
    fn unchecked_limits_never_fail() {
        assert!(Limits::default().violations(1_000.0, -1_000.0).is_empty());
    }
}
