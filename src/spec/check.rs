//! Check kinds a device field can declare.

use serde::{Deserialize, Serialize};

use super::limits::LimitsSpec;

/// Run each output for a fixed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSpec {
    /// Open-loop outputs to test, one case each.
    pub percent_output: Vec<f64>,
    /// Seconds to hold each output.
    pub duration: f64,
}

/// Run each output until the encoder has moved far enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSpec {
    /// Open-loop outputs to test, one case each.
    pub percent_output: Vec<f64>,
    /// Encoder ticks the device must travel before the case ends.
    pub encoder_change: i64,
}

/// Record this device alongside another device's cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowSpec {
    /// Device id of the leader.
    pub leader: i32,
}

/// The single check kind that applies to a device.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckSpec {
    /// Timed exit.
    Timed(TimedSpec),
    /// Encoder-delta exit.
    Position(PositionSpec),
    /// Measured under a leader's cases.
    Follow(FollowSpec),
}

/// More than one check kind was declared on the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictingKinds;

/// Everything declared on one device field.
///
/// Any combination can be written down; [`CheckDecl::resolve`] enforces
/// that at most one kind is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckDecl {
    /// Timed check, if declared.
    pub timed: Option<TimedSpec>,
    /// Position check, if declared.
    pub position: Option<PositionSpec>,
    /// Follow binding, if declared.
    pub follow: Option<FollowSpec>,
    /// Limits applied per output index.
    pub limits: Option<LimitsSpec>,
}

impl CheckDecl {
    /// Declares a timed check.
    #[must_use]
    pub fn timed(percent_output: Vec<f64>, duration: f64) -> Self {
        Self { timed: Some(TimedSpec { percent_output, duration }), ..Self::default() }
    }

    /// Declares a position check.
    #[must_use]
    pub fn position(percent_output: Vec<f64>, encoder_change: i64) -> Self {
        Self { position: Some(PositionSpec { percent_output, encoder_change }), ..Self::default() }
    }

    /// Declares a follow binding.
    #[must_use]
    pub fn follow(leader: i32) -> Self {
        Self { follow: Some(FollowSpec { leader }), ..Self::default() }
    }

    /// Attaches limits.
    #[must_use]
    pub fn with_limits(mut self, values: Vec<f64>) -> Self {
        self.limits = Some(LimitsSpec { values });
        self
    }

    /// Returns the one declared check kind, `None` if nothing was declared.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictingKinds`] when two or more kinds are declared.
    pub fn resolve(&self) -> Result<Option<CheckSpec>, ConflictingKinds> {
        let declared = [self.timed.is_some(), self.position.is_some(), self.follow.is_some()]
            .into_iter()
            .filter(|d| *d)
            .count();
        if declared > 1 {
            return Err(ConflictingKinds);
        }
        Ok(self
            .timed
            .clone()
            .map(CheckSpec::Timed)
            .or_else(|| self.position.clone().map(CheckSpec::Position))
            .or_else(|| self.follow.map(CheckSpec::Follow)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_kind_resolves() {
        let decl = CheckDecl::timed(vec![0.5, -0.5], 1.0);
        assert_eq!(
            decl.resolve(),
            Ok(Some(CheckSpec::Timed(TimedSpec { percent_output: vec![0.5, -0.5], duration: 1.0 })))
        );
        assert_eq!(CheckDecl::follow(3).resolve(), Ok(Some(CheckSpec::Follow(FollowSpec { leader: 3 }))));
    }

    #[test]
    fn nothing_declared_resolves_to_none() {
        assert_eq!(CheckDecl::default().resolve(), Ok(None));
    }

    #[test]
    fn timed_and_position_conflict() {
        let decl = CheckDecl {
            position: Some(PositionSpec { percent_output: vec![0.25], encoder_change: 100 }),
            ..CheckDecl::timed(vec![0.25], 1.0)
        };
        assert_eq!(decl.resolve(), Err(ConflictingKinds));
    }

    #[test]
    fn follow_conflicts_with_timed() {
        let decl = CheckDecl { follow: Some(FollowSpec { leader: 1 }), ..CheckDecl::timed(vec![0.1], 1.0) };
        assert_eq!(decl.resolve(), Err(ConflictingKinds));
    }

    #[test]
    fn parses_from_yaml() {
        let yaml = "position:\n  percent_output: [0.25, -0.25]\n  encoder_change: 20000\nlimits: [1, 5, 100, 200]\n";
        let decl: CheckDecl = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(decl.position.as_ref().map(|p| p.encoder_change), Some(20_000));
        assert_eq!(decl.limits.map(|l| l.values.len()), Some(4));
    }
}
