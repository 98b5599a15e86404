//! Robot configuration files.
//!
//! A YAML file describes the robot's subsystems the way their code would
//! declare them: device fields with their checks, device groups, lifecycle
//! hooks, and simulation parameters for each device.
//!
//! ```yaml
//! settings:
//!   tick_period_ms: 20
//!   position_timeout_secs: 5
//! subsystems:
//!   - name: intake
//!     devices:
//!       - field: roller
//!         id: 20
//!         checks:
//!           timed: { percent_output: [0.5, -0.5], duration: 2 }
//!           limits: [1, 8, 8000, 12000, 1, 8, -12000, -8000]
//!     before:
//!       - name: deploy
//!         polls: 5
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::adapters::sim::SimParams;
use crate::builder::{
    CheckSettings, DeviceField, DeviceGroup, FieldValue, GroupRole, HookDecl, SubsystemDecl,
};
use crate::error::ConfigError;
use crate::node::HookFn;
use crate::ports::DeviceHandle;
use crate::spec::CheckDecl;

const MOTOR_TYPE: &str = "motor";

fn default_true() -> bool {
    true
}

fn default_type() -> String {
    MOTOR_TYPE.to_string()
}

fn default_tick_period() -> u64 {
    20
}

fn default_polls() -> u32 {
    1
}

/// Run-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Scheduler period in milliseconds.
    #[serde(default = "default_tick_period")]
    pub tick_period_ms: u64,
    /// Optional cap on the running phase of position checks, in seconds.
    #[serde(default)]
    pub position_timeout_secs: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { tick_period_ms: default_tick_period(), position_timeout_secs: None }
    }
}

impl Settings {
    /// Scheduler period.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Settings handed to the builder.
    #[must_use]
    pub fn check_settings(&self) -> CheckSettings {
        CheckSettings { position_timeout: self.position_timeout_secs.map(Duration::from_secs_f64) }
    }
}

/// A device field of a subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Field name.
    pub field: String,
    /// Device id.
    pub id: i32,
    /// Check order within the subsystem.
    #[serde(default)]
    pub order: i32,
    /// Whether the field is marked for health checks.
    #[serde(default = "default_true")]
    pub health_check: bool,
    /// `false` simulates a field whose device cannot be obtained.
    #[serde(default = "default_true")]
    pub accessible: bool,
    /// Field type; anything other than `motor` is not a checkable device.
    #[serde(default = "default_type", rename = "type")]
    pub type_name: String,
    /// Simulation parameters.
    #[serde(default)]
    pub sim: SimParams,
    /// Declared checks.
    #[serde(default)]
    pub checks: CheckDecl,
}

/// One physical device of a group role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberConfig {
    /// Device id.
    pub id: i32,
    /// Simulation parameters.
    #[serde(default)]
    pub sim: SimParams,
}

/// Devices sharing one role within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    /// Role name.
    pub role: String,
    /// Devices in the role.
    pub devices: Vec<MemberConfig>,
    /// Check applied through the role's leader.
    #[serde(default)]
    pub checks: CheckDecl,
}

/// A device group such as a set of swerve modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    /// Group name.
    pub name: String,
    /// Check order within the subsystem.
    #[serde(default)]
    pub order: i32,
    /// Roles of the group.
    pub roles: Vec<RoleConfig>,
}

/// A simulated lifecycle hook that completes after a number of polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    /// Hook name.
    pub name: String,
    /// Position among hooks of the same phase.
    #[serde(default)]
    pub order: i32,
    /// Polls until the hook reports done.
    #[serde(default = "default_polls")]
    pub polls: u32,
    /// `false` simulates a hook that cannot be resolved.
    #[serde(default = "default_true")]
    pub accessible: bool,
}

/// One subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubsystemConfig {
    /// Subsystem name.
    pub name: String,
    /// Device fields.
    #[serde(default)]
    pub devices: Vec<FieldConfig>,
    /// Device groups.
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    /// Hooks run before the device checks.
    #[serde(default)]
    pub before: Vec<HookConfig>,
    /// Hooks run after the device checks.
    #[serde(default)]
    pub after: Vec<HookConfig>,
}

/// A whole robot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotConfig {
    /// Run-wide settings.
    #[serde(default)]
    pub settings: Settings,
    /// Subsystems in check order.
    #[serde(default)]
    pub subsystems: Vec<SubsystemConfig>,
}

impl RobotConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or is
    /// inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&contents, path)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not a valid configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, Path::new("<inline>"))
    }

    fn parse(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|source| ConfigError::Parse { path: PathBuf::from(path), source })?;
        config.validate()?;
        debug!("loaded config with {} subsystems", config.subsystems.len());
        Ok(config)
    }

    /// Checks values that parse but cannot be run.
    ///
    /// Check-kind conflicts are left to the builder, which reports them with
    /// the subsystem and field involved.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if self.settings.tick_period_ms == 0 {
            return invalid("tick_period_ms must be positive".into());
        }
        if let Some(t) = self.settings.position_timeout_secs {
            if !t.is_finite() || t < 0.0 {
                return invalid(format!("position_timeout_secs must be non-negative, got {t}"));
            }
        }

        let mut ids = BTreeSet::new();
        if let Some(id) = self.device_ids().into_iter().find(|&id| !ids.insert(id)) {
            return invalid(format!("device id {id} is used more than once"));
        }

        for subsystem in &self.subsystems {
            for field in &subsystem.devices {
                validate_checks(&subsystem.name, &field.field, &field.checks)?;
            }
            for group in &subsystem.groups {
                for role in &group.roles {
                    let name = format!("{}.{}", group.name, role.role);
                    validate_checks(&subsystem.name, &name, &role.checks)?;
                }
            }
        }
        Ok(())
    }

    /// Ids of every device in the configuration.
    #[must_use]
    pub fn device_ids(&self) -> Vec<i32> {
        self.subsystems
            .iter()
            .flat_map(|s| {
                s.devices.iter().map(|f| f.id).chain(
                    s.groups
                        .iter()
                        .flat_map(|g| g.roles.iter())
                        .flat_map(|r| r.devices.iter().map(|m| m.id)),
                )
            })
            .collect()
    }

    /// Turns the configuration into subsystem declarations, obtaining each
    /// device from `device`.
    pub fn declarations(
        &self,
        mut device: impl FnMut(i32, &SimParams) -> DeviceHandle,
    ) -> Vec<SubsystemDecl> {
        self.subsystems
            .iter()
            .map(|subsystem| {
                let fields = subsystem
                    .devices
                    .iter()
                    .map(|f| DeviceField {
                        name: f.field.clone(),
                        order: f.order,
                        health_check: f.health_check,
                        value: if f.type_name != MOTOR_TYPE {
                            FieldValue::Other { type_name: f.type_name.clone() }
                        } else if !f.accessible {
                            FieldValue::Inaccessible { reason: "marked inaccessible".into() }
                        } else {
                            FieldValue::Device(device(f.id, &f.sim))
                        },
                        checks: f.checks.clone(),
                    })
                    .collect();
                let groups = subsystem
                    .groups
                    .iter()
                    .map(|g| DeviceGroup {
                        name: g.name.clone(),
                        order: g.order,
                        roles: g
                            .roles
                            .iter()
                            .map(|r| GroupRole {
                                role: r.role.clone(),
                                devices: r.devices.iter().map(|m| device(m.id, &m.sim)).collect(),
                                checks: r.checks.clone(),
                            })
                            .collect(),
                    })
                    .collect();
                SubsystemDecl {
                    name: subsystem.name.clone(),
                    fields,
                    groups,
                    before: subsystem.before.iter().map(hook).collect(),
                    after: subsystem.after.iter().map(hook).collect(),
                }
            })
            .collect()
    }
}

fn validate_checks(subsystem: &str, field: &str, decl: &CheckDecl) -> Result<(), ConfigError> {
    let invalid = |what: String| {
        Err(ConfigError::Invalid(format!("subsystem '{subsystem}' field '{field}': {what}")))
    };
    let outputs = decl
        .timed
        .iter()
        .flat_map(|t| t.percent_output.iter())
        .chain(decl.position.iter().flat_map(|p| p.percent_output.iter()));
    for &output in outputs {
        if !(-1.0..=1.0).contains(&output) {
            return invalid(format!("percent output {output} is outside [-1, 1]"));
        }
    }
    if let Some(timed) = &decl.timed {
        if !timed.duration.is_finite() || timed.duration < 0.0 {
            return invalid(format!("duration must be non-negative, got {}", timed.duration));
        }
    }
    if let Some(position) = &decl.position {
        if position.encoder_change < 0 {
            return invalid(format!(
                "encoder_change must be non-negative, got {}",
                position.encoder_change
            ));
        }
    }
    Ok(())
}

fn hook(config: &HookConfig) -> HookDecl {
    let func = config.accessible.then(|| {
        let needed = config.polls.max(1);
        let polls = AtomicU32::new(0);
        let name = config.name.clone();
        let func: HookFn = Arc::new(move || {
            if polls.fetch_add(1, Ordering::SeqCst) + 1 < needed {
                return false;
            }
            polls.store(0, Ordering::SeqCst);
            debug!("hook {name} done");
            true
        });
        func
    });
    HookDecl { name: config.name.clone(), order: config.order, func }
}
