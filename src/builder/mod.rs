//! Assembles check trees from subsystem declarations.
//!
//! Per subsystem the builder:
//!
//! 1. rejects unresolvable hooks,
//! 2. walks health-check fields and device groups in `order`,
//! 3. turns every timed or position declaration into a device composite
//!    with one case per output,
//! 4. attaches followers to their leader's cases once all cases exist,
//! 5. wraps the result with before/after hooks.

mod decl;

pub use decl::{DeviceField, DeviceGroup, FieldValue, GroupRole, HookDecl, SubsystemDecl};

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::error::BuildError;
use crate::node::{is_reversing, Case, Composite, ExitCondition, Hook, HookPhase, Level, Node};
use crate::ports::{Clock, DeviceHandle, IdGenerator};
use crate::spec::{CheckDecl, CheckSpec, LimitsSpec};

/// Settings applied to every check in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSettings {
    /// Upper bound on the running phase of position cases. `None` lets a
    /// stalled device run until the scheduler stops ticking.
    pub position_timeout: Option<Duration>,
}

/// Builds check trees.
pub struct Builder {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    settings: CheckSettings,
}

/// A follow declaration waiting for its leader's cases.
struct PendingFollow {
    field: String,
    device: DeviceHandle,
    leader: i32,
}

enum Entry<'a> {
    Field(&'a DeviceField),
    Group(&'a DeviceGroup),
}

impl Builder {
    /// Creates a builder whose cases read `clock` and take ids from `ids`.
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids, settings: CheckSettings::default() }
    }

    /// Replaces the run settings.
    #[must_use]
    pub fn with_settings(mut self, settings: CheckSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the root composite over all subsystems.
    ///
    /// # Errors
    ///
    /// Returns the first fatal problem found; nothing is built in that case.
    pub fn build(&self, subsystems: &[SubsystemDecl]) -> Result<Node, BuildError> {
        let children = subsystems
            .iter()
            .map(|decl| self.build_subsystem(decl).map(Node::Composite))
            .collect::<Result<Vec<_>, _>>()?;
        let root = Node::Composite(Composite::new("robot", Level::Robot, children));
        info!("built health check with {} cases", root.cases().len());
        Ok(root)
    }

    /// Builds one subsystem's composite.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] for unresolvable hooks, conflicting check kinds,
    /// or fields that do not hold a device.
    pub fn build_subsystem(&self, decl: &SubsystemDecl) -> Result<Composite, BuildError> {
        let before = self.hooks(decl, &decl.before, HookPhase::Before)?;
        let after = self.hooks(decl, &decl.after, HookPhase::After)?;

        let mut entries: Vec<(i32, Entry<'_>)> = decl
            .fields
            .iter()
            .filter(|f| f.health_check)
            .map(|f| (f.order, Entry::Field(f)))
            .chain(decl.groups.iter().map(|g| (g.order, Entry::Group(g))))
            .collect();
        entries.sort_by_key(|(order, _)| *order);

        let mut devices: Vec<Composite> = Vec::new();
        let mut follows: Vec<PendingFollow> = Vec::new();
        for (_, entry) in entries {
            match entry {
                Entry::Field(field) => {
                    self.field(decl, field, &mut devices, &mut follows)?;
                }
                Entry::Group(group) => self.group(decl, group, &mut devices)?,
            }
        }

        for follow in follows {
            attach_follower(&decl.name, &mut devices, follow);
        }

        if devices.is_empty() {
            warn!("subsystem '{}' has no device checks", decl.name);
        }

        let children: Vec<Node> = before
            .into_iter()
            .map(Node::Hook)
            .chain(devices.into_iter().map(Node::Composite))
            .chain(after.into_iter().map(Node::Hook))
            .collect();
        Ok(Composite::new(decl.name.clone(), Level::Subsystem, children))
    }

    fn hooks(
        &self,
        decl: &SubsystemDecl,
        hooks: &[HookDecl],
        phase: HookPhase,
    ) -> Result<Vec<Hook>, BuildError> {
        let mut ordered: Vec<&HookDecl> = hooks.iter().collect();
        ordered.sort_by_key(|h| h.order);
        ordered
            .into_iter()
            .map(|h| match &h.func {
                Some(func) => Ok(Hook::new(h.name.clone(), phase, Arc::clone(func))),
                None => Err(BuildError::InaccessibleHook {
                    subsystem: decl.name.clone(),
                    hook: h.name.clone(),
                }),
            })
            .collect()
    }

    fn field(
        &self,
        decl: &SubsystemDecl,
        field: &DeviceField,
        devices: &mut Vec<Composite>,
        follows: &mut Vec<PendingFollow>,
    ) -> Result<(), BuildError> {
        let device = match &field.value {
            FieldValue::Device(device) => device,
            FieldValue::Inaccessible { reason } => {
                error!(
                    "subsystem '{}' field '{}' is not accessible and will not be checked: {reason}",
                    decl.name, field.name
                );
                return Ok(());
            }
            FieldValue::Other { type_name } => {
                return Err(BuildError::UnrecognizedDevice {
                    subsystem: decl.name.clone(),
                    field: field.name.clone(),
                    type_name: type_name.clone(),
                });
            }
        };

        let spec = resolve(decl, &field.name, &field.checks)?;
        match spec {
            None => debug!("subsystem '{}' field '{}' declares no check", decl.name, field.name),
            Some(CheckSpec::Follow(follow)) => follows.push(PendingFollow {
                field: field.name.clone(),
                device: Arc::clone(device),
                leader: follow.leader,
            }),
            Some(spec) => devices.push(self.device_branch(
                decl,
                &field.name,
                device,
                &spec,
                field.checks.limits.as_ref(),
            )),
        }
        Ok(())
    }

    fn group(
        &self,
        decl: &SubsystemDecl,
        group: &DeviceGroup,
        devices: &mut Vec<Composite>,
    ) -> Result<(), BuildError> {
        for role in &group.roles {
            let name = format!("{}.{}", group.name, role.role);
            let Some(leader) = role.devices.iter().min_by_key(|d| d.device_id()) else {
                error!("subsystem '{}' group role '{name}' has no devices", decl.name);
                continue;
            };
            let spec = match resolve(decl, &name, &role.checks)? {
                Some(spec @ (CheckSpec::Timed(_) | CheckSpec::Position(_))) => spec,
                _ => {
                    error!(
                        "subsystem '{}' group role '{name}' needs a timed or position check",
                        decl.name
                    );
                    continue;
                }
            };

            let mut branch =
                self.device_branch(decl, &name, leader, &spec, role.checks.limits.as_ref());
            let leader_id = leader.device_id();
            for follower in role.devices.iter().filter(|d| d.device_id() != leader_id) {
                let follower_field = format!("{name}[{}]", follower.device_id());
                for_each_case(&mut branch, |case| {
                    case.add_follower(Arc::clone(follower), follower_field.clone());
                });
            }
            devices.push(branch);
        }
        Ok(())
    }

    fn device_branch(
        &self,
        decl: &SubsystemDecl,
        field: &str,
        device: &DeviceHandle,
        spec: &CheckSpec,
        limits: Option<&LimitsSpec>,
    ) -> Composite {
        let (outputs, exit, timeout) = match spec {
            CheckSpec::Timed(timed) => (
                timed.percent_output.as_slice(),
                ExitCondition::Elapsed { micros: seconds_to_micros(timed.duration) },
                None,
            ),
            CheckSpec::Position(position) => {
                if self.settings.position_timeout.is_none() {
                    warn!(
                        "subsystem '{}' field '{field}' has a position check without a timeout; \
                         a stalled device will run until ticking stops",
                        decl.name
                    );
                }
                (
                    position.percent_output.as_slice(),
                    ExitCondition::EncoderChange { ticks: position.encoder_change },
                    self.settings.position_timeout,
                )
            }
            CheckSpec::Follow(_) => (&[][..], ExitCondition::Elapsed { micros: 0 }, None),
        };

        let cases = outputs
            .iter()
            .enumerate()
            .map(|(index, &output)| {
                let case = Case::new(
                    self.ids.case_id(),
                    decl.name.clone(),
                    Arc::clone(device),
                    index,
                    output,
                    exit,
                    Arc::clone(&self.clock),
                )
                .reversing(is_reversing(outputs, index))
                .with_limits(limits.map(|l| l.for_output(index)).unwrap_or_default())
                .with_timeout(timeout);
                Node::from(case)
            })
            .collect();

        Composite::new(
            field.to_string(),
            Level::Device { device_id: device.device_id(), field: field.to_string() },
            cases,
        )
    }
}

fn resolve(
    decl: &SubsystemDecl,
    field: &str,
    checks: &CheckDecl,
) -> Result<Option<CheckSpec>, BuildError> {
    checks.resolve().map_err(|_| BuildError::ConflictingChecks {
        subsystem: decl.name.clone(),
        field: field.to_string(),
    })
}

fn attach_follower(subsystem: &str, devices: &mut [Composite], follow: PendingFollow) {
    let mut attached = 0;
    for branch in devices.iter_mut().filter(
        |b| matches!(b.level(), Level::Device { device_id, .. } if *device_id == follow.leader),
    ) {
        for_each_case(branch, |case| {
            case.add_follower(Arc::clone(&follow.device), follow.field.clone());
            attached += 1;
        });
    }
    if attached == 0 {
        error!(
            "subsystem '{subsystem}' field '{}' follows device {}, which has no checks; \
             follower dropped",
            follow.field, follow.leader
        );
    }
}

fn for_each_case(branch: &mut Composite, mut f: impl FnMut(&mut Case)) {
    for child in branch.children_mut() {
        if let Node::Case(case) = child {
            f(case);
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds_to_micros(seconds: f64) -> u64 {
    (seconds * 1e6).max(0.0).round() as u64
}
