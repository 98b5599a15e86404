//! Statically-typed subsystem declarations.
//!
//! A subsystem describes each of its fields: whether it is marked for health
//! checks, in which order, what the field holds, and which checks apply.
//! Fields that could not be resolved are still declared so the builder can
//! decide whether that is fatal.

use crate::node::HookFn;
use crate::ports::DeviceHandle;
use crate::spec::CheckDecl;

/// What a declared field holds.
pub enum FieldValue {
    /// A motor controller.
    Device(DeviceHandle),
    /// The field exists but its device could not be obtained.
    Inaccessible {
        /// Why the device is unavailable.
        reason: String,
    },
    /// The field holds something that is not a motor controller.
    Other {
        /// Declared type of the field.
        type_name: String,
    },
}

/// One device field of a subsystem.
pub struct DeviceField {
    /// Field name.
    pub name: String,
    /// Position among the subsystem's checks; ties keep declaration order.
    pub order: i32,
    /// Whether the field is marked for health checks at all.
    pub health_check: bool,
    /// Field contents.
    pub value: FieldValue,
    /// Declared checks.
    pub checks: CheckDecl,
}

/// One role within a device group, e.g. the azimuth motors of a swerve drive.
pub struct GroupRole {
    /// Role name.
    pub role: String,
    /// Physical devices filling this role.
    pub devices: Vec<DeviceHandle>,
    /// Timed or position check applied to the role's leader.
    pub checks: CheckDecl,
}

/// A set of identical modules exposed by a subsystem.
pub struct DeviceGroup {
    /// Group name.
    pub name: String,
    /// Position among the subsystem's checks.
    pub order: i32,
    /// Roles in the group.
    pub roles: Vec<GroupRole>,
}

/// A lifecycle hook; `func` is `None` when the hook could not be resolved.
pub struct HookDecl {
    /// Hook name.
    pub name: String,
    /// Position among hooks of the same phase.
    pub order: i32,
    /// The hook itself.
    pub func: Option<HookFn>,
}

/// Everything a subsystem declares for health checks.
pub struct SubsystemDecl {
    /// Subsystem name.
    pub name: String,
    /// Device fields in declaration order.
    pub fields: Vec<DeviceField>,
    /// Device groups in declaration order.
    pub groups: Vec<DeviceGroup>,
    /// Hooks run before the device checks.
    pub before: Vec<HookDecl>,
    /// Hooks run after the device checks.
    pub after: Vec<HookDecl>,
}

impl SubsystemDecl {
    /// Starts an empty declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            groups: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Declares a health-checked device field.
    #[must_use]
    pub fn device(
        mut self,
        name: impl Into<String>,
        order: i32,
        device: DeviceHandle,
        checks: CheckDecl,
    ) -> Self {
        self.fields.push(DeviceField {
            name: name.into(),
            order,
            health_check: true,
            value: FieldValue::Device(device),
            checks,
        });
        self
    }

    /// Declares an arbitrary field.
    #[must_use]
    pub fn field(mut self, field: DeviceField) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares a device group.
    #[must_use]
    pub fn group(mut self, group: DeviceGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Declares a hook run before the device checks.
    #[must_use]
    pub fn before(mut self, name: impl Into<String>, order: i32, func: HookFn) -> Self {
        self.before.push(HookDecl { name: name.into(), order, func: Some(func) });
        self
    }

    /// Declares a hook run after the device checks.
    #[must_use]
    pub fn after(mut self, name: impl Into<String>, order: i32, func: HookFn) -> Self {
        self.after.push(HookDecl { name: name.into(), order, func: Some(func) });
        self
    }
}
