//! The check tree.
//!
//! A run is a tree of [`Node`]s: composites at the robot, subsystem and
//! device layers, with [`Case`]s and lifecycle [`Hook`]s as leaves. The
//! scheduler calls [`Node::initialize`] once and then [`Node::execute`] every
//! tick until [`Node::is_finished`].

use std::fmt;

mod case;
mod composite;
mod hook;
mod sample;

pub use case::{is_reversing, Case, CaseState, ExitCondition, Follower, REVERSING_DURATION_MICROS};
pub use composite::{Composite, Level};
pub use hook::{Hook, HookFn, HookPhase};
pub use sample::{Averages, Sample};

/// A node of the check tree.
pub enum Node {
    /// Ordered container.
    Composite(Composite),
    /// Device check.
    Case(Box<Case>),
    /// Lifecycle hook.
    Hook(Hook),
}

impl Node {
    /// Node name as shown in reports.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Composite(c) => c.name().to_string(),
            Self::Case(c) => c.name(),
            Self::Hook(h) => h.name().to_string(),
        }
    }

    /// Whether the node has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Composite(c) => c.is_finished(),
            Self::Case(c) => c.is_finished(),
            Self::Hook(h) => h.is_finished(),
        }
    }

    /// Prepares the node for a fresh pass.
    pub fn initialize(&mut self) {
        match self {
            Self::Composite(c) => c.initialize(),
            Self::Case(c) => c.initialize(),
            Self::Hook(h) => h.initialize(),
        }
    }

    /// Advances the node by one tick.
    pub fn execute(&mut self) {
        match self {
            Self::Composite(c) => c.execute(),
            Self::Case(c) => c.execute(),
            Self::Hook(h) => h.execute(),
        }
    }

    /// Returns every case below (or at) this node, in execution order.
    #[must_use]
    pub fn cases(&self) -> Vec<&Case> {
        let mut out = Vec::new();
        self.collect_cases(&mut out);
        out
    }

    fn collect_cases<'a>(&'a self, out: &mut Vec<&'a Case>) {
        match self {
            Self::Composite(c) => c.children().iter().for_each(|child| child.collect_cases(out)),
            Self::Case(c) => out.push(c.as_ref()),
            Self::Hook(_) => {}
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite(c) => f
                .debug_struct("Composite")
                .field("name", &c.name())
                .field("level", c.level())
                .field("children", &c.children().len())
                .field("finished", &c.is_finished())
                .finish(),
            Self::Case(c) => f
                .debug_struct("Case")
                .field("name", &c.name())
                .field("device", &c.device_id())
                .field("state", &c.state())
                .finish(),
            Self::Hook(h) => f
                .debug_struct("Hook")
                .field("name", &h.name())
                .field("finished", &h.is_finished())
                .finish(),
        }
    }
}

impl From<Case> for Node {
    fn from(case: Case) -> Self {
        Self::Case(Box::new(case))
    }
}

impl From<Composite> for Node {
    fn from(composite: Composite) -> Self {
        Self::Composite(composite)
    }
}

impl From<Hook> for Node {
    fn from(hook: Hook) -> Self {
        Self::Hook(hook)
    }
}
