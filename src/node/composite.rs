//! Ordered container node.

use log::{debug, warn};

use super::Node;

/// Which layer of the tree a composite represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    /// Root over all subsystems.
    Robot,
    /// One subsystem's checks and hooks.
    Subsystem,
    /// All cases of one device.
    Device {
        /// Device under test.
        device_id: i32,
        /// Field the device was declared on.
        field: String,
    },
}

/// Runs its children one at a time, in order.
///
/// Finished exactly when every child is finished.
pub struct Composite {
    name: String,
    level: Level,
    children: Vec<Node>,
    current: usize,
    finished: bool,
}

impl Composite {
    /// Creates a composite; one without children is already finished.
    pub fn new(name: impl Into<String>, level: Level, children: Vec<Node>) -> Self {
        let finished = children.is_empty();
        Self { name: name.into(), level, children, current: 0, finished }
    }

    /// Composite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tree layer.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Children in execution order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Index of the child currently executing.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Whether every child is finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Rewinds to the first child and initializes it.
    pub fn initialize(&mut self) {
        self.current = 0;
        if let Some(first) = self.children.first_mut() {
            self.finished = false;
            first.initialize();
        } else {
            warn!("{} has no health checks", self.name);
            self.finished = true;
        }
    }

    /// Advances past a finished child or executes the current one.
    pub fn execute(&mut self) {
        if self.finished {
            return;
        }
        let last = self.children.len().saturating_sub(1);
        let Some(child) = self.children.get_mut(self.current) else {
            self.finished = true;
            return;
        };
        if child.is_finished() {
            self.current += 1;
            if let Some(next) = self.children.get_mut(self.current) {
                debug!("{}: starting {}", self.name, next.name());
                next.initialize();
            } else {
                self.finished = true;
            }
            return;
        }
        child.execute();
        if self.current == last && child.is_finished() {
            self.finished = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Hook, HookPhase};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// A hook that finishes on its `n`th poll and counts polls globally.
    fn countdown(name: &str, n: u32, active: &Arc<AtomicU32>) -> Node {
        let polls = Arc::new(AtomicU32::new(0));
        let active = Arc::clone(active);
        Node::Hook(Hook::new(
            name,
            HookPhase::Before,
            Arc::new(move || {
                active.fetch_add(1, Ordering::SeqCst);
                polls.fetch_add(1, Ordering::SeqCst) + 1 >= n
            }),
        ))
    }

    fn all_children_finished(composite: &Composite) -> bool {
        composite.children().iter().all(Node::is_finished)
    }

    #[test]
    fn finished_iff_every_child_finished() {
        let active = Arc::new(AtomicU32::new(0));
        let mut composite = Composite::new(
            "arm",
            Level::Subsystem,
            vec![countdown("a", 3, &active), countdown("b", 1, &active), countdown("c", 2, &active)],
        );
        composite.initialize();

        for _ in 0..20 {
            assert_eq!(composite.is_finished(), all_children_finished(&composite));
            composite.execute();
        }
        assert!(composite.is_finished());
        assert_eq!(active.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn only_one_child_executes_per_tick() {
        let active = Arc::new(AtomicU32::new(0));
        let mut composite = Composite::new(
            "arm",
            Level::Subsystem,
            vec![countdown("a", 2, &active), countdown("b", 2, &active)],
        );
        composite.initialize();

        let mut previous = 0;
        while !composite.is_finished() {
            composite.execute();
            let now = active.load(Ordering::SeqCst);
            assert!(now - previous <= 1);
            previous = now;
        }
    }

    #[test]
    fn empty_composite_is_finished_after_initialize() {
        let mut composite = Composite::new("climber", Level::Subsystem, Vec::new());
        composite.initialize();
        assert!(composite.is_finished());
        composite.execute();
        assert!(composite.is_finished());
    }

    #[test]
    fn nested_composites_finish_bottom_up() {
        let active = Arc::new(AtomicU32::new(0));
        let inner = Composite::new("inner", Level::Subsystem, vec![countdown("a", 2, &active)]);
        let mut root = Composite::new(
            "robot",
            Level::Robot,
            vec![Node::Composite(inner), countdown("b", 1, &active)],
        );
        root.initialize();
        let mut ticks = 0;
        while !root.is_finished() {
            assert_eq!(root.is_finished(), all_children_finished(&root));
            root.execute();
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!(all_children_finished(&root));
    }

    #[test]
    fn reinitialize_restarts_from_first_child() {
        let active = Arc::new(AtomicU32::new(0));
        let mut composite =
            Composite::new("arm", Level::Subsystem, vec![countdown("a", 1, &active)]);
        composite.initialize();
        while !composite.is_finished() {
            composite.execute();
        }
        composite.initialize();
        assert!(!composite.is_finished());
        assert_eq!(composite.current(), 0);
    }
}
