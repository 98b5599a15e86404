//! Lifecycle hooks run before or after a subsystem's device checks.

use std::fmt;
use std::sync::Arc;

/// A subsystem hook. It is polled once per tick until it returns `true`.
pub type HookFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Where a hook sits relative to the device checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Runs before the first device check.
    Before,
    /// Runs after the last device check.
    After,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// Leaf node wrapping a lifecycle hook.
pub struct Hook {
    name: String,
    phase: HookPhase,
    func: HookFn,
    polls: u32,
    finished: bool,
}

impl Hook {
    /// Wraps `func` as a node.
    pub fn new(name: impl Into<String>, phase: HookPhase, func: HookFn) -> Self {
        Self { name: name.into(), phase, func, polls: 0, finished: false }
    }

    /// Hook name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Before or after.
    #[must_use]
    pub fn phase(&self) -> HookPhase {
        self.phase
    }

    /// How many times the hook has been polled this run.
    #[must_use]
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Whether the hook has returned `true`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Resets the poll count.
    pub fn initialize(&mut self) {
        self.polls = 0;
        self.finished = false;
    }

    /// Polls the hook once.
    pub fn execute(&mut self) {
        if self.finished {
            return;
        }
        self.polls += 1;
        self.finished = (self.func)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn polls_until_hook_reports_done() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut hook = Hook::new(
            "home_arm",
            HookPhase::Before,
            Arc::new(move || counter.fetch_add(1, Ordering::SeqCst) >= 2),
        );
        hook.initialize();

        hook.execute();
        hook.execute();
        assert!(!hook.is_finished());
        hook.execute();
        assert!(hook.is_finished());

        hook.execute();
        assert_eq!(hook.polls(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
