//! Drives check trees from an external tick source.

use std::sync::Arc;

use log::{info, warn};

use crate::builder::{Builder, SubsystemDecl};
use crate::error::{BuildError, HealthCheckError};
use crate::node::Node;
use crate::report::{ReportHolder, RunTrigger};

/// What a call to [`Runner::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No run is active and none was requested.
    Idle,
    /// A run is in progress.
    Running,
    /// The active run finished on this tick and was published.
    Finished,
}

/// Builds a fresh tree per requested run, executes it one tick at a time, and
/// publishes it once finished.
pub struct Runner {
    builder: Builder,
    subsystems: Vec<SubsystemDecl>,
    trigger: RunTrigger,
    holder: Arc<ReportHolder>,
    active: Option<Node>,
}

impl Runner {
    /// Creates an idle runner.
    pub fn new(
        builder: Builder,
        subsystems: Vec<SubsystemDecl>,
        trigger: RunTrigger,
        holder: Arc<ReportHolder>,
    ) -> Self {
        Self { builder, subsystems, trigger, holder, active: None }
    }

    /// Whether a run is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Advances the runner by one scheduler tick.
    ///
    /// A request that arrives during a run stays pending and starts the next
    /// run once the current one is published.
    ///
    /// # Errors
    ///
    /// Returns the build error when a requested run cannot be built; the
    /// runner stays idle.
    pub fn tick(&mut self) -> Result<TickOutcome, BuildError> {
        if self.active.is_none() {
            if !self.trigger.take() {
                return Ok(TickOutcome::Idle);
            }
            let mut root = self.builder.build(&self.subsystems)?;
            root.initialize();
            info!("health check run started");
            self.active = Some(root);
        }

        let Some(root) = self.active.as_mut() else {
            return Ok(TickOutcome::Idle);
        };
        root.execute();
        if !root.is_finished() {
            return Ok(TickOutcome::Running);
        }
        if let Some(root) = self.active.take() {
            info!("health check run finished with {} cases", root.cases().len());
            self.holder.publish(Arc::new(root));
        }
        Ok(TickOutcome::Finished)
    }

    /// Builds one tree and drives it to completion, calling `step` before
    /// every tick. The finished tree is published and returned.
    ///
    /// # Errors
    ///
    /// Returns [`HealthCheckError::Build`] if the tree cannot be built and
    /// [`HealthCheckError::TickLimit`] if it does not finish within
    /// `max_ticks`.
    pub fn run_once(
        &mut self,
        step: impl FnMut(),
        max_ticks: Option<u64>,
    ) -> Result<Arc<Node>, HealthCheckError> {
        let mut root = self.builder.build(&self.subsystems)?;
        info!("health check run started");
        let ticks = run_to_completion(&mut root, step, max_ticks)?;
        info!("health check run finished after {ticks} ticks");
        let root = Arc::new(root);
        self.holder.publish(Arc::clone(&root));
        Ok(root)
    }
}

/// Initializes `root` and executes it until finished, calling `step` before
/// every tick. Returns the number of ticks executed.
///
/// # Errors
///
/// Returns [`HealthCheckError::TickLimit`] when `max_ticks` is reached first.
pub fn run_to_completion(
    root: &mut Node,
    mut step: impl FnMut(),
    max_ticks: Option<u64>,
) -> Result<u64, HealthCheckError> {
    root.initialize();
    let mut ticks = 0;
    while !root.is_finished() {
        if max_ticks.is_some_and(|cap| ticks >= cap) {
            warn!("stopping run after {ticks} ticks");
            return Err(HealthCheckError::TickLimit(ticks));
        }
        step();
        root.execute();
        ticks += 1;
    }
    Ok(ticks)
}
