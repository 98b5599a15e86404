//! Command dispatch and handlers.

pub mod replay;
pub mod run;
pub mod serve;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use crate::cli::{Command, Format};
use crate::config::RobotConfig;
use crate::context::ServiceContext;
use crate::node::Node;
use crate::report::{ReportHolder, RunTrigger};
use crate::runner::Runner;
use crate::visit::{format_dump, ColumnarReport};

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Run { config, format, record, max_ticks } => {
            run::run(config, *format, record.as_deref(), *max_ticks)
        }
        Command::Replay { config, cassette, format, max_ticks } => {
            replay::run(config, cassette, *format, *max_ticks)
        }
        Command::Validate { config } => validate::run(config),
        Command::Serve { config, addr, run_on_start } => serve::run(config, addr, *run_on_start),
    }
}

/// Loads a robot configuration, mapping errors for display.
fn load_config(path: &Path) -> Result<RobotConfig, String> {
    RobotConfig::from_file(path).map_err(|e| e.to_string())
}

/// A runner over `config`'s subsystems with devices from `ctx`.
fn runner(
    ctx: &ServiceContext,
    config: &RobotConfig,
    trigger: RunTrigger,
    holder: Arc<ReportHolder>,
) -> Runner {
    let subsystems = config.declarations(|id, params| ctx.device(id, params));
    Runner::new(ctx.builder(config.settings.check_settings()), subsystems, trigger, holder)
}

/// Builds and runs every check once, advancing `ctx` one tick period
/// between ticks.
fn run_once(
    ctx: &ServiceContext,
    config: &RobotConfig,
    max_ticks: Option<u64>,
) -> Result<Arc<Node>, String> {
    let period = config.settings.tick_period();
    runner(ctx, config, RunTrigger::new(), Arc::new(ReportHolder::new()))
        .run_once(|| ctx.step(period), max_ticks)
        .map_err(|e| e.to_string())
}

/// Renders a finished run.
fn render(root: &Node, format: Format) -> Result<String, String> {
    match format {
        Format::Dump => Ok(format_dump(root)),
        Format::Json => ColumnarReport::from_tree(root)
            .to_json()
            .map_err(|e| format!("failed to serialize report: {e}")),
    }
}
