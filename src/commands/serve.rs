//! `healthcheck serve` command.

use std::path::Path;
use std::sync::Arc;

use log::error;

use super::{load_config, runner};
use crate::context::ServiceContext;
use crate::report::{ReportHolder, ReportServer, RunTrigger};

/// Execute the `serve` command.
///
/// Serves `/run` and `/data` on `addr` and ticks the runner in wall time
/// until the process is stopped.
///
/// # Errors
///
/// Returns an error string if the config is invalid, its tree cannot be
/// built, or the address cannot be bound.
pub fn run(config_path: &Path, addr: &str, run_on_start: bool) -> Result<(), String> {
    let config = load_config(config_path)?;
    let ctx = ServiceContext::live();
    let holder = Arc::new(ReportHolder::new());
    let trigger = RunTrigger::new();
    let mut runner = runner(&ctx, &config, trigger.clone(), Arc::clone(&holder));

    // Surface build errors before accepting requests.
    if run_on_start {
        trigger.request();
        runner.tick().map_err(|e| e.to_string())?;
    }

    let server = ReportServer::start(addr, holder, trigger).map_err(|e| e.to_string())?;
    let shown = server.local_addr().map_or_else(|| addr.to_string(), |a| a.to_string());
    eprintln!("Serving health checks on http://{shown} (GET /run, GET /data)");

    let period = config.settings.tick_period();
    loop {
        if let Err(e) = runner.tick() {
            error!("health check run could not be built: {e}");
        }
        ctx.step(period);
    }
}
