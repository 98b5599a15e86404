//! `healthcheck run` command.

use std::path::Path;

use super::{load_config, render, run_once};
use crate::cli::Format;
use crate::context::ServiceContext;

/// Execute the `run` command.
///
/// Runs every check once against simulated devices and prints the report.
/// With `record`, the clock and device interactions are written to a
/// cassette even when the run fails.
///
/// # Errors
///
/// Returns an error string if the config is invalid, the tree cannot be
/// built, the run exceeds `max_ticks`, or the cassette cannot be written.
pub fn run(
    config_path: &Path,
    format: Format,
    record: Option<&Path>,
    max_ticks: Option<u64>,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let ctx = match record {
        Some(path) => ServiceContext::recording(path, &config_path.display().to_string()),
        None => ServiceContext::simulated(),
    };

    let result = run_once(&ctx, &config, max_ticks).and_then(|root| render(&root, format));

    if let Some(path) = ctx.finish().map_err(|e| e.to_string())? {
        eprintln!("Recording saved to: {}", path.display());
    }
    println!("{}", result?);
    Ok(())
}
