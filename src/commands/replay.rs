//! `healthcheck replay` command.

use std::path::Path;

use super::{load_config, render, run_once};
use crate::cli::Format;
use crate::context::ServiceContext;

/// Execute the `replay` command.
///
/// Re-runs the checks of `config_path` with clock and devices answered from
/// `cassette`. The config must be the one the cassette was recorded with;
/// a mismatch exhausts the cassette and aborts.
///
/// # Errors
///
/// Returns an error string if the config or cassette cannot be loaded or the
/// run cannot be completed.
pub fn run(
    config_path: &Path,
    cassette: &Path,
    format: Format,
    max_ticks: Option<u64>,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let ctx = ServiceContext::replaying(cassette).map_err(|e| e.to_string())?;
    let root = run_once(&ctx, &config, max_ticks)?;
    println!("{}", render(&root, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cassette_is_reported() {
        let config = std::env::temp_dir().join("healthcheck-replay-config.yaml");
        std::fs::write(&config, "subsystems: []\n").unwrap();
        let err = run(&config, Path::new("/nonexistent/run.cassette.yaml"), Format::Dump, None)
            .unwrap_err();
        std::fs::remove_file(&config).ok();
        assert!(err.contains("run.cassette.yaml"), "{err}");
    }
}
