//! Declarative motor-controller health checks for robot subsystems.
//!
//! Subsystems declare which of their devices to exercise and how. The
//! [`builder`] turns those declarations into a tree of [`node::Node`]s, an
//! external scheduler ticks the tree until it finishes, and [`visit`] turns
//! the finished tree into reports that [`report`] serves over HTTP.

pub mod adapters;
pub mod builder;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod node;
pub mod ports;
pub mod report;
pub mod runner;
pub mod spec;
pub mod visit;

#[cfg(test)]
mod testing;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    init_logging(cli.log_level());
    log::debug!("healthcheck v{}", env!("CARGO_PKG_VERSION"));
    commands::dispatch(&cli.command)
}

/// Installs the `env_logger` backend; `RUST_LOG` overrides `default_level`.
/// Later calls keep the first configuration.
fn init_logging(default_level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
