//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for `healthcheck`.
#[derive(Debug, Parser)]
#[command(
    name = "healthcheck",
    version,
    about = "Exercise robot motor controllers and report their health"
)]
pub struct Cli {
    /// Log debug output, including every case state transition.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// Report format printed after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Indented tree with per-case averages.
    Dump,
    /// Columnar JSON as served on `/data`.
    Json,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every check once against simulated devices.
    Run {
        /// Robot configuration file.
        #[arg(long)]
        config: PathBuf,
        /// Report format.
        #[arg(long, value_enum, default_value_t = Format::Dump)]
        format: Format,
        /// Record clock and device interactions to this cassette.
        #[arg(long)]
        record: Option<PathBuf>,
        /// Give up after this many ticks.
        #[arg(long)]
        max_ticks: Option<u64>,
    },
    /// Re-run the checks from a recorded cassette instead of devices.
    Replay {
        /// Robot configuration the cassette was recorded with.
        #[arg(long)]
        config: PathBuf,
        /// Cassette to replay.
        #[arg(long)]
        cassette: PathBuf,
        /// Report format.
        #[arg(long, value_enum, default_value_t = Format::Dump)]
        format: Format,
        /// Give up after this many ticks.
        #[arg(long)]
        max_ticks: Option<u64>,
    },
    /// Build the check tree and report configuration or build errors.
    Validate {
        /// Robot configuration file.
        #[arg(long)]
        config: PathBuf,
    },
    /// Serve `/run` and `/data` over HTTP, running checks in real time.
    Serve {
        /// Robot configuration file.
        #[arg(long)]
        config: PathBuf,
        /// Listen address.
        #[arg(long, default_value = "127.0.0.1:5800")]
        addr: String,
        /// Start a run immediately instead of waiting for `/run`.
        #[arg(long)]
        run_on_start: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, Format};
    use clap::Parser;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::parse_from([
            "healthcheck",
            "run",
            "--config",
            "robot.yaml",
            "--format",
            "json",
            "--max-ticks",
            "500",
        ]);
        match &cli.command {
            Command::Run { config, format, record, max_ticks } => {
                assert_eq!(config.to_str(), Some("robot.yaml"));
                assert_eq!(*format, Format::Json);
                assert!(record.is_none());
                assert_eq!(*max_ticks, Some(500));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn verbosity_flags_are_global() {
        let cli = Cli::parse_from(["healthcheck", "validate", "--config", "r.yaml", "-v"]);
        assert!(matches!(cli.command, Command::Validate { .. }));
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::parse_from(["healthcheck", "-q", "validate", "--config", "r.yaml"]);
        assert_eq!(cli.log_level(), "error");
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let parsed = Cli::try_parse_from(["healthcheck", "-v", "-q", "validate", "--config", "r"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn serve_defaults_to_local_address() {
        let cli = Cli::parse_from(["healthcheck", "serve", "--config", "robot.yaml"]);
        assert!(matches!(
            cli.command,
            Command::Serve { ref addr, run_on_start: false, .. } if addr == "127.0.0.1:5800"
        ));
    }
}
