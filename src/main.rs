//! Binary entrypoint for the `healthcheck` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match healthcheck::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
