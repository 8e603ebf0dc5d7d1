//! `picpt <config.json> [--dump] [--yes] [--field <selector>]`
//!
//! Traces the configured particles and writes their trajectory. Logging
//! goes to stderr through `env_logger` (`RUST_LOG`, default `info`).

use std::error::Error;
use std::process::ExitCode;

use picpt::cli::{execute, CliArgs, USAGE};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            let mut cause = e.source();
            while let Some(c) = cause {
                log::error!("  caused by: {c}");
                cause = c.source();
            }
            ExitCode::FAILURE
        }
    }
}
