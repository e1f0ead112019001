#![forbid(unsafe_code)]

//! # markdansi
//!
//! Renders markdown to the terminal.
//!
//! ## Usage
//!
//! ```bash
//! markdansi README.md            # Render a file to stdout
//! markdansi < README.md          # Render stdin
//! markdansi --no-color -o out.txt README.md
//! ```
//!
//! Set `MARKDANSI_LOG` (e.g. `debug`) to see diagnostics on stderr.

use std::process::ExitCode;

use clap::Parser;
use markdansi_cli::{Cli, LOG_ENV, run};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_broken_pipe() => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("markdansi: {err}");
            ExitCode::FAILURE
        }
    }
}
