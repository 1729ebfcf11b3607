//! `vetting` command-line entrypoint.
//!
//! Parses arguments, runs the requested command and maps its verdict onto
//! the process exit code.

use clap::Parser;
use std::io::{self, Write};
use vetting::cli::Cli;
use vetting::commands::{exit_code_for, run};

fn main() {
    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();
    let exit_code = exit_code_for(run(&cli, &mut stdout), &mut stderr);
    // `process::exit` skips the final flush of standard output.
    if stdout.flush().is_err() {
        // Best-effort; the exit code already carries the verdict.
    }
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
