//! `hydro`: open-channel, gutter and curb inlet hydraulics from the command
//! line.

use std::process::ExitCode;

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> ExitCode {
    match Cli::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(cli::exit_code(&error))
        }
    }
}
