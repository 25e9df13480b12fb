use std::path::{Path, PathBuf};

mod channel;
mod config;
mod inlet;
mod project;
mod terminal;

use channel::Channel;
use clap::ArgAction;
use config::Config;
use inlet::Inlet;
use project::Project;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH", default_value = "hydro.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(&self.config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Solve an open channel or gutter section
    ///
    /// Finds the normal depth (or gutter spread) for a discharge, or the
    /// discharge for a known depth, water-surface elevation or spread.
    Channel(Channel),

    /// Solve a curb opening inlet on grade
    Inlet(Inlet),

    /// Create, re-solve and inspect project files
    Project(Project),

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    fn run(self, config_path: &Path) -> anyhow::Result<()> {
        let config = hydrocalc::Config::load_or_default(config_path);
        match self {
            Self::Channel(command) => command.run(&config)?,
            Self::Inlet(command) => command.run(&config)?,
            Self::Project(command) => command.run()?,
            Self::Config(command) => command.run(config_path)?,
        }
        Ok(())
    }
}

/// Process exit status for a failed command.
///
/// Rejected input exits with 2 and solver non-convergence with 3; anything
/// else exits with 1.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<hydrocalc::Error>() {
        Some(hydrocalc::Error::Invalid(_)) => 2,
        Some(hydrocalc::Error::NonConvergence { .. }) => 3,
        None if error.downcast_ref::<hydrocalc::ValidationError>().is_some() => 2,
        None => 1,
    }
}
