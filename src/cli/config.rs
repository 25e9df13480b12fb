use std::path::Path;

use clap::Parser;
use hydrocalc::UnitSystem;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Show or modify configuration settings")]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Print a single configuration value
    Get {
        /// Configuration key (units, precision)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

impl Config {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, config_path: &Path) -> anyhow::Result<()> {
        let mut config = if config_path.exists() {
            hydrocalc::Config::load(config_path).map_err(|e| anyhow::anyhow!("{e}"))?
        } else {
            hydrocalc::Config::default()
        };

        match self.command {
            ConfigCommand::Show => {
                println!("Configuration {}:", format!("({})", config_path.display()).dim());
                println!("  units: {}", config.units);
                println!("  precision: {}", config.precision());
            }
            ConfigCommand::Get { key } => println!("{}", get(&config, &key)?),
            ConfigCommand::Set { key, value } => {
                set(&mut config, &key, &value)?;
                config
                    .save(config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                println!("{}", format!("{key} = {}", get(&config, &key)?).success());
            }
        }

        Ok(())
    }
}

fn get(config: &hydrocalc::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "units" => Ok(config.units.to_string()),
        "precision" => Ok(config.precision().to_string()),
        _ => anyhow::bail!("Unknown configuration key: {key}. Supported keys: units, precision"),
    }
}

fn set(config: &mut hydrocalc::Config, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "units" => {
            config.units = value
                .parse::<UnitSystem>()
                .map_err(|e| anyhow::anyhow!("{e}"))?;
        }
        "precision" => {
            let precision = value
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("Precision must be a non-negative integer"))?;
            config.set_precision(precision);
        }
        _ => anyhow::bail!("Unknown configuration key: {key}. Supported keys: units, precision"),
    }
    Ok(())
}
