use std::path::Path;

use serde::{Deserialize, Serialize};

use super::UnitSystem;

/// User preferences for the calculator.
///
/// Physical constants are deliberately absent; they follow from the unit
/// system of each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Unit system assumed when a request does not name one.
    pub units: UnitSystem,

    /// Number of decimal places in rendered output.
    precision: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: UnitSystem::default(),
            precision: default_precision(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration, falling back to the defaults if the file is
    /// missing or invalid.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the number of decimal places used for rendered output.
    #[must_use]
    pub const fn precision(&self) -> usize {
        self.precision
    }

    /// Sets the number of decimal places, capped at 10.
    pub fn set_precision(&mut self, precision: usize) {
        self.precision = precision.min(MAX_PRECISION);
    }
}

const MAX_PRECISION: usize = 10;

const fn default_precision() -> usize {
    3
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        units: UnitSystem,

        /// Number of decimal places in rendered output.
        #[serde(default = "default_precision")]
        precision: usize,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { units, precision } => Self {
                units,
                precision: precision.min(MAX_PRECISION),
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            units: config.units,
            precision: config.precision,
        }
    }
}
