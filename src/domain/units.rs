use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The unit system a request is expressed in.
///
/// Selects the Manning coefficient and gravitational acceleration used by the
/// solvers. Lengths are metres or feet, discharge is m³/s or ft³/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// SI units (m, m³/s).
    Metric,
    /// US customary units (ft, ft³/s).
    #[default]
    Imperial,
}

impl UnitSystem {
    /// Resolves the physical constants for this unit system.
    #[must_use]
    pub const fn constants(self) -> Constants {
        match self {
            Self::Metric => Constants {
                manning_k: 1.0,
                gutter_manning_k: 1.0,
                gravity: 9.81,
            },
            Self::Imperial => Constants {
                manning_k: 1.49,
                gutter_manning_k: 1.486,
                gravity: 32.174,
            },
        }
    }

    /// Unit label for lengths.
    #[must_use]
    pub const fn length(self) -> &'static str {
        match self {
            Self::Metric => "m",
            Self::Imperial => "ft",
        }
    }

    /// Unit label for areas.
    #[must_use]
    pub const fn area(self) -> &'static str {
        match self {
            Self::Metric => "m²",
            Self::Imperial => "ft²",
        }
    }

    /// Unit label for velocities.
    #[must_use]
    pub const fn velocity(self) -> &'static str {
        match self {
            Self::Metric => "m/s",
            Self::Imperial => "ft/s",
        }
    }

    /// Unit label for discharge.
    #[must_use]
    pub const fn discharge(self) -> &'static str {
        match self {
            Self::Metric => "m³/s",
            Self::Imperial => "ft³/s",
        }
    }

    /// Unit label for slopes.
    #[must_use]
    pub const fn slope(self) -> &'static str {
        match self {
            Self::Metric => "m/m",
            Self::Imperial => "ft/ft",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "metric"),
            Self::Imperial => write!(f, "imperial"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metric" | "si" => Ok(Self::Metric),
            "imperial" | "us" => Ok(Self::Imperial),
            other => Err(format!("unknown unit system '{other}'")),
        }
    }
}

/// Physical constants resolved once per request.
///
/// Channel solves use `manning_k`; the gutter spread model uses
/// `gutter_manning_k`, which carries the more precise 1.486 in US customary
/// units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constants {
    /// Manning unit coefficient for channel sections.
    pub manning_k: f64,
    /// Manning unit coefficient for the gutter spread model.
    pub gutter_manning_k: f64,
    /// Gravitational acceleration.
    pub gravity: f64,
}
