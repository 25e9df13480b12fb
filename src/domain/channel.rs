use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    UnitSystem,
    validation::{ValidationError, finite, non_negative, positive},
};

/// A single surveyed point of an irregular cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationElevation {
    /// Horizontal position across the section.
    pub station: f64,
    /// Ground elevation at `station`.
    pub elevation: f64,
}

impl StationElevation {
    /// Creates a point.
    #[must_use]
    pub const fn new(station: f64, elevation: f64) -> Self {
        Self { station, elevation }
    }
}

impl From<(f64, f64)> for StationElevation {
    fn from((station, elevation): (f64, f64)) -> Self {
        Self::new(station, elevation)
    }
}

impl FromStr for StationElevation {
    type Err = String;

    /// Parses `STATION,ELEVATION`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (station, elevation) = s
            .split_once(',')
            .ok_or_else(|| format!("expected STATION,ELEVATION, got '{s}'"))?;
        let station = station
            .trim()
            .parse()
            .map_err(|e| format!("invalid station '{station}': {e}"))?;
        let elevation = elevation
            .trim()
            .parse()
            .map_err(|e| format!("invalid elevation '{elevation}': {e}"))?;
        Ok(Self::new(station, elevation))
    }
}

/// Horizontal-to-vertical side slopes of a sloped-wall section.
///
/// `side_slope` is the legacy symmetric value; it stands in for either side
/// whose own slope is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideSlopes {
    /// Symmetric slope (H:V) applied to any side left at zero.
    #[serde(default)]
    pub side_slope: f64,
    /// Left side slope zL (H:V).
    #[serde(default)]
    pub left: f64,
    /// Right side slope zR (H:V).
    #[serde(default)]
    pub right: f64,
}

impl SideSlopes {
    /// The same slope on both sides.
    #[must_use]
    pub const fn symmetric(z: f64) -> Self {
        Self {
            side_slope: z,
            left: 0.0,
            right: 0.0,
        }
    }

    /// Independent left and right slopes.
    #[must_use]
    pub const fn asymmetric(left: f64, right: f64) -> Self {
        Self {
            side_slope: 0.0,
            left,
            right,
        }
    }

    /// The effective `(zL, zR)` pair.
    #[must_use]
    pub fn resolve(&self) -> (f64, f64) {
        let left = if self.left > 0.0 { self.left } else { self.side_slope };
        let right = if self.right > 0.0 { self.right } else { self.side_slope };
        (left, right)
    }

    fn validate(&self) -> Result<(f64, f64), ValidationError> {
        non_negative("side slope", self.side_slope)?;
        non_negative("left side slope", self.left)?;
        non_negative("right side slope", self.right)?;
        Ok(self.resolve())
    }
}

/// The geometry family of a channel and its dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Section {
    /// Vertical walls on a flat bottom.
    Rectangular {
        /// Bottom width b.
        bottom_width: f64,
    },
    /// Sloped walls on a flat bottom.
    Trapezoidal {
        /// Bottom width b.
        bottom_width: f64,
        /// Wall slopes.
        side_slopes: SideSlopes,
    },
    /// Sloped walls meeting at a point.
    Triangular {
        /// Wall slopes.
        side_slopes: SideSlopes,
    },
    /// Arbitrary surveyed section.
    Irregular {
        /// Station/elevation points, conceptually ordered by station.
        points: Vec<StationElevation>,
    },
    /// Composite roadway gutter: a gutter of width W at cross slope Sg next to
    /// the curb, then roadway at cross slope Sx.
    Gutter {
        /// Gutter width W.
        gutter_width: f64,
        /// Gutter cross slope Sg.
        gutter_cross_slope: f64,
        /// Roadway cross slope Sx.
        road_cross_slope: f64,
    },
}

impl Section {
    /// Lower-case name of the geometry family.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rectangular { .. } => "rectangular",
            Self::Trapezoidal { .. } => "trapezoidal",
            Self::Triangular { .. } => "triangular",
            Self::Irregular { .. } => "irregular",
            Self::Gutter { .. } => "gutter",
        }
    }

    /// Whether this is a roadway gutter section.
    #[must_use]
    pub const fn is_gutter(&self) -> bool {
        matches!(self, Self::Gutter { .. })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Rectangular { bottom_width } => {
                positive("bottom width", *bottom_width)?;
            }
            Self::Trapezoidal {
                bottom_width,
                side_slopes,
            } => {
                let bottom_width = non_negative("bottom width", *bottom_width)?;
                let (left, right) = side_slopes.validate()?;
                if bottom_width <= 0.0 && left + right <= 0.0 {
                    return Err(ValidationError::Degenerate(
                        "trapezoid with zero bottom width and vertical walls",
                    ));
                }
            }
            Self::Triangular { side_slopes } => {
                let (left, right) = side_slopes.validate()?;
                if left + right <= 0.0 {
                    return Err(ValidationError::Degenerate(
                        "triangle with two vertical walls",
                    ));
                }
            }
            Self::Irregular { points } => {
                if points.len() < 2 {
                    return Err(ValidationError::TooFewPoints(points.len()));
                }
                for point in points {
                    finite("station", point.station)?;
                    finite("elevation", point.elevation)?;
                }
            }
            Self::Gutter {
                gutter_width,
                gutter_cross_slope,
                road_cross_slope,
            } => {
                non_negative("gutter width", *gutter_width)?;
                positive("gutter cross slope", *gutter_cross_slope)?;
                positive("road cross slope", *road_cross_slope)?;
            }
        }
        Ok(())
    }
}

/// A channel: geometry, longitudinal slope, roughness and units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Cross-section geometry.
    pub section: Section,
    /// Longitudinal slope S (length/length).
    pub slope: f64,
    /// Manning roughness coefficient n.
    pub mannings_n: f64,
    /// Unit system of every dimensional value.
    #[serde(default)]
    pub units: UnitSystem,
}

impl ChannelSpec {
    /// Checks that the channel can carry flow.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the slope or roughness is not strictly
    /// positive, or the section dimensions are invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("slope", self.slope)?;
        positive("Manning's n", self.mannings_n)?;
        self.section.validate()
    }
}

/// The unknown a request solves for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveFor {
    /// Normal depth from a known discharge.
    #[default]
    Depth,
    /// Discharge from a known depth, water-surface elevation or spread.
    Discharge,
    /// Gutter spread from a known discharge.
    Spread,
}

impl fmt::Display for SolveFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depth => write!(f, "depth"),
            Self::Discharge => write!(f, "discharge"),
            Self::Spread => write!(f, "spread"),
        }
    }
}

impl FromStr for SolveFor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "depth" => Ok(Self::Depth),
            "discharge" | "flow" => Ok(Self::Discharge),
            "spread" => Ok(Self::Spread),
            other => Err(format!("unknown solve mode '{other}'")),
        }
    }
}

/// A channel plus the solve mode and the known value driving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    /// The channel being analysed.
    pub channel: ChannelSpec,
    /// What to solve for.
    #[serde(default)]
    pub solve_for: SolveFor,
    /// Known discharge Q (depth and spread modes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge: Option<f64>,
    /// Known depth (discharge mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_depth: Option<f64>,
    /// Known water-surface elevation (discharge mode, irregular sections).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_wse: Option<f64>,
    /// Known spread (discharge mode, gutter sections).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
}

impl SolveRequest {
    /// A request for the normal depth (or gutter spread) carrying `discharge`.
    #[must_use]
    pub const fn depth(channel: ChannelSpec, discharge: f64) -> Self {
        Self {
            channel,
            solve_for: SolveFor::Depth,
            discharge: Some(discharge),
            known_depth: None,
            known_wse: None,
            spread: None,
        }
    }

    /// A request for the discharge carried at `known_depth`.
    #[must_use]
    pub const fn discharge_at_depth(channel: ChannelSpec, known_depth: f64) -> Self {
        Self {
            channel,
            solve_for: SolveFor::Discharge,
            discharge: None,
            known_depth: Some(known_depth),
            known_wse: None,
            spread: None,
        }
    }

    /// A request for the discharge carried at water-surface elevation
    /// `known_wse` (irregular sections).
    #[must_use]
    pub const fn discharge_at_wse(channel: ChannelSpec, known_wse: f64) -> Self {
        Self {
            channel,
            solve_for: SolveFor::Discharge,
            discharge: None,
            known_depth: None,
            known_wse: Some(known_wse),
            spread: None,
        }
    }

    /// A request for the discharge carried at gutter spread `spread`.
    #[must_use]
    pub const fn discharge_at_spread(channel: ChannelSpec, spread: f64) -> Self {
        Self {
            channel,
            solve_for: SolveFor::Discharge,
            discharge: None,
            known_depth: None,
            known_wse: None,
            spread: Some(spread),
        }
    }

    /// Checks the channel and the known value required by `solve_for`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the channel is invalid, the value the
    /// solve mode needs is missing or out of range, or the mode does not apply
    /// to the section shape.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.channel.validate()?;

        let mode = self.solve_for;
        let section = &self.channel.section;
        match mode {
            SolveFor::Depth | SolveFor::Spread => {
                if mode == SolveFor::Spread && !section.is_gutter() {
                    return Err(ValidationError::UnsupportedMode {
                        mode,
                        shape: section.name(),
                    });
                }
                let discharge = self.discharge.ok_or(ValidationError::Missing {
                    field: "discharge",
                    mode,
                })?;
                positive("discharge", discharge)?;
            }
            SolveFor::Discharge => match section {
                Section::Gutter { .. } => {
                    let spread = self.spread.ok_or(ValidationError::Missing {
                        field: "spread",
                        mode,
                    })?;
                    non_negative("spread", spread)?;
                }
                Section::Irregular { .. } => match (self.known_wse, self.known_depth) {
                    (Some(wse), _) => {
                        finite("water-surface elevation", wse)?;
                    }
                    (None, Some(depth)) => {
                        non_negative("known depth", depth)?;
                    }
                    (None, None) => {
                        return Err(ValidationError::Missing {
                            field: "water-surface elevation",
                            mode,
                        });
                    }
                },
                _ => {
                    let depth = self.known_depth.ok_or(ValidationError::Missing {
                        field: "known depth",
                        mode,
                    })?;
                    non_negative("known depth", depth)?;
                }
            },
        }
        Ok(())
    }
}
