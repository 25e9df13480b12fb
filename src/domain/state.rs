use std::fmt;

use serde::{Deserialize, Serialize};

/// Froude numbers within this distance of 1.0 are classed as critical.
pub const CRITICAL_FROUDE_TOLERANCE: f64 = 0.001;

/// Flow regime, classified from the Froude number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowRegime {
    /// Froude number below 1.
    Subcritical,
    /// Froude number within [`CRITICAL_FROUDE_TOLERANCE`] of 1.
    Critical,
    /// Froude number above 1.
    Supercritical,
}

impl FlowRegime {
    /// Classifies a Froude number.
    ///
    /// ```
    /// use hydrocalc::FlowRegime;
    ///
    /// assert_eq!(FlowRegime::classify(0.62), FlowRegime::Subcritical);
    /// assert_eq!(FlowRegime::classify(1.0005), FlowRegime::Critical);
    /// assert_eq!(FlowRegime::classify(1.4), FlowRegime::Supercritical);
    /// ```
    #[must_use]
    pub fn classify(froude: f64) -> Self {
        if froude > 1.0 + CRITICAL_FROUDE_TOLERANCE {
            Self::Supercritical
        } else if froude < 1.0 - CRITICAL_FROUDE_TOLERANCE {
            Self::Subcritical
        } else {
            Self::Critical
        }
    }
}

impl fmt::Display for FlowRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subcritical => write!(f, "Subcritical"),
            Self::Critical => write!(f, "Critical"),
            Self::Supercritical => write!(f, "Supercritical"),
        }
    }
}

/// The uniform-flow state of a channel.
///
/// Lengths, areas and velocities are in the unit system of the request that
/// produced the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydraulicState {
    /// Flow depth (normal depth, or depth at the curb for gutters).
    pub depth: f64,
    /// Water-surface elevation, irregular sections only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_surface_elevation: Option<f64>,
    /// Thalweg (lowest) elevation, irregular sections only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_elevation: Option<f64>,
    /// Highest ground elevation, irregular sections only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elevation: Option<f64>,
    /// Discharge Q.
    pub discharge: f64,
    /// Flow area A.
    pub area: f64,
    /// Wetted perimeter P.
    pub wetted_perimeter: f64,
    /// Hydraulic radius R = A/P.
    pub hydraulic_radius: f64,
    /// Top width T.
    pub top_width: f64,
    /// Mean velocity V = Q/A.
    pub velocity: f64,
    /// Froude number V/√(gD), D = A/T.
    pub froude_number: f64,
    /// Regime classified from `froude_number`.
    pub flow_regime: FlowRegime,
    /// Critical depth; not computed for gutters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_depth: Option<f64>,
    /// Critical slope; not computed for gutters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_slope: Option<f64>,
    /// Velocity head V²/2g.
    pub velocity_head: f64,
    /// Specific energy y + V²/2g.
    pub specific_energy: f64,
    /// Gutter spread, gutters only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
    /// Gutter depression (Sg − Sx)·W, gutters only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gutter_depression: Option<f64>,
}
