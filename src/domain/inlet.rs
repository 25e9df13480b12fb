use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, non_negative, positive};

/// A curb-opening inlet on a continuous grade.
///
/// US customary units throughout: cfs, ft, and inches for the local
/// depression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurbInletSpec {
    /// Approaching gutter flow (cfs).
    pub discharge: f64,
    /// Longitudinal slope S (ft/ft).
    pub longitudinal_slope: f64,
    /// Gutter width W (ft).
    pub gutter_width: f64,
    /// Gutter cross slope Sg (ft/ft).
    pub gutter_cross_slope: f64,
    /// Roadway cross slope Sx (ft/ft).
    pub road_cross_slope: f64,
    /// Manning roughness coefficient n.
    pub mannings_n: f64,
    /// Length of the curb opening (ft).
    pub curb_opening_length: f64,
    /// Local depression depth at the inlet (in).
    #[serde(default)]
    pub local_depression_depth_in: f64,
    /// Local depression width at the inlet (in).
    #[serde(default)]
    pub local_depression_width_in: f64,
}

impl CurbInletSpec {
    /// Checks that the inlet geometry can be analysed.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if any flow parameter is not strictly
    /// positive or the local depression is negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("road cross slope", self.road_cross_slope)?;
        positive("gutter cross slope", self.gutter_cross_slope)?;
        positive("discharge", self.discharge)?;
        positive("longitudinal slope", self.longitudinal_slope)?;
        non_negative("gutter width", self.gutter_width)?;
        positive("Manning's n", self.mannings_n)?;
        positive("curb opening length", self.curb_opening_length)?;
        non_negative("local depression depth", self.local_depression_depth_in)?;
        non_negative("local depression width", self.local_depression_width_in)?;
        Ok(())
    }
}

/// Interception performance of a curb-opening inlet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptionResult {
    /// Interception efficiency (%).
    pub efficiency_percent: f64,
    /// Flow captured by the inlet (cfs).
    pub intercepted_flow: f64,
    /// Flow carried past the inlet (cfs).
    pub bypass_flow: f64,
    /// Spread of the approaching flow (ft).
    pub spread: f64,
    /// Depth at the curb (ft).
    pub depth: f64,
    /// Depth at the curb (in).
    pub depth_in: f64,
    /// Flow area of the approaching gutter flow (ft²).
    pub flow_area: f64,
    /// Gutter depression (Sg − Sx)·W (in).
    pub gutter_depression_in: f64,
    /// Gutter plus local depression (in).
    pub total_depression_in: f64,
    /// Mean velocity of the approaching flow (ft/s).
    pub velocity: f64,
    /// Equivalent cross slope Se.
    pub equivalent_cross_slope: f64,
    /// Opening length over required length, L/L_T. Exceeds 1 when the
    /// opening is longer than needed.
    #[serde(default)]
    pub length_ratio: f64,
    /// L/L_T clamped to [0, 1]; drives the efficiency curve.
    pub length_factor: f64,
    /// Curb-opening length needed to intercept all flow (ft).
    pub total_interception_length: f64,
}
