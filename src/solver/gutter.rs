//! Composite roadway gutter flow.
//!
//! Flow is treated as a shallow sheet whose depth varies linearly across the
//! spread, so Manning's equation integrates in closed form: a triangle of
//! cross slope `s` and curb depth `d` carries `(k·3/8)/n · √S · d^(8/3) / s`.
//! A composite section splits the spread into the depressed gutter (width W,
//! slope Sg) and the roadway beyond it (slope Sx).

use super::{
    Error,
    root::{Bracket, bisect_increasing},
};
use crate::domain::{
    Constants, FlowRegime, HydraulicState, Section, SolveFor, SolveRequest, ValidationError,
};

const EIGHT_THIRDS: f64 = 8.0 / 3.0;

/// Gutter geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gutter {
    /// Gutter width W. Zero means the whole spread runs at the gutter slope.
    pub width: f64,
    /// Gutter cross slope Sg.
    pub gutter_cross_slope: f64,
    /// Roadway cross slope Sx.
    pub road_cross_slope: f64,
}

impl Gutter {
    /// The gutter geometry of a section, or `None` for channel shapes.
    #[must_use]
    pub fn from_section(section: &Section) -> Option<Self> {
        match section {
            Section::Gutter {
                gutter_width,
                gutter_cross_slope,
                road_cross_slope,
            } => Some(Self {
                width: *gutter_width,
                gutter_cross_slope: *gutter_cross_slope,
                road_cross_slope: *road_cross_slope,
            }),
            _ => None,
        }
    }

    /// Gutter depression (Sg − Sx)·W, never negative.
    #[must_use]
    pub fn depression(&self) -> f64 {
        ((self.gutter_cross_slope - self.road_cross_slope) * self.width).max(0.0)
    }
}

/// Flow and geometry of a gutter at one spread.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GutterFlow {
    /// Total discharge.
    pub discharge: f64,
    /// Discharge within the gutter width.
    pub depressed_discharge: f64,
    /// Discharge over the roadway beyond the gutter.
    pub road_discharge: f64,
    /// Depth at the curb face.
    pub depth_at_curb: f64,
    /// Depth at the outer edge of the gutter.
    pub depth_at_gutter_edge: f64,
    /// Gutter depression applied at this spread (zero while the spread stays
    /// inside the gutter).
    pub depression: f64,
    /// Flow area.
    pub area: f64,
    /// Top width, equal to the spread.
    pub top_width: f64,
    /// Wetted perimeter, approximated by the spread for shallow flow.
    pub wetted_perimeter: f64,
}

/// Spread/discharge relationship of one gutter at a fixed slope and
/// roughness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GutterFlowModel {
    gutter: Gutter,
    coefficient: f64,
}

impl GutterFlowModel {
    /// A model with unit coefficient `k`, roughness `n` and longitudinal
    /// slope `slope`.
    #[must_use]
    pub fn new(gutter: Gutter, k: f64, n: f64, slope: f64) -> Self {
        Self {
            gutter,
            coefficient: k * (3.0 / 8.0) / n * slope.sqrt(),
        }
    }

    /// Discharge and geometry at `spread`. A non-positive spread carries no
    /// flow.
    #[must_use]
    pub fn at_spread(&self, spread: f64) -> GutterFlow {
        if spread <= 0.0 {
            return GutterFlow::default();
        }

        let Gutter {
            width,
            gutter_cross_slope: sg,
            road_cross_slope: sx,
        } = self.gutter;
        let width = width.max(0.0);

        if width <= 0.0 || spread <= width {
            let depth_at_curb = sg * spread;
            let discharge = self.coefficient / sg * depth_at_curb.powf(EIGHT_THIRDS);
            return GutterFlow {
                discharge,
                depressed_discharge: discharge,
                road_discharge: 0.0,
                depth_at_curb,
                depth_at_gutter_edge: 0.0,
                depression: 0.0,
                area: 0.5 * sg * spread * spread,
                top_width: spread,
                wetted_perimeter: spread,
            };
        }

        let depression = self.gutter.depression();
        let depth_at_curb = sx.mul_add(spread, depression);
        let depth_at_gutter_edge = sx * (spread - width);

        let edge_term = depth_at_gutter_edge.powf(EIGHT_THIRDS);
        let depressed_discharge =
            self.coefficient / sg * (depth_at_curb.powf(EIGHT_THIRDS) - edge_term);
        let road_discharge = self.coefficient / sx * edge_term;

        let depressed_area = 0.5 * (depth_at_curb + depth_at_gutter_edge) * width;
        let road_area = 0.5 * (spread - width) * depth_at_gutter_edge;

        GutterFlow {
            discharge: depressed_discharge + road_discharge,
            depressed_discharge,
            road_discharge,
            depth_at_curb,
            depth_at_gutter_edge,
            depression,
            area: depressed_area + road_area,
            top_width: spread,
            wetted_perimeter: spread,
        }
    }

    /// Spread at which the gutter carries `discharge`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonConvergence`] if `bracket` never grows large enough
    /// to contain the target discharge.
    pub fn spread_for(&self, discharge: f64, bracket: Bracket) -> Result<f64, Error> {
        bisect_increasing(discharge, bracket, |spread| self.at_spread(spread).discharge).map_err(
            |e| {
                tracing::debug!(upper = e.upper, discharge, "spread bracket exhausted");
                Error::NonConvergence {
                    solver: "spread bisection",
                    iterations: bracket.expansions,
                }
            },
        )
    }
}

/// Bracket for the standalone gutter solve: seeded at max(W, 10), doubled up
/// to 20 times.
fn bracket(gutter: &Gutter) -> Bracket {
    Bracket {
        upper: gutter.width.max(10.0),
        growth: 2.0,
        expansions: 20,
        iterations: 100,
    }
}

/// Solves a validated gutter request. Depth and spread modes share the
/// spread search; discharge mode evaluates the model once.
pub(super) fn solve(request: &SolveRequest, constants: Constants) -> Result<HydraulicState, Error> {
    let channel = &request.channel;
    let gutter = Gutter::from_section(&channel.section).ok_or(ValidationError::UnsupportedMode {
        mode: request.solve_for,
        shape: channel.section.name(),
    })?;
    let model = GutterFlowModel::new(
        gutter,
        constants.gutter_manning_k,
        channel.mannings_n,
        channel.slope,
    );

    let (spread, discharge) = match request.solve_for {
        SolveFor::Discharge => {
            let spread = request.spread.ok_or(ValidationError::Missing {
                field: "spread",
                mode: SolveFor::Discharge,
            })?;
            (spread, model.at_spread(spread).discharge)
        }
        mode @ (SolveFor::Depth | SolveFor::Spread) => {
            let discharge = request.discharge.ok_or(ValidationError::Missing {
                field: "discharge",
                mode,
            })?;
            (model.spread_for(discharge, bracket(&gutter))?, discharge)
        }
    };
    tracing::debug!(spread, discharge, mode = %request.solve_for, "gutter solved");

    let flow = model.at_spread(spread);
    let velocity = if flow.area > 0.0 {
        discharge / flow.area
    } else {
        0.0
    };
    let hydraulic_radius = if flow.wetted_perimeter > 0.0 {
        flow.area / flow.wetted_perimeter
    } else {
        0.0
    };
    let hydraulic_depth = if flow.top_width > 0.0 {
        flow.area / flow.top_width
    } else {
        0.0
    };
    let froude_number = if hydraulic_depth > 0.0 {
        velocity / (constants.gravity * hydraulic_depth).sqrt()
    } else {
        0.0
    };
    let velocity_head = velocity * velocity / (2.0 * constants.gravity);

    Ok(HydraulicState {
        depth: flow.depth_at_curb,
        water_surface_elevation: None,
        min_elevation: None,
        max_elevation: None,
        discharge,
        area: flow.area,
        wetted_perimeter: flow.wetted_perimeter,
        hydraulic_radius,
        top_width: flow.top_width,
        velocity,
        froude_number,
        flow_regime: FlowRegime::classify(froude_number),
        critical_depth: None,
        critical_slope: None,
        velocity_head,
        specific_energy: flow.depth_at_curb + velocity_head,
        spread: Some(spread),
        gutter_depression: Some(flow.depression),
    })
}
