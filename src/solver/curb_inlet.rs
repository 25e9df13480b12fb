use super::{
    Error,
    gutter::{Gutter, GutterFlowModel},
    root::Bracket,
};
use crate::domain::{CurbInletSpec, InterceptionResult, UnitSystem, ValidationError};

const INCHES_PER_FOOT: f64 = 12.0;

/// Empirical curb-opening interception curve.
///
/// The length needed to intercept all flow is
/// `L_T = coefficient · Q^a · S^b · (1/(n·Se))^c`, and an opening of length
/// `L` intercepts `E = 1 − (1 − L/L_T)^d` of the flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurbOpeningModel {
    /// Leading coefficient (US customary).
    pub coefficient: f64,
    /// Exponent on discharge.
    pub discharge_exponent: f64,
    /// Exponent on longitudinal slope.
    pub slope_exponent: f64,
    /// Exponent on 1/(n·Se).
    pub roughness_exponent: f64,
    /// Exponent of the efficiency curve.
    pub efficiency_exponent: f64,
}

impl CurbOpeningModel {
    /// HEC-22 curb opening on grade.
    pub const HEC22: Self = Self {
        coefficient: 0.6,
        discharge_exponent: 0.42,
        slope_exponent: 0.30,
        roughness_exponent: 0.60,
        efficiency_exponent: 1.8,
    };

    fn interception_length(&self, discharge: f64, slope: f64, n: f64, se: f64) -> f64 {
        self.coefficient
            * discharge.powf(self.discharge_exponent)
            * slope.powf(self.slope_exponent)
            * (1.0 / (n * se)).powf(self.roughness_exponent)
    }

    fn efficiency(&self, length_factor: f64) -> f64 {
        1.0 - (1.0 - length_factor.clamp(0.0, 1.0)).powf(self.efficiency_exponent)
    }
}

impl Default for CurbOpeningModel {
    fn default() -> Self {
        Self::HEC22
    }
}

/// Solves a curb opening inlet on grade.
pub(super) fn solve(
    spec: &CurbInletSpec,
    model: &CurbOpeningModel,
) -> Result<InterceptionResult, Error> {
    spec.validate()?;

    let gutter = Gutter {
        width: spec.gutter_width,
        gutter_cross_slope: spec.gutter_cross_slope,
        road_cross_slope: spec.road_cross_slope,
    };
    let flow_model = GutterFlowModel::new(
        gutter,
        UnitSystem::Imperial.constants().gutter_manning_k,
        spec.mannings_n,
        spec.longitudinal_slope,
    );
    let bracket = Bracket {
        upper: spec.gutter_width.max(1.0),
        growth: 1.5,
        expansions: 80,
        iterations: 100,
    };

    let discharge = spec.discharge;
    let spread = flow_model.spread_for(discharge, bracket)?;
    let flow = flow_model.at_spread(spread);

    let depressed_ratio = if flow.discharge > 0.0 {
        flow.depressed_discharge / flow.discharge
    } else {
        0.0
    };
    let total_depression = flow.depression + spec.local_depression_depth_in / INCHES_PER_FOOT;
    let equivalent_cross_slope = if spec.gutter_width <= 0.0 {
        spec.road_cross_slope
    } else {
        (total_depression / spec.gutter_width).mul_add(depressed_ratio, spec.road_cross_slope)
    };
    if equivalent_cross_slope <= 0.0 {
        return Err(ValidationError::NotPositive {
            field: "equivalent cross slope",
            value: equivalent_cross_slope,
        }
        .into());
    }

    let total_interception_length = model.interception_length(
        discharge,
        spec.longitudinal_slope,
        spec.mannings_n,
        equivalent_cross_slope,
    );
    let length_ratio = if total_interception_length > 0.0 {
        spec.curb_opening_length / total_interception_length
    } else {
        0.0
    };
    let length_factor = length_ratio.clamp(0.0, 1.0);
    let efficiency = model.efficiency(length_factor);
    let intercepted_flow = efficiency * discharge;

    tracing::debug!(
        spread,
        equivalent_cross_slope,
        total_interception_length,
        efficiency,
        "curb inlet solved"
    );

    let gutter_depression_in = flow.depression * INCHES_PER_FOOT;
    Ok(InterceptionResult {
        efficiency_percent: efficiency * 100.0,
        intercepted_flow,
        bypass_flow: discharge - intercepted_flow,
        spread,
        depth: flow.depth_at_curb,
        depth_in: flow.depth_at_curb * INCHES_PER_FOOT,
        flow_area: flow.area,
        gutter_depression_in,
        total_depression_in: gutter_depression_in + spec.local_depression_depth_in,
        velocity: if flow.area > 0.0 {
            discharge / flow.area
        } else {
            0.0
        },
        equivalent_cross_slope,
        length_ratio,
        length_factor,
        total_interception_length,
    })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::solver::solve_curb_inlet;

    struct Expected {
        efficiency_percent: f64,
        intercepted_flow: f64,
        bypass_flow: f64,
        spread: f64,
        depth: f64,
        flow_area: f64,
        total_depression_in: f64,
        velocity: f64,
        equivalent_cross_slope: f64,
        length_factor: f64,
        total_interception_length: f64,
    }

    const fn spec(
        discharge: f64,
        longitudinal_slope: f64,
        mannings_n: f64,
        curb_opening_length: f64,
        local_depression_depth_in: f64,
        local_depression_width_in: f64,
    ) -> CurbInletSpec {
        CurbInletSpec {
            discharge,
            longitudinal_slope,
            gutter_width: 2.0,
            gutter_cross_slope: 0.06,
            road_cross_slope: 0.02,
            mannings_n,
            curb_opening_length,
            local_depression_depth_in,
            local_depression_width_in,
        }
    }

    #[test_case(
        spec(10.0, 0.005, 0.016, 12.0, 0.6, 2.0),
        Expected {
            efficiency_percent: 65.25,
            intercepted_flow: 6.53,
            bypass_flow: 3.47,
            spread: 19.1,
            depth: 0.46,
            flow_area: 3.7,
            total_depression_in: 1.6,
            velocity: 2.67,
            equivalent_cross_slope: 0.039,
            length_factor: 0.444,
            total_interception_length: 27.0,
        };
        "10 cfs"
    )]
    #[test_case(
        spec(15.0, 0.010, 0.020, 21.0, 1.0, 3.0),
        Expected {
            efficiency_percent: 83.38,
            intercepted_flow: 12.51,
            bypass_flow: 2.49,
            spread: 21.3,
            depth: 0.51,
            flow_area: 4.6,
            total_depression_in: 2.0,
            velocity: 3.24,
            equivalent_cross_slope: 0.041,
            length_factor: 0.631,
            total_interception_length: 33.3,
        };
        "15 cfs"
    )]
    #[test_case(
        spec(20.0, 0.003, 0.016, 18.0, 0.6, 2.0),
        Expected {
            efficiency_percent: 73.99,
            intercepted_flow: 14.80,
            bypass_flow: 5.20,
            spread: 27.6,
            depth: 0.63,
            flow_area: 7.7,
            total_depression_in: 1.6,
            velocity: 2.61,
            equivalent_cross_slope: 0.033,
            length_factor: 0.527,
            total_interception_length: 34.2,
        };
        "20 cfs"
    )]
    fn matches_published_scenarios(spec: CurbInletSpec, expected: Expected) {
        let result = solve_curb_inlet(&spec).unwrap();

        let close = |actual: f64, expected: f64, tolerance: f64| {
            assert!(
                (actual - expected).abs() <= tolerance,
                "expected {expected} ± {tolerance}, got {actual}"
            );
        };
        close(result.efficiency_percent, expected.efficiency_percent, 0.2);
        close(result.intercepted_flow, expected.intercepted_flow, 0.05);
        close(result.bypass_flow, expected.bypass_flow, 0.05);
        close(result.spread, expected.spread, 0.3);
        close(result.depth, expected.depth, 0.02);
        close(result.flow_area, expected.flow_area, 0.2);
        close(result.gutter_depression_in, 1.0, 0.1);
        close(result.total_depression_in, expected.total_depression_in, 0.2);
        close(result.velocity, expected.velocity, 0.1);
        close(
            result.equivalent_cross_slope,
            expected.equivalent_cross_slope,
            0.002,
        );
        close(result.length_factor, expected.length_factor, 0.01);
        close(result.length_ratio, expected.length_factor, 0.01);
        close(
            result.total_interception_length,
            expected.total_interception_length,
            0.3,
        );
    }

    #[test]
    fn flows_balance() {
        let result = solve_curb_inlet(&spec(10.0, 0.005, 0.016, 12.0, 0.6, 2.0)).unwrap();
        assert!((result.intercepted_flow + result.bypass_flow - 10.0).abs() < 1e-12);
        assert!((result.depth_in - result.depth * 12.0).abs() < 1e-12);
    }

    #[test]
    fn zero_gutter_width_uses_road_cross_slope() {
        let inlet = CurbInletSpec {
            gutter_width: 0.0,
            ..spec(10.0, 0.005, 0.016, 12.0, 0.6, 2.0)
        };
        let result = solve_curb_inlet(&inlet).unwrap();
        assert!((result.equivalent_cross_slope - 0.02).abs() < f64::EPSILON);
        assert!(result.gutter_depression_in.abs() < f64::EPSILON);
        assert!((result.total_depression_in - 0.6).abs() < 1e-12);
    }

    #[test]
    fn long_opening_captures_everything() {
        let result = solve_curb_inlet(&spec(0.5, 0.02, 0.016, 30.0, 0.0, 0.0)).unwrap();
        assert!(result.length_ratio > 1.0);
        assert!((result.length_factor - 1.0).abs() < f64::EPSILON);
        assert!((result.efficiency_percent - 100.0).abs() < 1e-9);
        assert!(result.bypass_flow.abs() < 1e-12);
    }

    #[test]
    fn rejects_zero_cross_slope() {
        let inlet = CurbInletSpec {
            road_cross_slope: 0.0,
            ..spec(10.0, 0.005, 0.016, 12.0, 0.6, 2.0)
        };
        let error = solve_curb_inlet(&inlet).unwrap_err();
        assert!(error.is_invalid_input());
    }

    #[test]
    fn efficiency_curve_is_clamped() {
        let model = CurbOpeningModel::HEC22;
        assert!(model.efficiency(-0.5).abs() < f64::EPSILON);
        assert!((model.efficiency(1.7) - 1.0).abs() < f64::EPSILON);
        assert!((model.efficiency(0.5) - (1.0 - 0.5_f64.powf(1.8))).abs() < 1e-12);
    }
}
