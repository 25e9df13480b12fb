//! Normal depth, discharge, critical depth and critical slope for channel
//! sections.

use super::{
    Error,
    root::{NewtonOptions, Residual, newton},
    section::{CrossSection, SectionProperties},
};
use crate::domain::{
    Constants, FlowRegime, HydraulicState, SolveFor, SolveRequest, ValidationError,
};

const TWO_THIRDS: f64 = 2.0 / 3.0;

/// Manning's equation for one channel: Q = (k/n)·A·R^(2/3)·√S.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manning {
    k_over_n: f64,
    sqrt_slope: f64,
}

impl Manning {
    /// Manning's equation with unit coefficient `k`, roughness `n` and
    /// longitudinal slope `slope`.
    #[must_use]
    pub fn new(k: f64, n: f64, slope: f64) -> Self {
        Self {
            k_over_n: k / n,
            sqrt_slope: slope.sqrt(),
        }
    }

    /// Discharge carried by a section with the given properties.
    #[must_use]
    pub fn discharge(&self, props: &SectionProperties) -> f64 {
        let radius = props.hydraulic_radius();
        self.k_over_n * props.area * radius.powf(TWO_THIRDS) * self.sqrt_slope
    }

    /// Slope at which a section with the given properties carries
    /// `discharge`: S = (Q / ((k/n)·A·R^(2/3)))².
    #[must_use]
    pub fn slope_for(&self, props: &SectionProperties, discharge: f64) -> f64 {
        let radius = props.hydraulic_radius();
        if props.area > 0.0 && radius > 0.0 {
            (discharge / (self.k_over_n * props.area * radius.powf(TWO_THIRDS))).powi(2)
        } else {
            0.0
        }
    }

    /// f(y) = Q(y) − Q and its derivative.
    fn residual(&self, props: &SectionProperties, discharge: f64) -> Residual {
        let SectionProperties {
            area,
            wetted_perimeter: perimeter,
            d_area,
            d_perimeter,
            ..
        } = *props;

        if perimeter <= 0.0 {
            return Residual::Degenerate;
        }
        let radius = area / perimeter;
        if radius <= 0.0 {
            return Residual::Degenerate;
        }

        let r_two_thirds = radius.powf(TWO_THIRDS);
        let f = self.k_over_n * area * r_two_thirds * self.sqrt_slope - discharge;

        let d_radius = (d_area * perimeter - area * d_perimeter) / (perimeter * perimeter);
        let df = self.k_over_n
            * self.sqrt_slope
            * (d_area * r_two_thirds + area * TWO_THIRDS * radius.powf(-1.0 / 3.0) * d_radius);

        Residual::Value { f, df }
    }
}

/// Depth at which `section` carries `discharge` in uniform flow.
///
/// # Errors
///
/// Returns [`Error::NonConvergence`] if Newton-Raphson exhausts its budget.
pub fn normal_depth(
    section: &CrossSection,
    manning: &Manning,
    discharge: f64,
) -> Result<f64, Error> {
    newton(
        section.initial_depth(),
        NewtonOptions::default(),
        |depth| manning.residual(&section.evaluate(depth), discharge),
    )
    .map_err(|e| Error::NonConvergence {
        solver: "normal depth",
        iterations: e.iterations,
    })
}

/// Depth at which the Froude number of `discharge` is one.
///
/// Rectangular sections use the closed form y_c = (Q²/(g·b²))^(1/3); the
/// other shapes solve Q²·T/(g·A³) = 1 by Newton-Raphson. Zero discharge has
/// zero critical depth.
///
/// # Errors
///
/// Returns [`Error::NonConvergence`] if Newton-Raphson exhausts its budget.
pub fn critical_depth(section: &CrossSection, discharge: f64, gravity: f64) -> Result<f64, Error> {
    if discharge <= 0.0 {
        return Ok(0.0);
    }

    if let CrossSection::Rectangular { bottom } = section {
        return Ok((discharge * discharge / (gravity * bottom * bottom)).cbrt());
    }

    let q2_over_g = discharge * discharge / gravity;
    newton(1.0, NewtonOptions::default(), |depth| {
        let props = section.evaluate(depth);
        let area = props.area;
        if area <= 0.0 {
            return Residual::Degenerate;
        }

        let f = q2_over_g * props.top_width / area.powi(3) - 1.0;
        let df = q2_over_g
            * props
                .d_top_width
                .mul_add(area, -3.0 * props.top_width * props.d_area)
            / area.powi(4);

        if f.is_finite() && df.is_finite() {
            Residual::Value { f, df }
        } else {
            Residual::Degenerate
        }
    })
    .map_err(|e| Error::NonConvergence {
        solver: "critical depth",
        iterations: e.iterations,
    })
}

/// Slope at which uniform flow of `discharge` runs at `critical_depth`.
#[must_use]
pub fn critical_slope(
    section: &CrossSection,
    manning: &Manning,
    discharge: f64,
    critical_depth: f64,
) -> f64 {
    manning.slope_for(&section.evaluate(critical_depth), discharge)
}

/// Solves a validated channel request.
pub(super) fn solve(
    request: &SolveRequest,
    section: &CrossSection,
    constants: Constants,
) -> Result<HydraulicState, Error> {
    let channel = &request.channel;
    let manning = Manning::new(constants.manning_k, channel.mannings_n, channel.slope);

    let (depth, discharge) = match request.solve_for {
        SolveFor::Discharge => {
            let depth = known_depth(request, section)?;
            let discharge = manning.discharge(&section.evaluate(depth));
            tracing::debug!(shape = channel.section.name(), depth, discharge, "discharge from depth");
            (depth, discharge)
        }
        mode @ (SolveFor::Depth | SolveFor::Spread) => {
            let discharge = request.discharge.ok_or(ValidationError::Missing {
                field: "discharge",
                mode,
            })?;
            let depth = normal_depth(section, &manning, discharge)?;
            tracing::debug!(shape = channel.section.name(), depth, discharge, "normal depth converged");
            (depth, discharge)
        }
    };

    let props = section.evaluate(depth);
    let critical_depth = critical_depth(section, discharge, constants.gravity)?;
    let critical_slope = critical_slope(section, &manning, discharge, critical_depth);

    let velocity = if props.area > 0.0 {
        discharge / props.area
    } else {
        0.0
    };
    let hydraulic_depth = props.hydraulic_depth();
    let froude_number = if hydraulic_depth > 0.0 {
        velocity / (constants.gravity * hydraulic_depth).sqrt()
    } else {
        0.0
    };
    let velocity_head = velocity * velocity / (2.0 * constants.gravity);

    let (water_surface_elevation, min_elevation, max_elevation) = match section {
        CrossSection::Irregular(irregular) => (
            Some(irregular.min_elevation() + depth),
            Some(irregular.min_elevation()),
            Some(irregular.max_elevation()),
        ),
        _ => (None, None, None),
    };

    Ok(HydraulicState {
        depth,
        water_surface_elevation,
        min_elevation,
        max_elevation,
        discharge,
        area: props.area,
        wetted_perimeter: props.wetted_perimeter,
        hydraulic_radius: props.hydraulic_radius(),
        top_width: props.top_width,
        velocity,
        froude_number,
        flow_regime: FlowRegime::classify(froude_number),
        critical_depth: Some(critical_depth),
        critical_slope: Some(critical_slope),
        velocity_head,
        specific_energy: depth + velocity_head,
        spread: None,
        gutter_depression: None,
    })
}

/// The depth driving a discharge solve. Irregular sections prefer a known
/// water-surface elevation, measured from the thalweg.
fn known_depth(request: &SolveRequest, section: &CrossSection) -> Result<f64, ValidationError> {
    if let (CrossSection::Irregular(irregular), Some(wse)) = (section, request.known_wse) {
        return Ok((wse - irregular.min_elevation()).max(0.0));
    }
    request.known_depth.ok_or(ValidationError::Missing {
        field: "known depth",
        mode: SolveFor::Discharge,
    })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::{
        domain::{ChannelSpec, Section, SideSlopes, StationElevation, UnitSystem},
        solver::solve,
    };

    fn channel(section: Section, units: UnitSystem) -> ChannelSpec {
        ChannelSpec {
            section,
            slope: 0.001,
            mannings_n: 0.013,
            units,
        }
    }

    fn rectangular() -> Section {
        Section::Rectangular { bottom_width: 5.0 }
    }

    fn trapezoidal() -> Section {
        Section::Trapezoidal {
            bottom_width: 5.0,
            side_slopes: SideSlopes::symmetric(2.0),
        }
    }

    fn triangular() -> Section {
        Section::Triangular {
            side_slopes: SideSlopes::asymmetric(2.0, 3.0),
        }
    }

    fn irregular() -> Section {
        Section::Irregular {
            points: [(0.0, 10.0), (10.0, 5.0), (20.0, 0.0), (30.0, 0.0), (40.0, 5.0), (60.0, 10.0)]
                .into_iter()
                .map(StationElevation::from)
                .collect(),
        }
    }

    #[test]
    fn rectangular_metric_scenario() {
        let request = SolveRequest::depth(channel(rectangular(), UnitSystem::Metric), 10.0);
        let state = solve(&request).unwrap();

        assert!((state.depth - 1.0195).abs() < 1e-3, "depth {}", state.depth);
        assert!((state.area - 5.0977).abs() < 1e-3);
        assert!((state.top_width - 5.0).abs() < 1e-12);
        assert!((state.velocity - 1.9617).abs() < 1e-3);
        assert_eq!(state.flow_regime, FlowRegime::Subcritical);

        let expected_critical = (100.0 / (9.81 * 25.0_f64)).cbrt();
        let critical = state.critical_depth.unwrap();
        assert!((critical - expected_critical).abs() < 1e-12);
        assert!((state.critical_slope.unwrap() - 0.00259).abs() < 1e-5);
        assert!(state.water_surface_elevation.is_none());
    }

    #[test]
    fn rectangular_imperial_discharge() {
        let spec = ChannelSpec {
            section: Section::Rectangular { bottom_width: 10.0 },
            slope: 0.01,
            mannings_n: 0.013,
            units: UnitSystem::Imperial,
        };
        let state = solve(&SolveRequest::discharge_at_depth(spec, 2.0)).unwrap();
        assert!((state.depth - 2.0).abs() < f64::EPSILON);
        assert!(state.discharge > 280.0 && state.discharge < 300.0);
    }

    #[test_case(rectangular(); "rectangular")]
    #[test_case(trapezoidal(); "trapezoidal")]
    #[test_case(triangular(); "triangular")]
    #[test_case(irregular(); "irregular")]
    fn depth_discharge_round_trip(section: Section) {
        for units in [UnitSystem::Metric, UnitSystem::Imperial] {
            let spec = channel(section.clone(), units);
            let target = 12.0;

            let forward = solve(&SolveRequest::depth(spec.clone(), target)).unwrap();
            let back = solve(&SolveRequest::discharge_at_depth(spec, forward.depth)).unwrap();

            assert!(
                (back.discharge - target).abs() / target < 1e-3,
                "{units}: {} vs {target}",
                back.discharge
            );
        }
    }

    #[test]
    fn irregular_trapezoid_matches_trapezoidal_solver() {
        let common = |section| ChannelSpec {
            section,
            slope: 0.001,
            mannings_n: 0.03,
            units: UnitSystem::Metric,
        };
        let trapezoid = common(Section::Trapezoidal {
            bottom_width: 10.0,
            side_slopes: SideSlopes::symmetric(2.0),
        });
        let irregular = common(Section::Irregular {
            points: [(0.0, 10.0), (20.0, 0.0), (30.0, 0.0), (50.0, 10.0)]
                .into_iter()
                .map(StationElevation::from)
                .collect(),
        });

        let a = solve(&SolveRequest::depth(trapezoid, 100.0)).unwrap();
        let b = solve(&SolveRequest::depth(irregular, 100.0)).unwrap();

        assert!((a.depth - b.depth).abs() < 1e-3);
        assert!((a.area - b.area).abs() < 1e-3);
        assert!((a.depth - 3.3338).abs() < 1e-3);
        let critical = (a.critical_depth.unwrap(), b.critical_depth.unwrap());
        assert!((critical.0 - critical.1).abs() < 1e-3);
        assert!((b.water_surface_elevation.unwrap() - b.depth).abs() < 1e-12);
    }

    #[test]
    fn irregular_discharge_from_wse() {
        let spec = ChannelSpec {
            section: Section::Irregular {
                points: [(0.0, 110.0), (5.0, 100.0), (10.0, 110.0)]
                    .into_iter()
                    .map(StationElevation::from)
                    .collect(),
            },
            slope: 0.01,
            mannings_n: 0.013,
            units: UnitSystem::Imperial,
        };
        let state = solve(&SolveRequest::discharge_at_wse(spec.clone(), 105.0)).unwrap();
        assert!((state.depth - 5.0).abs() < 1e-12);
        assert!((state.area - 12.5).abs() < 1e-9);
        assert!(state.discharge > 0.0);
        assert_eq!(state.min_elevation, Some(100.0));
        assert_eq!(state.max_elevation, Some(110.0));
        assert_eq!(state.water_surface_elevation, Some(105.0));

        // Below the thalweg the section is dry.
        let dry = solve(&SolveRequest::discharge_at_wse(spec, 90.0)).unwrap();
        assert!(dry.depth.abs() < f64::EPSILON);
        assert!(dry.discharge.abs() < f64::EPSILON);
        assert!(dry.velocity.abs() < f64::EPSILON);
        assert!(dry.froude_number.abs() < f64::EPSILON);
        assert_eq!(dry.critical_depth, Some(0.0));
    }

    #[test]
    fn natural_channel_imperial_scenario() {
        let points = [
            (0.0, 28.77),
            (6.7, 28.61),
            (13.47, 25.25),
            (21.95, 23.9),
            (31.19, 23.69),
            (31.74, 23.59),
            (42.2, 19.54),
            (58.04, 18.04),
            (86.0, 17.45),
            (115.7, 17.67),
            (139.77, 16.98),
            (169.64, 16.76),
            (187.41, 14.62),
            (188.56, 11.85),
            (199.34, 10.7),
            (206.49, 9.79),
            (219.48, 8.49),
            (229.36, 7.65),
            (239.39, 7.44),
            (254.45, 7.33),
            (269.64, 8.15),
            (283.8, 7.7),
            (300.43, 6.46),
            (311.14, 6.04),
            (320.12, 7.92),
            (330.35, 8.88),
            (339.18, 8.77),
            (350.08, 8.1),
            (359.61, 8.29),
            (365.68, 9.72),
            (370.56, 14.04),
            (379.36, 16.27),
            (384.52, 25.42),
            (405.55, 27.73),
        ];
        let spec = ChannelSpec {
            section: Section::Irregular {
                points: points.into_iter().map(StationElevation::from).collect(),
            },
            slope: 0.002,
            mannings_n: 0.035,
            units: UnitSystem::Imperial,
        };

        let state = solve(&SolveRequest::depth(spec, 20_000.0)).unwrap();

        assert!((state.depth - 14.29).abs() < 0.05, "depth {}", state.depth);
        assert!((state.area - 2690.8).abs() < 0.5, "area {}", state.area);
        assert!((state.wetted_perimeter - 348.7).abs() < 0.2);
        assert!((state.hydraulic_radius - 7.72).abs() < 0.02);
        assert!((state.top_width - 341.47).abs() < 0.2);
        let critical = state.critical_depth.unwrap();
        assert!((critical - 9.57).abs() < 0.05, "critical depth {critical}");
        assert!((state.water_surface_elevation.unwrap() - (6.04 + state.depth)).abs() < 1e-9);
    }

    #[test]
    fn critical_depth_gives_unit_froude() {
        for section in [trapezoidal(), triangular(), irregular()] {
            let cross_section = CrossSection::from_section(&section).unwrap();
            let discharge = 8.0;
            let yc = critical_depth(&cross_section, discharge, 9.81).unwrap();
            let props = cross_section.evaluate(yc);
            let froude_squared = discharge * discharge * props.top_width / (9.81 * props.area.powi(3));
            assert!((froude_squared - 1.0).abs() < 1e-6);
        }
    }

    #[test_case(triangular(), 1e-4; "triangular 0.1 l/s")]
    #[test_case(triangular(), 1e-3; "triangular 1 l/s")]
    #[test_case(triangular(), 5e-3; "triangular 5 l/s")]
    #[test_case(trapezoidal(), 1e-4; "trapezoidal 0.1 l/s")]
    #[test_case(trapezoidal(), 1e-3; "trapezoidal 1 l/s")]
    #[test_case(trapezoidal(), 5e-3; "trapezoidal 5 l/s")]
    #[test_case(irregular(), 1e-4; "irregular 0.1 l/s")]
    #[test_case(irregular(), 1e-3; "irregular 1 l/s")]
    #[test_case(irregular(), 5e-3; "irregular 5 l/s")]
    fn critical_depth_of_small_flows(section: Section, discharge: f64) {
        let cross_section = CrossSection::from_section(&section).unwrap();
        let yc = critical_depth(&cross_section, discharge, 9.81).unwrap();

        assert!(yc > 0.0 && yc < 0.1, "critical depth {yc}");
        let props = cross_section.evaluate(yc);
        let froude_squared = discharge * discharge * props.top_width / (9.81 * props.area.powi(3));
        assert!((froude_squared - 1.0).abs() < 1e-6, "Fr² {froude_squared}");
    }

    #[test_case(0.02; "2 cm")]
    #[test_case(0.05; "5 cm")]
    #[test_case(0.08; "8 cm")]
    fn shallow_ditch_discharge(depth: f64) {
        let ditch = channel(
            Section::Triangular {
                side_slopes: SideSlopes::symmetric(2.0),
            },
            UnitSystem::Metric,
        );
        let state = solve(&SolveRequest::discharge_at_depth(ditch, depth)).unwrap();

        assert!(state.discharge > 0.0);
        let critical = state.critical_depth.unwrap();
        assert!(critical > 0.0 && critical < depth, "critical depth {critical}");
        assert_eq!(state.flow_regime, FlowRegime::Subcritical);
    }

    #[test]
    fn critical_slope_reproduces_critical_flow() {
        let section = CrossSection::from_section(&trapezoidal()).unwrap();
        let manning = Manning::new(1.0, 0.013, 0.001);
        let discharge = 10.0;

        let yc = critical_depth(&section, discharge, 9.81).unwrap();
        let sc = critical_slope(&section, &manning, discharge, yc);

        // At the critical slope the normal depth is the critical depth.
        let steep = Manning::new(1.0, 0.013, sc);
        let yn = normal_depth(&section, &steep, discharge).unwrap();
        assert!((yn - yc).abs() < 1e-6);
    }

    #[test]
    fn steep_channel_is_supercritical() {
        let spec = ChannelSpec {
            slope: 0.05,
            ..channel(rectangular(), UnitSystem::Metric)
        };
        let state = solve(&SolveRequest::depth(spec, 10.0)).unwrap();
        assert_eq!(state.flow_regime, FlowRegime::Supercritical);
        assert!(state.depth < state.critical_depth.unwrap());
    }

    #[test]
    fn specific_energy_adds_velocity_head() {
        let state =
            solve(&SolveRequest::depth(channel(trapezoidal(), UnitSystem::Metric), 10.0)).unwrap();
        let expected_head = state.velocity * state.velocity / (2.0 * 9.81);
        assert!((state.velocity_head - expected_head).abs() < 1e-12);
        assert!((state.specific_energy - (state.depth + expected_head)).abs() < 1e-12);
    }
}
