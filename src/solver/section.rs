//! Cross-section geometry as a function of depth.
//!
//! Every channel solver goes through [`CrossSection::evaluate`], which returns
//! the section properties together with their derivatives with respect to
//! depth so Newton-Raphson never needs finite differences.

use crate::domain::{Section, StationElevation};

/// Flat segments closer than this to horizontal never cross the waterline.
const FLAT_SEGMENT: f64 = 1e-12;

/// Geometric properties of the flow area at one depth.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SectionProperties {
    /// Flow area A.
    pub area: f64,
    /// Wetted perimeter P.
    pub wetted_perimeter: f64,
    /// Top width T.
    pub top_width: f64,
    /// dA/dy.
    pub d_area: f64,
    /// dP/dy.
    pub d_perimeter: f64,
    /// dT/dy.
    pub d_top_width: f64,
}

impl SectionProperties {
    /// Hydraulic radius A/P, or zero for a dry section.
    #[must_use]
    pub fn hydraulic_radius(&self) -> f64 {
        if self.wetted_perimeter > 0.0 {
            self.area / self.wetted_perimeter
        } else {
            0.0
        }
    }

    /// Hydraulic depth A/T, or zero for a dry section.
    #[must_use]
    pub fn hydraulic_depth(&self) -> f64 {
        if self.top_width > 0.0 {
            self.area / self.top_width
        } else {
            0.0
        }
    }
}

/// A channel cross-section that can be evaluated at any depth.
#[derive(Debug, Clone, PartialEq)]
pub enum CrossSection {
    /// Vertical walls, bottom width `bottom`.
    Rectangular {
        /// Bottom width b.
        bottom: f64,
    },
    /// Sloped walls on a flat bottom.
    Trapezoidal {
        /// Bottom width b.
        bottom: f64,
        /// Left side slope zL (H:V).
        left: f64,
        /// Right side slope zR (H:V).
        right: f64,
    },
    /// Sloped walls meeting at a point.
    Triangular {
        /// Left side slope zL (H:V).
        left: f64,
        /// Right side slope zR (H:V).
        right: f64,
    },
    /// Surveyed station/elevation polyline.
    Irregular(IrregularSection),
}

impl CrossSection {
    /// Builds the evaluable geometry of a channel section.
    ///
    /// Returns `None` for gutters, which use the spread model in
    /// [`crate::solver::gutter`] instead.
    #[must_use]
    pub fn from_section(section: &Section) -> Option<Self> {
        let cross_section = match section {
            Section::Rectangular { bottom_width } => Self::Rectangular {
                bottom: *bottom_width,
            },
            Section::Trapezoidal {
                bottom_width,
                side_slopes,
            } => {
                let (left, right) = side_slopes.resolve();
                Self::Trapezoidal {
                    bottom: *bottom_width,
                    left,
                    right,
                }
            }
            Section::Triangular { side_slopes } => {
                let (left, right) = side_slopes.resolve();
                Self::Triangular { left, right }
            }
            Section::Irregular { points } => Self::Irregular(IrregularSection::new(points)),
            Section::Gutter { .. } => return None,
        };
        Some(cross_section)
    }

    /// Area, wetted perimeter, top width and their depth derivatives at
    /// `depth`.
    #[must_use]
    pub fn evaluate(&self, depth: f64) -> SectionProperties {
        match self {
            Self::Rectangular { bottom } => SectionProperties {
                area: bottom * depth,
                wetted_perimeter: 2.0f64.mul_add(depth, *bottom),
                top_width: *bottom,
                d_area: *bottom,
                d_perimeter: 2.0,
                d_top_width: 0.0,
            },
            Self::Trapezoidal {
                bottom,
                left,
                right,
            } => sloped_walls(*bottom, *left, *right, depth),
            Self::Triangular { left, right } => sloped_walls(0.0, *left, *right, depth),
            Self::Irregular(section) => section.evaluate(depth),
        }
    }

    /// Starting depth for the normal-depth iteration.
    #[must_use]
    pub fn initial_depth(&self) -> f64 {
        match self {
            Self::Irregular(section) => {
                let relief = section.relief();
                if relief > 0.0 { 0.2 * relief } else { 1.0 }
            }
            _ => 1.0,
        }
    }
}

fn sloped_walls(bottom: f64, left: f64, right: f64, depth: f64) -> SectionProperties {
    let wall_left = left.hypot(1.0);
    let wall_right = right.hypot(1.0);
    let spread = left + right;
    let top_width = spread.mul_add(depth, bottom);

    SectionProperties {
        area: (0.5 * spread * depth).mul_add(depth, bottom * depth),
        wetted_perimeter: (wall_left + wall_right).mul_add(depth, bottom),
        top_width,
        d_area: top_width,
        d_perimeter: wall_left + wall_right,
        d_top_width: spread,
    }
}

/// An irregular section: a polyline of surveyed points ordered by station.
#[derive(Debug, Clone, PartialEq)]
pub struct IrregularSection {
    points: Vec<StationElevation>,
    min_elevation: f64,
    max_elevation: f64,
}

impl IrregularSection {
    /// Sorts `points` by station (stably, so duplicate stations keep their
    /// input order) and records the elevation range.
    #[must_use]
    pub fn new(points: &[StationElevation]) -> Self {
        let mut points = points.to_vec();
        points.sort_by(|a, b| a.station.total_cmp(&b.station));

        let (min_elevation, max_elevation) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), point| (lo.min(point.elevation), hi.max(point.elevation)),
        );

        Self {
            points,
            min_elevation,
            max_elevation,
        }
    }

    /// Elevation of the thalweg, the depth datum.
    #[must_use]
    pub const fn min_elevation(&self) -> f64 {
        self.min_elevation
    }

    /// Highest ground elevation in the section.
    #[must_use]
    pub const fn max_elevation(&self) -> f64 {
        self.max_elevation
    }

    /// Vertical extent of the section.
    #[must_use]
    pub fn relief(&self) -> f64 {
        self.max_elevation - self.min_elevation
    }

    /// Section properties with the water surface `depth` above the thalweg.
    #[must_use]
    pub fn evaluate(&self, depth: f64) -> SectionProperties {
        let wse = self.min_elevation + depth;

        let mut props = SectionProperties::default();
        for pair in self.points.windows(2) {
            let segment = Segment::new(pair[0], pair[1]);
            segment.accumulate(segment.wetting(wse), wse, &mut props);
        }
        props.d_area = props.top_width;
        props
    }
}

/// How a segment sits relative to the water surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wetting {
    /// Entirely at or above the water surface.
    Dry,
    /// Both ends below the water surface.
    Submerged,
    /// The water surface cuts the segment.
    Crossing {
        /// Fraction of the segment, from its start, where the water surface
        /// intersects it.
        fraction: f64,
        /// Whether the start point is the submerged end.
        start_wet: bool,
    },
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: StationElevation,
    end: StationElevation,
}

impl Segment {
    const fn new(start: StationElevation, end: StationElevation) -> Self {
        Self { start, end }
    }

    fn dx(&self) -> f64 {
        self.end.station - self.start.station
    }

    fn dz(&self) -> f64 {
        self.end.elevation - self.start.elevation
    }

    fn length(&self) -> f64 {
        self.dx().hypot(self.dz())
    }

    fn wetting(&self, wse: f64) -> Wetting {
        let start_wet = self.start.elevation < wse;
        let end_wet = self.end.elevation < wse;

        match (start_wet, end_wet) {
            (true, true) => Wetting::Submerged,
            (false, false) => Wetting::Dry,
            _ if self.dz().abs() < FLAT_SEGMENT => Wetting::Dry,
            _ => Wetting::Crossing {
                fraction: ((wse - self.start.elevation) / self.dz()).clamp(0.0, 1.0),
                start_wet,
            },
        }
    }

    /// Adds this segment's share of the flow geometry to `props`.
    ///
    /// Only crossing segments move with the water surface, so only they
    /// contribute to dP/dy and dT/dy.
    fn accumulate(&self, wetting: Wetting, wse: f64, props: &mut SectionProperties) {
        let dx = self.dx();
        match wetting {
            Wetting::Dry => {}
            Wetting::Submerged => {
                let d_start = wse - self.start.elevation;
                let d_end = wse - self.end.elevation;
                props.area += 0.5 * (d_start + d_end) * dx;
                props.wetted_perimeter += self.length();
                props.top_width += dx;
            }
            Wetting::Crossing {
                fraction,
                start_wet,
            } => {
                let (wet_fraction, depth) = if start_wet {
                    (fraction, wse - self.start.elevation)
                } else {
                    (1.0 - fraction, wse - self.end.elevation)
                };
                let wet_width = dx * wet_fraction;
                let dz = self.dz().abs();

                props.area += 0.5 * depth * wet_width;
                props.wetted_perimeter += self.length() * wet_fraction;
                props.top_width += wet_width;
                props.d_perimeter += self.length() / dz;
                props.d_top_width += (dx / dz).abs();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::SideSlopes;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn points(raw: &[(f64, f64)]) -> Vec<StationElevation> {
        raw.iter().copied().map(StationElevation::from).collect()
    }

    #[test]
    fn rectangular_closed_form() {
        let props = CrossSection::Rectangular { bottom: 5.0 }.evaluate(1.2);
        assert_close(props.area, 6.0);
        assert_close(props.wetted_perimeter, 7.4);
        assert_close(props.top_width, 5.0);
        assert_close(props.d_area, 5.0);
        assert_close(props.d_perimeter, 2.0);
        assert_close(props.d_top_width, 0.0);
    }

    #[test]
    fn trapezoidal_closed_form() {
        let section = CrossSection::Trapezoidal {
            bottom: 10.0,
            left: 2.0,
            right: 3.0,
        };
        let y = 2.0;
        let props = section.evaluate(y);
        assert_close(props.area, 10.0 * y + 0.5 * 5.0 * y * y);
        assert_close(
            props.wetted_perimeter,
            10.0 + y * 5.0_f64.sqrt() + y * 10.0_f64.sqrt(),
        );
        assert_close(props.top_width, 20.0);
        assert_close(props.d_area, 20.0);
        assert_close(props.d_perimeter, 5.0_f64.sqrt() + 10.0_f64.sqrt());
        assert_close(props.d_top_width, 5.0);
    }

    #[test]
    fn triangular_closed_form() {
        let section = CrossSection::Triangular {
            left: 2.0,
            right: 2.0,
        };
        let props = section.evaluate(3.0);
        assert_close(props.area, 18.0);
        assert_close(props.wetted_perimeter, 6.0 * 5.0_f64.sqrt());
        assert_close(props.top_width, 12.0);
    }

    #[test]
    fn from_section_resolves_side_slopes() {
        let section = Section::Trapezoidal {
            bottom_width: 4.0,
            side_slopes: SideSlopes::symmetric(1.5),
        };
        assert_eq!(
            CrossSection::from_section(&section),
            Some(CrossSection::Trapezoidal {
                bottom: 4.0,
                left: 1.5,
                right: 1.5
            })
        );

        let gutter = Section::Gutter {
            gutter_width: 2.0,
            gutter_cross_slope: 0.06,
            road_cross_slope: 0.02,
        };
        assert_eq!(CrossSection::from_section(&gutter), None);
    }

    #[test_case(0.5; "shallow")]
    #[test_case(3.0; "mid")]
    #[test_case(9.5; "near bank")]
    fn irregular_trapezoid_matches_closed_form(depth: f64) {
        let irregular = IrregularSection::new(&points(&[
            (0.0, 10.0),
            (20.0, 0.0),
            (30.0, 0.0),
            (50.0, 10.0),
        ]));
        let trapezoid = CrossSection::Trapezoidal {
            bottom: 10.0,
            left: 2.0,
            right: 2.0,
        };

        let a = irregular.evaluate(depth);
        let b = trapezoid.evaluate(depth);
        assert_close(a.area, b.area);
        assert_close(a.wetted_perimeter, b.wetted_perimeter);
        assert_close(a.top_width, b.top_width);
        assert_close(a.d_area, b.d_area);
        assert_close(a.d_perimeter, b.d_perimeter);
        assert_close(a.d_top_width, b.d_top_width);
    }

    #[test]
    fn irregular_v_notch() {
        let section = IrregularSection::new(&points(&[(0.0, 10.0), (5.0, 0.0), (10.0, 10.0)]));
        let props = section.evaluate(5.0);
        assert_close(props.area, 12.5);
        assert_close(props.top_width, 5.0);
        assert_close(props.wetted_perimeter, 2.0 * 2.5_f64.hypot(5.0));
    }

    #[test]
    fn irregular_sorts_by_station() {
        let sorted = IrregularSection::new(&points(&[(0.0, 10.0), (5.0, 0.0), (10.0, 10.0)]));
        let shuffled = IrregularSection::new(&points(&[(10.0, 10.0), (0.0, 10.0), (5.0, 0.0)]));
        assert_eq!(sorted.evaluate(4.0), shuffled.evaluate(4.0));
        assert_close(sorted.min_elevation(), 0.0);
        assert_close(sorted.max_elevation(), 10.0);
        assert_close(sorted.relief(), 10.0);
    }

    #[test]
    fn duplicate_station_is_a_vertical_wall() {
        // A rectangular slot 4 wide and 3 deep, walls given as duplicate
        // stations.
        let section = IrregularSection::new(&points(&[
            (0.0, 3.0),
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 3.0),
        ]));
        let props = section.evaluate(1.0);
        let rectangle = CrossSection::Rectangular { bottom: 4.0 }.evaluate(1.0);
        assert_close(props.area, rectangle.area);
        assert_close(props.wetted_perimeter, rectangle.wetted_perimeter);
        assert_close(props.top_width, rectangle.top_width);
        assert_close(props.d_perimeter, 2.0);
        assert_close(props.d_top_width, 0.0);
    }

    #[test]
    fn flat_segment_at_waterline_is_dry() {
        let segment = Segment::new(StationElevation::new(0.0, 2.0), StationElevation::new(5.0, 2.0));
        assert_eq!(segment.wetting(2.0), Wetting::Dry);
        assert_eq!(segment.wetting(2.5), Wetting::Submerged);

        // One end a hair below the surface, the other a hair above.
        let nearly_flat = Segment::new(
            StationElevation::new(0.0, 2.0),
            StationElevation::new(5.0, 2.0 + 1e-13),
        );
        assert_eq!(nearly_flat.wetting(2.0 + 5e-14), Wetting::Dry);
    }

    #[test]
    fn crossing_fraction() {
        let segment = Segment::new(StationElevation::new(0.0, 0.0), StationElevation::new(4.0, 8.0));
        assert_eq!(
            segment.wetting(2.0),
            Wetting::Crossing {
                fraction: 0.25,
                start_wet: true
            }
        );

        let descending =
            Segment::new(StationElevation::new(0.0, 8.0), StationElevation::new(4.0, 0.0));
        assert_eq!(
            descending.wetting(2.0),
            Wetting::Crossing {
                fraction: 0.75,
                start_wet: false
            }
        );
    }

    #[test]
    fn submerged_segments_do_not_move_derivatives() {
        let section = IrregularSection::new(&points(&[
            (0.0, 10.0),
            (20.0, 0.0),
            (30.0, 0.0),
            (50.0, 10.0),
        ]));
        // The bottom is submerged, both banks cross: dT/dy = 2 + 2.
        let props = section.evaluate(1.0);
        assert_close(props.d_top_width, 4.0);
        assert_close(props.d_perimeter, 2.0 * 5.0_f64.sqrt());
    }

    #[test]
    fn dry_section_has_no_area() {
        let section = IrregularSection::new(&points(&[(0.0, 1.0), (1.0, 0.0), (2.0, 1.0)]));
        let props = section.evaluate(0.0);
        assert_close(props.area, 0.0);
        assert_close(props.wetted_perimeter, 0.0);
        assert_close(props.hydraulic_radius(), 0.0);
        assert_close(props.hydraulic_depth(), 0.0);
    }

    #[test]
    fn initial_depth_from_relief() {
        let section = CrossSection::Irregular(IrregularSection::new(&points(&[
            (0.0, 10.0),
            (5.0, 0.0),
            (10.0, 10.0),
        ])));
        assert_close(section.initial_depth(), 2.0);

        let flat = CrossSection::Irregular(IrregularSection::new(&points(&[
            (0.0, 1.0),
            (5.0, 1.0),
        ])));
        assert_close(flat.initial_depth(), 1.0);
        assert_close(CrossSection::Rectangular { bottom: 1.0 }.evaluate(0.0).area, 0.0);
    }
}
