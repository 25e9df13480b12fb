//! Report rendering for solved channels.
//!
//! Each renderer lists the request inputs followed by every populated field
//! of the [`HydraulicState`], with unit labels from the request's unit
//! system. Slopes are always printed with at least six decimal places.

use std::fmt::Write as _;

use crate::domain::{HydraulicState, Section, SolveFor, SolveRequest, UnitSystem};

const MIN_SLOPE_PRECISION: usize = 6;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Number(f64),
    Slope(f64),
    Text(String),
}

impl Value {
    fn render(&self, precision: usize) -> String {
        match self {
            Self::Number(value) => format!("{value:.precision$}"),
            Self::Slope(value) => {
                let precision = precision.max(MIN_SLOPE_PRECISION);
                format!("{value:.precision$}")
            }
            Self::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    parameter: &'static str,
    value: Value,
    unit: &'static str,
}

impl Row {
    const fn number(parameter: &'static str, value: f64, unit: &'static str) -> Self {
        Self {
            parameter,
            value: Value::Number(value),
            unit,
        }
    }

    const fn slope(parameter: &'static str, value: f64, unit: &'static str) -> Self {
        Self {
            parameter,
            value: Value::Slope(value),
            unit,
        }
    }

    fn text(parameter: &'static str, value: impl ToString) -> Self {
        Self {
            parameter,
            value: Value::Text(value.to_string()),
            unit: "",
        }
    }
}

fn input_rows(request: &SolveRequest) -> Vec<Row> {
    let channel = &request.channel;
    let units = channel.units;
    let mut rows = vec![Row::text("Shape", channel.section.name())];

    match &channel.section {
        Section::Rectangular { bottom_width } => {
            rows.push(Row::number("Bottom width", *bottom_width, units.length()));
        }
        Section::Trapezoidal {
            bottom_width,
            side_slopes,
        } => {
            let (left, right) = side_slopes.resolve();
            rows.push(Row::number("Bottom width", *bottom_width, units.length()));
            rows.push(Row::number("Left side slope", left, "H:V"));
            rows.push(Row::number("Right side slope", right, "H:V"));
        }
        Section::Triangular { side_slopes } => {
            let (left, right) = side_slopes.resolve();
            rows.push(Row::number("Left side slope", left, "H:V"));
            rows.push(Row::number("Right side slope", right, "H:V"));
        }
        Section::Irregular { points } => {
            rows.push(Row::text("Points", points.len()));
        }
        Section::Gutter {
            gutter_width,
            gutter_cross_slope,
            road_cross_slope,
        } => {
            rows.push(Row::number("Gutter width", *gutter_width, units.length()));
            rows.push(Row::slope("Gutter cross slope", *gutter_cross_slope, units.slope()));
            rows.push(Row::slope("Road cross slope", *road_cross_slope, units.slope()));
        }
    }

    rows.push(Row::slope("Longitudinal slope", channel.slope, units.slope()));
    rows.push(Row::number("Manning's n", channel.mannings_n, ""));
    rows.push(Row::text("Units", units));
    rows.push(Row::text("Solve for", request.solve_for));

    let known = match request.solve_for {
        SolveFor::Depth | SolveFor::Spread => request
            .discharge
            .map(|q| Row::number("Discharge", q, units.discharge())),
        SolveFor::Discharge => request
            .known_wse
            .map(|wse| Row::number("Known water-surface elevation", wse, units.length()))
            .or_else(|| {
                request
                    .spread
                    .map(|t| Row::number("Known spread", t, units.length()))
            })
            .or_else(|| {
                request
                    .known_depth
                    .map(|y| Row::number("Known depth", y, units.length()))
            }),
    };
    rows.extend(known);
    rows
}

fn result_rows(state: &HydraulicState, units: UnitSystem) -> Vec<Row> {
    let length = units.length();
    let mut rows = vec![Row::number("Depth", state.depth, length)];

    let optional = [
        ("Water-surface elevation", state.water_surface_elevation),
        ("Minimum elevation", state.min_elevation),
        ("Maximum elevation", state.max_elevation),
    ];
    rows.extend(
        optional
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| Row::number(name, v, length))),
    );

    rows.extend([
        Row::number("Discharge", state.discharge, units.discharge()),
        Row::number("Flow area", state.area, units.area()),
        Row::number("Wetted perimeter", state.wetted_perimeter, length),
        Row::number("Hydraulic radius", state.hydraulic_radius, length),
        Row::number("Top width", state.top_width, length),
        Row::number("Velocity", state.velocity, units.velocity()),
        Row::number("Froude number", state.froude_number, ""),
        Row::text("Flow regime", state.flow_regime),
    ]);

    if let Some(critical_depth) = state.critical_depth {
        rows.push(Row::number("Critical depth", critical_depth, length));
    }
    if let Some(critical_slope) = state.critical_slope {
        rows.push(Row::slope("Critical slope", critical_slope, units.slope()));
    }

    rows.push(Row::number("Velocity head", state.velocity_head, length));
    rows.push(Row::number("Specific energy", state.specific_energy, length));

    if let Some(spread) = state.spread {
        rows.push(Row::number("Spread", spread, length));
    }
    if let Some(depression) = state.gutter_depression {
        rows.push(Row::number("Gutter depression", depression, length));
    }
    rows
}

/// Renders a plain-text report with aligned columns.
#[must_use]
pub fn to_plain_text(request: &SolveRequest, state: &HydraulicState, precision: usize) -> String {
    let inputs = input_rows(request);
    let results = result_rows(state, request.channel.units);
    let width = inputs
        .iter()
        .chain(&results)
        .map(|row| row.parameter.len())
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    for (title, rows) in [("Inputs", &inputs), ("Results", &results)] {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{}", "-".repeat(title.len()));
        for row in rows {
            let value = row.value.render(precision);
            let line = format!("{:<width$}  {value} {}", row.parameter, row.unit);
            let _ = writeln!(out, "{}", line.trim_end());
        }
    }
    out
}

/// Renders a Markdown report with one table for inputs and one for results.
#[must_use]
pub fn to_markdown(request: &SolveRequest, state: &HydraulicState, precision: usize) -> String {
    let inputs = input_rows(request);
    let results = result_rows(state, request.channel.units);

    let mut out = String::new();
    for (title, rows) in [("Inputs", &inputs), ("Results", &results)] {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "## {title}\n");
        let _ = writeln!(out, "| Parameter | Value | Unit |");
        let _ = writeln!(out, "|---|---:|---|");
        for row in rows {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                row.parameter,
                row.value.render(precision),
                row.unit
            );
        }
    }
    out
}

/// Renders `Parameter,Value,Unit` CSV, inputs first.
#[must_use]
pub fn to_csv(request: &SolveRequest, state: &HydraulicState, precision: usize) -> String {
    let mut out = String::from("Parameter,Value,Unit\n");
    for row in input_rows(request)
        .into_iter()
        .chain(result_rows(state, request.channel.units))
    {
        let _ = writeln!(
            out,
            "{},{},{}",
            csv_field(row.parameter),
            csv_field(&row.value.render(precision)),
            csv_field(row.unit)
        );
    }
    out
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
