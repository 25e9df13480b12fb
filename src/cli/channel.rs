use std::path::PathBuf;

use clap::Parser;
use hydrocalc::{
    ChannelSpec, HydraulicState, ScenarioInputs, ScenarioResults, Section, SideSlopes, SolveFor,
    SolveRequest, StationElevation, UnitSystem, export,
};
use tracing::instrument;

use super::terminal::{self, Colorize};

#[derive(Debug, Parser)]
#[command(about = "Solve an open channel or gutter section")]
pub struct Channel {
    /// Section shape
    #[arg(long, value_enum)]
    shape: Shape,

    /// Bottom width (rectangular, trapezoidal)
    #[arg(long)]
    bottom_width: Option<f64>,

    /// Symmetric side slope H:V, used for any side without its own slope
    #[arg(long)]
    side_slope: Option<f64>,

    /// Left side slope H:V
    #[arg(long)]
    left_slope: Option<f64>,

    /// Right side slope H:V
    #[arg(long)]
    right_slope: Option<f64>,

    /// Surveyed point of an irregular section (repeatable)
    #[arg(long = "point", value_name = "STATION,ELEVATION", allow_hyphen_values = true)]
    points: Vec<StationElevation>,

    /// Gutter width
    #[arg(long)]
    gutter_width: Option<f64>,

    /// Gutter cross slope
    #[arg(long)]
    gutter_cross_slope: Option<f64>,

    /// Roadway cross slope
    #[arg(long)]
    road_cross_slope: Option<f64>,

    /// Longitudinal slope
    #[arg(long)]
    slope: f64,

    /// Manning roughness coefficient
    #[arg(short = 'n', long = "mannings-n")]
    mannings_n: f64,

    /// Unit system (defaults to the configured units)
    #[arg(long)]
    units: Option<UnitSystem>,

    /// What to solve for (depth, discharge, spread)
    #[arg(long, default_value = "depth")]
    solve_for: SolveFor,

    /// Known discharge
    #[arg(long)]
    discharge: Option<f64>,

    /// Known depth
    #[arg(long)]
    depth: Option<f64>,

    /// Known water-surface elevation (irregular sections)
    #[arg(long, allow_hyphen_values = true)]
    wse: Option<f64>,

    /// Known gutter spread
    #[arg(long)]
    spread: Option<f64>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,

    /// Append the solved scenario to a project file
    #[arg(long, value_name = "PROJECT", requires = "title")]
    save: Option<PathBuf>,

    /// Title of the saved scenario
    #[arg(long)]
    title: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Shape {
    Rectangular,
    Trapezoidal,
    Triangular,
    Irregular,
    Gutter,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
    Markdown,
    Csv,
    Text,
}

impl Channel {
    #[instrument(level = "debug", skip_all, fields(shape = ?self.shape, mode = %self.solve_for))]
    pub fn run(self, config: &hydrocalc::Config) -> anyhow::Result<()> {
        let request = self.request(config.units);
        let state = hydrocalc::solve(&request)?;
        let precision = config.precision();

        match self.output {
            OutputFormat::Pretty => output_pretty(&request, &state, precision),
            OutputFormat::Json => {
                let output = serde_json::json!({ "request": request, "result": state });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Markdown => print!("{}", export::to_markdown(&request, &state, precision)),
            OutputFormat::Csv => print!("{}", export::to_csv(&request, &state, precision)),
            OutputFormat::Text => print!("{}", export::to_plain_text(&request, &state, precision)),
        }

        if let (Some(path), Some(title)) = (&self.save, &self.title) {
            super::project::save_scenario(
                path,
                title,
                ScenarioInputs::Channel(request),
                ScenarioResults::Channel(state),
            )?;
        }

        Ok(())
    }

    fn side_slopes(&self) -> SideSlopes {
        SideSlopes {
            side_slope: self.side_slope.unwrap_or_default(),
            left: self.left_slope.unwrap_or_default(),
            right: self.right_slope.unwrap_or_default(),
        }
    }

    /// Builds the request; missing dimensions default to zero and are
    /// rejected by validation.
    fn request(&self, default_units: UnitSystem) -> SolveRequest {
        let section = match self.shape {
            Shape::Rectangular => Section::Rectangular {
                bottom_width: self.bottom_width.unwrap_or_default(),
            },
            Shape::Trapezoidal => Section::Trapezoidal {
                bottom_width: self.bottom_width.unwrap_or_default(),
                side_slopes: self.side_slopes(),
            },
            Shape::Triangular => Section::Triangular {
                side_slopes: self.side_slopes(),
            },
            Shape::Irregular => Section::Irregular {
                points: self.points.clone(),
            },
            Shape::Gutter => Section::Gutter {
                gutter_width: self.gutter_width.unwrap_or_default(),
                gutter_cross_slope: self.gutter_cross_slope.unwrap_or_default(),
                road_cross_slope: self.road_cross_slope.unwrap_or_default(),
            },
        };

        SolveRequest {
            channel: ChannelSpec {
                section,
                slope: self.slope,
                mannings_n: self.mannings_n,
                units: self.units.unwrap_or(default_units),
            },
            solve_for: self.solve_for,
            discharge: self.discharge,
            known_depth: self.depth,
            known_wse: self.wse,
            spread: self.spread,
        }
    }
}

fn output_pretty(request: &SolveRequest, state: &HydraulicState, precision: usize) {
    let units = request.channel.units;
    let number = |value: f64| format!("{value:.precision$}");
    let slope = |value: f64| format!("{value:.6}");

    let headline = match (request.solve_for, state.spread) {
        (SolveFor::Discharge, _) => format!(
            "Discharge: {} {}",
            number(state.discharge),
            units.discharge()
        ),
        (_, Some(spread)) => format!("Spread: {} {}", number(spread), units.length()),
        (_, None) => format!("Normal depth: {} {}", number(state.depth), units.length()),
    };
    println!("{}", headline.success());
    println!(
        "{} {} section, {} units",
        "▸".dim(),
        request.channel.section.name(),
        units
    );
    println!();

    let mut rows = vec![("Depth", number(state.depth), units.length())];
    if let Some(wse) = state.water_surface_elevation {
        rows.push(("Water surface", number(wse), units.length()));
    }
    if let Some(spread) = state.spread {
        rows.push(("Spread", number(spread), units.length()));
    }
    if let Some(depression) = state.gutter_depression {
        rows.push(("Gutter depression", number(depression), units.length()));
    }
    rows.extend([
        ("Discharge", number(state.discharge), units.discharge()),
        ("Flow area", number(state.area), units.area()),
        ("Wetted perimeter", number(state.wetted_perimeter), units.length()),
        ("Hydraulic radius", number(state.hydraulic_radius), units.length()),
        ("Top width", number(state.top_width), units.length()),
        ("Velocity", number(state.velocity), units.velocity()),
        ("Froude number", number(state.froude_number), ""),
        ("Flow regime", terminal::regime(state.flow_regime), ""),
    ]);
    if let Some(critical_depth) = state.critical_depth {
        rows.push(("Critical depth", number(critical_depth), units.length()));
    }
    if let Some(critical_slope) = state.critical_slope {
        rows.push(("Critical slope", slope(critical_slope), units.slope()));
    }
    rows.extend([
        ("Velocity head", number(state.velocity_head), units.length()),
        ("Specific energy", number(state.specific_energy), units.length()),
    ]);

    terminal::print_rows(&rows);
}
