use std::path::PathBuf;

use clap::Parser;
use hydrocalc::{CurbInletSpec, InterceptionResult, ScenarioInputs, ScenarioResults};
use tracing::instrument;

use super::terminal::{self, Colorize};

/// Curb opening inlet on grade, in US customary units.
#[derive(Debug, Parser)]
#[command(about = "Solve a curb opening inlet on grade (US customary units)")]
pub struct Inlet {
    /// Approaching gutter flow (cfs)
    #[arg(long)]
    discharge: f64,

    /// Longitudinal slope (ft/ft)
    #[arg(long)]
    slope: f64,

    /// Gutter width (ft)
    #[arg(long)]
    gutter_width: f64,

    /// Gutter cross slope (ft/ft)
    #[arg(long)]
    gutter_cross_slope: f64,

    /// Roadway cross slope (ft/ft)
    #[arg(long)]
    road_cross_slope: f64,

    /// Manning roughness coefficient
    #[arg(short = 'n', long = "mannings-n")]
    mannings_n: f64,

    /// Curb opening length (ft)
    #[arg(long)]
    length: f64,

    /// Local depression depth (in)
    #[arg(long, default_value_t = 0.0)]
    depression_depth: f64,

    /// Local depression width (in)
    #[arg(long, default_value_t = 0.0)]
    depression_width: f64,

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

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Inlet {
    #[instrument(level = "debug", skip_all, fields(discharge = self.discharge))]
    pub fn run(self, config: &hydrocalc::Config) -> anyhow::Result<()> {
        let spec = self.spec();
        let result = hydrocalc::solve_curb_inlet(&spec)?;

        match self.output {
            OutputFormat::Pretty => output_pretty(&result, config.precision()),
            OutputFormat::Json => {
                let output = serde_json::json!({ "inlet": spec, "result": result });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        if let (Some(path), Some(title)) = (&self.save, &self.title) {
            super::project::save_scenario(
                path,
                title,
                ScenarioInputs::CurbInlet(spec),
                ScenarioResults::CurbInlet(result),
            )?;
        }

        Ok(())
    }

    const fn spec(&self) -> CurbInletSpec {
        CurbInletSpec {
            discharge: self.discharge,
            longitudinal_slope: self.slope,
            gutter_width: self.gutter_width,
            gutter_cross_slope: self.gutter_cross_slope,
            road_cross_slope: self.road_cross_slope,
            mannings_n: self.mannings_n,
            curb_opening_length: self.length,
            local_depression_depth_in: self.depression_depth,
            local_depression_width_in: self.depression_width,
        }
    }
}

fn output_pretty(result: &InterceptionResult, precision: usize) {
    let number = |value: f64| format!("{value:.precision$}");

    let headline = format!("Efficiency: {:.1}%", result.efficiency_percent);
    if result.bypass_flow > 0.0 {
        println!("{}", headline.warning());
        println!(
            "{}",
            format!("{} cfs bypasses the inlet", number(result.bypass_flow)).dim()
        );
    } else {
        println!("{}", headline.success());
    }
    println!();

    terminal::print_rows(&[
        ("Intercepted flow", number(result.intercepted_flow), "cfs"),
        ("Bypass flow", number(result.bypass_flow), "cfs"),
        ("Spread", number(result.spread), "ft"),
        ("Depth at curb", number(result.depth_in), "in"),
        ("Flow area", number(result.flow_area), "ft²"),
        ("Velocity", number(result.velocity), "ft/s"),
        ("Gutter depression", number(result.gutter_depression_in), "in"),
        ("Total depression", number(result.total_depression_in), "in"),
        ("Equivalent cross slope", format!("{:.4}", result.equivalent_cross_slope), "ft/ft"),
        ("Length ratio", number(result.length_ratio), ""),
        ("Length factor", number(result.length_factor), ""),
        ("Required length", number(result.total_interception_length), "ft"),
    ]);
}
