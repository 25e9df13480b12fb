use std::path::{Path, PathBuf};

use clap::Parser;
use hydrocalc::{Scenario, ScenarioInputs, ScenarioResults};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser)]
#[command(about = "Create, re-solve and inspect project files")]
pub struct Project {
    #[command(subcommand)]
    command: ProjectCommand,
}

#[derive(Debug, clap::Subcommand)]
enum ProjectCommand {
    /// Create an empty project file
    Init {
        /// Project file to create
        path: PathBuf,

        /// Project name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// Re-solve every scenario in parallel and save the results
    Run {
        /// Project file
        path: PathBuf,
    },

    /// List scenarios and whether their results are up to date
    Status {
        /// Project file
        path: PathBuf,

        /// Output format
        #[arg(long, value_name = "FORMAT", default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Project {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            ProjectCommand::Init { path, name } => init(&path, name),
            ProjectCommand::Run { path } => run(&path),
            ProjectCommand::Status { path, output } => status(&path, output),
        }
    }
}

fn init(path: &Path, name: Option<String>) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("Project file {} already exists", path.display());
    }

    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map_or_else(|| "Untitled".to_owned(), |stem| stem.to_string_lossy().into_owned())
    });
    hydrocalc::Project::new(&name).save(path)?;

    println!(
        "{}",
        format!("Created project '{name}' in {}", path.display()).success()
    );
    Ok(())
}

fn run(path: &Path) -> anyhow::Result<()> {
    let mut project = hydrocalc::Project::load(path)?;
    let failures = project.solve_all();
    project.save(path)?;

    let solved = project.scenarios.len() - failures.len();
    println!("{}", format!("Solved {solved} scenario(s)").success());

    if failures.is_empty() {
        return Ok(());
    }

    for (id, error) in &failures {
        let title = project
            .scenario(*id)
            .map_or("?", |scenario| scenario.title.as_str());
        println!("{} {title}: {error}", "✗".warning());
    }
    anyhow::bail!("{} scenario(s) failed", failures.len())
}

fn status(path: &Path, output: OutputFormat) -> anyhow::Result<()> {
    let project = hydrocalc::Project::load(path)?;

    match output {
        OutputFormat::Json => {
            let scenarios: Vec<_> = project
                .scenarios
                .iter()
                .map(|scenario| {
                    serde_json::json!({
                        "id": scenario.id,
                        "title": scenario.title,
                        "module": scenario.module,
                        "stale": scenario.is_stale(),
                        "solved_at": scenario.solved_at,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "name": project.name,
                "modified": project.modified,
                "scenarios": scenarios,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => output_table(&project),
    }
    Ok(())
}

fn output_table(project: &hydrocalc::Project) {
    println!("{}", project.name);
    println!("{}", "─".repeat(project.name.chars().count()).dim());

    if project.scenarios.is_empty() {
        println!("No scenarios yet. Add one with 'hydro channel ... --save'.");
        return;
    }

    let narrow = is_narrow();
    for scenario in &project.scenarios {
        let marker = if scenario.is_stale() {
            "stale".warning()
        } else {
            "ok".success()
        };
        if narrow {
            println!("{}: {marker}", scenario.title);
        } else {
            let id = scenario.id.to_string();
            println!(
                "{:<8}  {:<24}  {:<20}  {marker}",
                id.get(..8).unwrap_or(&id).dim(),
                scenario.title,
                scenario.module
            );
        }
    }

    let stale = project.stale().count();
    if stale > 0 {
        println!();
        println!(
            "{}",
            format!("{stale} stale scenario(s). Run 'hydro project run' to refresh.").dim()
        );
    }
}

/// Appends `inputs` and the `results` already solved from them as a new
/// scenario in the project at `path`.
pub fn save_scenario(
    path: &Path,
    title: &str,
    inputs: ScenarioInputs,
    results: ScenarioResults,
) -> anyhow::Result<()> {
    let mut project = hydrocalc::Project::load(path)?;
    let mut scenario = Scenario::new(title, inputs);
    scenario.record(results);
    project.add(scenario);
    project.save(path)?;

    println!(
        "{}",
        format!("Saved scenario '{title}' to {}", path.display()).info()
    );
    Ok(())
}
