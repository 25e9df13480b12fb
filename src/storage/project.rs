use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    domain::{CurbInletSpec, HydraulicState, InterceptionResult, SolveRequest},
    solver,
};

const PROJECT_VERSION: &str = "1.0";

/// Errors that can occur when reading or writing a project document.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The project file could not be read or written.
    #[error("failed to access project file {path}")]
    Io {
        /// The project file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The project document is not valid JSON for a project.
    #[error("invalid project document")]
    Json(#[from] serde_json::Error),
}

/// The inputs of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "request", rename_all = "snake_case")]
pub enum ScenarioInputs {
    /// An open-channel or gutter solve.
    Channel(SolveRequest),
    /// A curb opening inlet on grade.
    CurbInlet(CurbInletSpec),
}

impl ScenarioInputs {
    /// The calculation module these inputs belong to.
    #[must_use]
    pub const fn module(&self) -> &'static str {
        match self {
            Self::Channel(_) => "manning.channels",
            Self::CurbInlet(_) => "curb_inlets.on_grade",
        }
    }

    /// SHA-256 (hex) of the JSON-serialized inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs cannot be serialized.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let encoded = serde_json::to_vec(self)?;
        let hash = Sha256::digest(encoded);
        Ok(format!("{hash:x}"))
    }

    /// Runs the solver for these inputs.
    ///
    /// # Errors
    ///
    /// Returns the solver's error if the inputs are invalid or the solve does
    /// not converge.
    pub fn solve(&self) -> Result<ScenarioResults, solver::Error> {
        match self {
            Self::Channel(request) => solver::solve(request).map(ScenarioResults::Channel),
            Self::CurbInlet(spec) => solver::solve_curb_inlet(spec).map(ScenarioResults::CurbInlet),
        }
    }
}

/// The stored results of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum ScenarioResults {
    /// Result of a channel solve.
    Channel(HydraulicState),
    /// Result of a curb inlet solve.
    CurbInlet(InterceptionResult),
}

/// A named set of inputs within a project, with its last results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Calculation module, derived from the inputs.
    pub module: String,
    /// What to solve.
    pub inputs: ScenarioInputs,
    /// Results of the last solve, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ScenarioResults>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Fingerprint of the inputs the results were computed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// When the results were computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved_at: Option<DateTime<Utc>>,
}

impl Scenario {
    /// A new, unsolved scenario.
    #[must_use]
    pub fn new(title: impl Into<String>, inputs: ScenarioInputs) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            module: inputs.module().to_owned(),
            inputs,
            results: None,
            notes: String::new(),
            fingerprint: None,
            solved_at: None,
        }
    }

    /// Replaces the inputs. Existing results are kept but become stale.
    pub fn set_inputs(&mut self, inputs: ScenarioInputs) {
        self.module = inputs.module().to_owned();
        self.inputs = inputs;
    }

    /// Solves the inputs and stores the results with the inputs' fingerprint.
    ///
    /// On failure the previous results are left untouched.
    ///
    /// # Errors
    ///
    /// Returns the solver's error.
    pub fn solve(&mut self) -> Result<(), solver::Error> {
        let results = self.inputs.solve()?;
        self.record(results);
        Ok(())
    }

    /// Stores results computed from the current inputs.
    ///
    /// If the inputs cannot be fingerprinted the results are kept but the
    /// scenario stays stale.
    pub fn record(&mut self, results: ScenarioResults) {
        self.fingerprint = match self.inputs.fingerprint() {
            Ok(fingerprint) => Some(fingerprint),
            Err(error) => {
                tracing::warn!(id = %self.id, title = %self.title, %error, "cannot fingerprint scenario inputs");
                None
            }
        };
        self.results = Some(results);
        self.solved_at = Some(Utc::now());
    }

    /// Whether the stored results are missing or were computed from different
    /// inputs.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        if self.results.is_none() {
            return true;
        }
        match (&self.fingerprint, self.inputs.fingerprint()) {
            (Some(stored), Ok(current)) => *stored != current,
            _ => true,
        }
    }
}

/// A collection of scenarios persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Document format version.
    pub version: String,
    /// Project name.
    pub name: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Scenarios in insertion order.
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Project {
    /// An empty project.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: PROJECT_VERSION.to_owned(),
            name: name.into(),
            created: now,
            modified: now,
            scenarios: Vec::new(),
        }
    }

    /// Reads a project from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid project.
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the project as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Marks the project as modified now.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Appends a scenario and returns its id.
    pub fn add(&mut self, scenario: Scenario) -> Uuid {
        let id = scenario.id;
        self.scenarios.push(scenario);
        self.touch();
        id
    }

    /// Looks up a scenario by id.
    #[must_use]
    pub fn scenario(&self, id: Uuid) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.id == id)
    }

    /// Scenarios whose results are missing or out of date.
    pub fn stale(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter().filter(|scenario| scenario.is_stale())
    }

    /// Solves every scenario in parallel.
    ///
    /// A failing scenario does not stop the others; the failures are returned
    /// by scenario id, in project order.
    pub fn solve_all(&mut self) -> Vec<(Uuid, solver::Error)> {
        let failures: Vec<_> = self
            .scenarios
            .par_iter_mut()
            .filter_map(|scenario| {
                scenario.solve().err().map(|error| {
                    tracing::warn!(id = %scenario.id, title = %scenario.title, %error, "scenario failed");
                    (scenario.id, error)
                })
            })
            .collect();
        tracing::info!(
            scenarios = self.scenarios.len(),
            failures = failures.len(),
            "project solved"
        );
        self.touch();
        failures
    }
}
