//! Project documents: named scenarios with their inputs and last results,
//! persisted as JSON.

mod project;

pub use project::{Project, ProjectError, Scenario, ScenarioInputs, ScenarioResults};
