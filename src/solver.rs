//! Numerical solvers.
//!
//! [`solve`] turns a [`SolveRequest`] into a [`HydraulicState`] and
//! [`solve_curb_inlet`] turns a [`CurbInletSpec`] into an
//! [`InterceptionResult`]. Both are pure functions of their input: no solver
//! keeps state between calls, so they can run concurrently.

use tracing::instrument;

use crate::domain::{
    CurbInletSpec, HydraulicState, InterceptionResult, SolveRequest, ValidationError,
};

mod channel;
pub use channel::{Manning, critical_depth, critical_slope, normal_depth};

mod curb_inlet;
pub use curb_inlet::CurbOpeningModel;

pub mod gutter;
pub mod root;
pub mod section;

use section::CrossSection;

/// Failure to produce a result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The request was rejected before solving.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// An iterative method exhausted its budget.
    #[error("{solver} did not converge after {iterations} iterations")]
    NonConvergence {
        /// Which iteration failed.
        solver: &'static str,
        /// Iterations (or bracket expansions) spent.
        iterations: usize,
    },
}

impl Error {
    /// Whether the caller can fix this by changing the request.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

/// Solves an open-channel or gutter request.
///
/// # Errors
///
/// Returns [`Error::Invalid`] if the request fails validation, or
/// [`Error::NonConvergence`] if an iteration fails to settle.
#[instrument(level = "debug", skip(request), fields(shape = request.channel.section.name(), mode = %request.solve_for))]
pub fn solve(request: &SolveRequest) -> Result<HydraulicState, Error> {
    request.validate()?;
    let constants = request.channel.units.constants();

    match CrossSection::from_section(&request.channel.section) {
        Some(section) => channel::solve(request, &section, constants),
        None => gutter::solve(request, constants),
    }
}

/// Solves a curb opening inlet on grade with the HEC-22 interception curve.
///
/// # Errors
///
/// Returns [`Error::Invalid`] for rejected inputs (including a non-positive
/// equivalent cross slope), or [`Error::NonConvergence`] if the spread search
/// cannot bracket the discharge.
pub fn solve_curb_inlet(spec: &CurbInletSpec) -> Result<InterceptionResult, Error> {
    solve_curb_inlet_with(spec, &CurbOpeningModel::HEC22)
}

/// Solves a curb opening inlet on grade with a custom interception curve.
///
/// # Errors
///
/// See [`solve_curb_inlet`].
#[instrument(level = "debug", skip_all, fields(discharge = spec.discharge))]
pub fn solve_curb_inlet_with(
    spec: &CurbInletSpec,
    model: &CurbOpeningModel,
) -> Result<InterceptionResult, Error> {
    curb_inlet::solve(spec, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChannelSpec, Section, SolveFor, UnitSystem};

    fn rectangular() -> ChannelSpec {
        ChannelSpec {
            section: Section::Rectangular { bottom_width: 5.0 },
            slope: 0.001,
            mannings_n: 0.013,
            units: UnitSystem::Metric,
        }
    }

    #[test]
    fn invalid_request_is_rejected_before_solving() {
        let request = SolveRequest::depth(
            ChannelSpec {
                mannings_n: 0.0,
                ..rectangular()
            },
            10.0,
        );
        let error = solve(&request).unwrap_err();
        assert!(error.is_invalid_input());
        assert_eq!(
            error.to_string(),
            "Manning's n must be greater than zero (got 0)"
        );
    }

    #[test]
    fn spread_mode_needs_a_gutter() {
        let mut request = SolveRequest::depth(rectangular(), 10.0);
        request.solve_for = SolveFor::Spread;
        assert_eq!(
            solve(&request),
            Err(Error::Invalid(ValidationError::UnsupportedMode {
                mode: SolveFor::Spread,
                shape: "rectangular",
            }))
        );
    }

    #[test]
    fn non_convergence_is_not_invalid_input() {
        let error = Error::NonConvergence {
            solver: "normal depth",
            iterations: 100,
        };
        assert!(!error.is_invalid_input());
        assert_eq!(
            error.to_string(),
            "normal depth did not converge after 100 iterations"
        );
    }

    #[test]
    fn solves_are_deterministic() {
        let request = SolveRequest::depth(rectangular(), 10.0);
        assert_eq!(solve(&request), solve(&request));
    }
}
