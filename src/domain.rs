//! Domain models for open-channel and gutter hydraulics.
//!
//! Requests ([`SolveRequest`], [`CurbInletSpec`]) and results
//! ([`HydraulicState`], [`InterceptionResult`]) are plain immutable values;
//! the solvers in [`crate::solver`] turn one into the other.

mod channel;
pub use channel::{ChannelSpec, Section, SideSlopes, SolveFor, SolveRequest, StationElevation};

mod config;
pub use config::Config;

mod inlet;
pub use inlet::{CurbInletSpec, InterceptionResult};

mod state;
pub use state::{CRITICAL_FROUDE_TOLERANCE, FlowRegime, HydraulicState};

/// Unit systems and the physical constants they select.
pub mod units;
pub use units::{Constants, UnitSystem};

mod validation;
pub use validation::ValidationError;
