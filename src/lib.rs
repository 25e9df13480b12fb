//! Open-channel and stormwater gutter hydraulics.
//!
//! Solves uniform (normal-depth) flow in rectangular, trapezoidal, triangular
//! and surveyed irregular channels with Manning's equation, gutter spread
//! for composite roadway sections, and curb-opening inlet interception on
//! grade with the HEC-22 length/efficiency curve.
//!
//! ```
//! use hydrocalc::{ChannelSpec, Section, SolveRequest, UnitSystem, solve};
//!
//! let channel = ChannelSpec {
//!     section: Section::Rectangular { bottom_width: 5.0 },
//!     slope: 0.001,
//!     mannings_n: 0.013,
//!     units: UnitSystem::Metric,
//! };
//! let state = solve(&SolveRequest::depth(channel, 10.0)).unwrap();
//! assert!((state.depth - 1.0195).abs() < 1e-3);
//! ```

pub mod domain;
pub use domain::{
    ChannelSpec, Config, CurbInletSpec, FlowRegime, HydraulicState, InterceptionResult, Section,
    SideSlopes, SolveFor, SolveRequest, StationElevation, UnitSystem, ValidationError,
};

pub mod export;

pub mod solver;
pub use solver::{CurbOpeningModel, Error, solve, solve_curb_inlet};

pub mod storage;
pub use storage::{Project, Scenario, ScenarioInputs, ScenarioResults};
