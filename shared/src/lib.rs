//! Shared types for the gimli chaos experiment runner
//!
//! Holds the experiment data model, YAML loading and validation, and the
//! tracing setup used by every binary in the workspace.

pub mod config;
pub mod duration;
pub mod errors;
pub mod experiment;
pub mod logging;
pub mod types;

pub use config::{DEFAULT_CONFIG_PATH, load_experiment, parse_experiment};
pub use errors::*;
pub use experiment::{Experiment, HttpProbe, Probe, Scenario, Selector, SteadyState};
pub use types::*;
