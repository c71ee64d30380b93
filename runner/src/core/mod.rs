//! Core experiment engine
//!
//! Probe execution, steady-state validation and the scenario loop. All I/O
//! goes through the traits in `crate::traits`, so every piece here can be
//! driven by mocks and a paused clock.

pub mod probe;
pub mod scenario;
pub mod validator;

pub use probe::HttpProbeExecutor;
pub use scenario::{DEFAULT_SETTLE_DELAY, ScenarioLoop};
pub use validator::SteadyStateValidator;
