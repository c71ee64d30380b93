//! Chaos experiment runner
//!
//! Validates an application's steady state with concurrent HTTP probes,
//! restarts randomly chosen targets on a fixed interval until a deadline,
//! and aborts as soon as the steady state regresses.

pub mod core;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use core::{DEFAULT_SETTLE_DELAY, HttpProbeExecutor, ScenarioLoop, SteadyStateValidator};
pub use error::{
    AttackError, ExperimentError, ExperimentResult, ProbeError, ProbeFailure, ProviderError, ScenarioError,
    SteadyStateViolation,
};
pub use orchestrator::Orchestrator;
pub use services::{FlySaboteur, TracingObserver};
pub use traits::{ExperimentObserver, ProbeExecutor, Saboteur};
pub use traits::{MockExperimentObserver, MockProbeExecutor, MockSaboteur};
pub use types::{CheckPhase, ExperimentEvent, ExperimentReport, InjectionEvent, ScenarioOutcome};
