//! Runner error types
//!
//! Errors are layered the same way the engine is: probe → steady state →
//! attack → scenario → experiment. Lower layers are carried inside higher
//! ones so the final message names every probe that failed and why.

use std::fmt;
use thiserror::Error;

use shared::Target;

/// Outcome of a single failed health check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("unsupported probe type: {kind}")]
    UnsupportedProbeKind { kind: String },

    #[error("{kind} probe configuration is missing")]
    MissingProbeConfig { kind: String },

    #[error("creating request: {message}")]
    RequestConstruction { message: String },

    #[error("executing request: {message}")]
    Transport { message: String },

    #[error("unexpected status code: got {got}, want {want}")]
    UnexpectedStatus { got: u16, want: u16 },

    #[error("probe task failed: {message}")]
    TaskFailed { message: String },

    #[error("probe cancelled")]
    Cancelled,
}

/// A named probe and the reason it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub probe: String,
    pub error: ProbeError,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe '{}' failed: {}", self.probe, self.error)
    }
}

/// Every probe failure from one steady-state validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct SteadyStateViolation {
    pub failures: Vec<ProbeFailure>,
}

impl SteadyStateViolation {
    pub fn failed_probes(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.probe.as_str()).collect()
    }

    pub fn failure_for(&self, probe: &str) -> Option<&ProbeError> {
        self.failures.iter().find(|f| f.probe == probe).map(|f| &f.error)
    }
}

impl fmt::Display for SteadyStateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} probe(s) failed", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

/// Target provider and failure injector errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{name} environment variable is required")]
    MissingCredential { name: String },

    #[error("building HTTP client: {message}")]
    Client { message: String },

    #[error("executing request: {message}")]
    Transport { message: String },

    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("decoding response: {message}")]
    Decode { message: String },

    #[error("no eligible targets found in app {app}")]
    NoEligibleTargets { app: String },
}

/// A single tick's injection attempt. Never fatal to the scenario.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttackError {
    #[error("no targets available")]
    NoTargetsAvailable,

    #[error("restarting machine {target_id}: {source}")]
    Injection {
        target_id: String,
        #[source]
        source: ProviderError,
    },
}

/// Fatal scenario loop outcomes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("unsupported scenario type: {kind}")]
    UnsupportedScenarioKind { kind: String },

    #[error("listing targets: {0}")]
    TargetFetchFailed(#[source] ProviderError),

    #[error("steady state lost after attack {tick} on {target}: {violation}")]
    SteadyStateRegression {
        tick: u32,
        target: Target,
        #[source]
        violation: SteadyStateViolation,
    },

    #[error("scenario cancelled")]
    Cancelled,
}

/// Experiment failures as reported to the caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    #[error("steady state validation failed: {0}")]
    PreconditionFailed(#[source] SteadyStateViolation),

    #[error("scenario execution failed: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("steady state validation failed after chaos: {0}")]
    PostconditionFailed(#[source] SteadyStateViolation),

    #[error("experiment cancelled during {stage}")]
    Cancelled { stage: &'static str },
}

impl ExperimentError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ExperimentError::Cancelled { .. } | ExperimentError::Scenario(ScenarioError::Cancelled)
        )
    }

    /// The steady-state violation behind this error, if there is one
    pub fn violation(&self) -> Option<&SteadyStateViolation> {
        match self {
            ExperimentError::PreconditionFailed(v) | ExperimentError::PostconditionFailed(v) => Some(v),
            ExperimentError::Scenario(ScenarioError::SteadyStateRegression { violation, .. }) => Some(violation),
            _ => None,
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;
pub type ProviderResult<T> = Result<T, ProviderError>;
pub type ScenarioResult<T> = Result<T, ScenarioError>;
pub type ExperimentResult<T> = Result<T, ExperimentError>;
