//! Runner-internal types: progress events, injection log and run report

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use shared::Target;

/// When a steady-state check happens relative to the scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    BeforeChaos,
    AfterAttack { tick: u32 },
    AfterChaos,
}

impl fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckPhase::BeforeChaos => write!(f, "before chaos"),
            CheckPhase::AfterAttack { tick } => write!(f, "after attack {tick}"),
            CheckPhase::AfterChaos => write!(f, "after chaos"),
        }
    }
}

/// Structured progress events emitted by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentEvent {
    ExperimentStarted {
        run_id: Uuid,
        name: String,
        description: String,
    },
    SteadyStateCheckStarted {
        phase: CheckPhase,
        probes: usize,
    },
    ProbePassed {
        probe: String,
    },
    ProbeFailed {
        probe: String,
        error: String,
    },
    SteadyStateConfirmed {
        phase: CheckPhase,
    },
    ScenarioStarted {
        kind: String,
        app: String,
        duration: Duration,
        interval: Duration,
    },
    TargetsFetched {
        count: usize,
    },
    AttackStarted {
        tick: u32,
        target: Target,
    },
    AttackSucceeded {
        tick: u32,
        target: Target,
    },
    AttackFailed {
        tick: u32,
        error: String,
    },
    ScenarioCompleted {
        attacks: u32,
        failed_attacks: u32,
    },
    ExperimentCompleted {
        elapsed: Duration,
    },
    ExperimentAborted {
        reason: String,
    },
}

/// Record of one injection attempt
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionEvent {
    pub timestamp: DateTime<Utc>,
    pub tick: u32,
    pub target: Option<Target>,
    pub success: bool,
    pub details: String,
}

impl InjectionEvent {
    pub fn succeeded(tick: u32, target: Target) -> Self {
        Self {
            timestamp: Utc::now(),
            tick,
            details: format!("restarted {target}"),
            target: Some(target),
            success: true,
        }
    }

    pub fn failed(tick: u32, target: Option<Target>, details: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            tick,
            target,
            success: false,
            details: details.into(),
        }
    }
}

/// What a scenario loop did before its deadline expired
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioOutcome {
    pub attacks: u32,
    pub failed_attacks: u32,
    pub injections: Vec<InjectionEvent>,
    pub elapsed: Duration,
}

impl ScenarioOutcome {
    pub fn record(&mut self, event: InjectionEvent) {
        if event.success {
            self.attacks += 1;
        } else {
            self.failed_attacks += 1;
        }
        self.injections.push(event);
    }
}

/// Summary of a successful experiment run
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    pub run_id: Uuid,
    pub experiment: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub scenario: ScenarioOutcome,
}

impl ExperimentReport {
    pub fn attacks(&self) -> u32 {
        self.scenario.attacks
    }
}
