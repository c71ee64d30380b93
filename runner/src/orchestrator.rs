//! Experiment orchestrator
//!
//! Sequences one experiment run: steady state before chaos, the scenario
//! loop, steady state after chaos. Each step gates the next. Nothing is
//! rolled back when a run aborts; restarted targets stay restarted.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use shared::Experiment;

use crate::core::{DEFAULT_SETTLE_DELAY, ScenarioLoop, SteadyStateValidator};
use crate::error::{ExperimentError, ExperimentResult, SteadyStateViolation};
use crate::services::TracingObserver;
use crate::traits::{ExperimentObserver, ProbeExecutor, Saboteur};
use crate::types::{CheckPhase, ExperimentEvent, ExperimentReport};

/// Runs experiments against injected provider and probe implementations
pub struct Orchestrator<S, E>
where
    S: Saboteur + 'static,
    E: ProbeExecutor + 'static,
{
    saboteur: Arc<S>,
    executor: Arc<E>,
    observer: Arc<dyn ExperimentObserver>,
    seed: Option<u64>,
    settle_delay: Duration,
}

impl<S, E> Orchestrator<S, E>
where
    S: Saboteur + 'static,
    E: ProbeExecutor + 'static,
{
    /// Create new orchestrator with injected dependencies
    pub fn new(saboteur: S, executor: E) -> Self {
        Self {
            saboteur: Arc::new(saboteur),
            executor: Arc::new(executor),
            observer: Arc::new(TracingObserver),
            seed: None,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExperimentObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Seed target selection so runs are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Execute the complete experiment
    pub async fn run_experiment(
        &self,
        experiment: &Experiment,
        cancel: CancellationToken,
    ) -> ExperimentResult<ExperimentReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("experiment", %run_id, name = %experiment.name);

        let result = self.execute(run_id, experiment, &cancel).instrument(span.clone()).await;

        if let Err(e) = &result {
            span.in_scope(|| {
                self.observer.on_event(&ExperimentEvent::ExperimentAborted { reason: e.to_string() });
            });
        }
        result
    }

    async fn execute(
        &self,
        run_id: Uuid,
        experiment: &Experiment,
        cancel: &CancellationToken,
    ) -> ExperimentResult<ExperimentReport> {
        let started_at = Utc::now();
        let started = Instant::now();

        self.observer.on_event(&ExperimentEvent::ExperimentStarted {
            run_id,
            name: experiment.name.clone(),
            description: experiment.description.clone(),
        });

        let validator = SteadyStateValidator::new(Arc::clone(&self.executor), Arc::clone(&self.observer));

        self.check(&validator, CheckPhase::BeforeChaos, experiment, cancel)
            .await?
            .map_err(ExperimentError::PreconditionFailed)?;

        let mut scenario = ScenarioLoop::new(Arc::clone(&self.saboteur), validator.clone(), Arc::clone(&self.observer))
            .with_settle_delay(self.settle_delay);
        if let Some(seed) = self.seed {
            scenario = scenario.with_seed(seed);
        }
        let outcome = scenario.run(experiment, cancel).await?;

        self.check(&validator, CheckPhase::AfterChaos, experiment, cancel)
            .await?
            .map_err(ExperimentError::PostconditionFailed)?;

        let elapsed = started.elapsed();
        self.observer.on_event(&ExperimentEvent::ExperimentCompleted { elapsed });

        Ok(ExperimentReport {
            run_id,
            experiment: experiment.name.clone(),
            started_at,
            elapsed,
            scenario: outcome,
        })
    }

    /// Validate steady state, reporting cancellation separately from probe
    /// failures
    async fn check(
        &self,
        validator: &SteadyStateValidator<E>,
        phase: CheckPhase,
        experiment: &Experiment,
        cancel: &CancellationToken,
    ) -> ExperimentResult<Result<(), SteadyStateViolation>> {
        let stage = match phase {
            CheckPhase::BeforeChaos => "pre-chaos validation",
            _ => "post-chaos validation",
        };

        if cancel.is_cancelled() {
            return Err(ExperimentError::Cancelled { stage });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ExperimentError::Cancelled { stage }),
            result = validator.check(phase, &experiment.steady_state.probes, cancel) => Ok(result),
        }
    }
}
