//! Steady-state validation
//!
//! Every probe runs on its own task; the validator waits for all of them and
//! reports every failure, not only the first.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use shared::Probe;

use crate::error::{ProbeError, ProbeFailure, SteadyStateViolation};
use crate::traits::{ExperimentObserver, ProbeExecutor};
use crate::types::{CheckPhase, ExperimentEvent};

pub struct SteadyStateValidator<E>
where
    E: ProbeExecutor + 'static,
{
    executor: Arc<E>,
    observer: Arc<dyn ExperimentObserver>,
}

impl<E> Clone for SteadyStateValidator<E>
where
    E: ProbeExecutor + 'static,
{
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<E> SteadyStateValidator<E>
where
    E: ProbeExecutor + 'static,
{
    pub fn new(executor: Arc<E>, observer: Arc<dyn ExperimentObserver>) -> Self {
        Self { executor, observer }
    }

    /// Run all probes concurrently. Succeeds iff every probe succeeds.
    pub async fn validate(&self, probes: &[Probe], cancel: &CancellationToken) -> Result<(), SteadyStateViolation> {
        let handles: Vec<_> = probes
            .iter()
            .cloned()
            .map(|probe| {
                let executor = Arc::clone(&self.executor);
                let cancel = cancel.clone();
                let name = probe.name.clone();
                let handle = tokio::spawn(async move { executor.execute(&probe, &cancel).await });
                (name, handle)
            })
            .collect();

        let mut failures = Vec::new();
        for (probe, handle) in handles {
            let result = handle.await.unwrap_or_else(|e| {
                Err(ProbeError::TaskFailed { message: e.to_string() })
            });

            match result {
                Ok(()) => self.observer.on_event(&ExperimentEvent::ProbePassed { probe }),
                Err(error) => {
                    self.observer.on_event(&ExperimentEvent::ProbeFailed {
                        probe: probe.clone(),
                        error: error.to_string(),
                    });
                    failures.push(ProbeFailure { probe, error });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SteadyStateViolation { failures })
        }
    }

    /// [`validate`](Self::validate) wrapped in start/confirmed events
    pub async fn check(
        &self,
        phase: CheckPhase,
        probes: &[Probe],
        cancel: &CancellationToken,
    ) -> Result<(), SteadyStateViolation> {
        self.observer.on_event(&ExperimentEvent::SteadyStateCheckStarted {
            phase,
            probes: probes.len(),
        });
        self.validate(probes, cancel).await?;
        self.observer.on_event(&ExperimentEvent::SteadyStateConfirmed { phase });
        Ok(())
    }
}
