//! Test helpers and builder patterns for orchestrator tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use runner::{
    CheckPhase, ExperimentError, ExperimentEvent, ExperimentObserver, MockProbeExecutor, MockSaboteur, Orchestrator,
    ProbeError,
};

use super::fixtures::TestFixtures;

/// Observer that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ExperimentEvent>>,
}

impl RecordingObserver {
    pub fn count(&self, pred: impl Fn(&ExperimentEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl ExperimentObserver for RecordingObserver {
    fn on_event(&self, event: &ExperimentEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Builder for orchestrators wired to mocks, with a passing default setup
pub struct OrchestratorBuilder {
    saboteur: MockSaboteur,
    executor: MockProbeExecutor,
    observer: Arc<RecordingObserver>,
    seed: Option<u64>,
    settle_delay: Duration,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            saboteur: MockSaboteur::new(),
            executor: MockProbeExecutor::new(),
            observer: Arc::new(RecordingObserver::default()),
            seed: None,
            settle_delay: Duration::from_millis(100),
        }
    }

    /// Every listing returns the fixture targets
    pub fn with_targets(mut self) -> Self {
        self.saboteur
            .expect_list_targets()
            .returning(|_, _| Ok(TestFixtures::targets()));
        self
    }

    /// Every restart succeeds
    pub fn with_restarts_succeeding(mut self) -> Self {
        self.saboteur.expect_restart_target().returning(|_, _| Ok(()));
        self
    }

    /// Every probe passes; returns the shared call counter
    pub fn with_probes_passing(self) -> (Self, Arc<AtomicUsize>) {
        self.with_probes_failing_after(usize::MAX)
    }

    /// The first `healthy_calls` probe executions pass, the rest fail with 503
    pub fn with_probes_failing_after(mut self, healthy_calls: usize) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        self.executor.expect_execute().returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) < healthy_calls {
                Ok(())
            } else {
                Err(ProbeError::UnexpectedStatus { got: 503, want: 200 })
            }
        });
        (self, calls)
    }

    pub fn saboteur(&mut self) -> &mut MockSaboteur {
        &mut self.saboteur
    }

    pub fn executor(&mut self) -> &mut MockProbeExecutor {
        &mut self.executor
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn observer(&self) -> Arc<RecordingObserver> {
        Arc::clone(&self.observer)
    }

    pub fn build(self) -> Orchestrator<MockSaboteur, MockProbeExecutor> {
        let orchestrator = Orchestrator::new(self.saboteur, self.executor)
            .with_observer(self.observer)
            .with_settle_delay(self.settle_delay);
        match self.seed {
            Some(seed) => orchestrator.with_seed(seed),
            None => orchestrator,
        }
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestHelpers;

impl TestHelpers {
    pub fn started(observer: &RecordingObserver) -> usize {
        observer.count(|e| matches!(e, ExperimentEvent::ExperimentStarted { .. }))
    }

    pub fn completed(observer: &RecordingObserver) -> usize {
        observer.count(|e| matches!(e, ExperimentEvent::ExperimentCompleted { .. }))
    }

    pub fn aborted(observer: &RecordingObserver) -> usize {
        observer.count(|e| matches!(e, ExperimentEvent::ExperimentAborted { .. }))
    }

    pub fn checks(observer: &RecordingObserver, phase: CheckPhase) -> usize {
        observer.count(|e| matches!(e, ExperimentEvent::SteadyStateCheckStarted { phase: p, .. } if *p == phase))
    }

    /// Assert the error carries a violation naming exactly `probes`
    pub fn assert_failed_probes(err: &ExperimentError, probes: &[&str]) {
        let violation = err.violation().unwrap_or_else(|| panic!("expected a violation, got {err:?}"));
        let mut failed = violation.failed_probes();
        failed.sort();
        let mut expected = probes.to_vec();
        expected.sort();
        assert_eq!(failed, expected);
    }
}
