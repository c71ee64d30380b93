//! In-crate test helpers

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use shared::{Experiment, Probe, Scenario, ScenarioKind, Selector, SteadyState, Target};

use crate::traits::ExperimentObserver;
use crate::types::ExperimentEvent;

/// Observer that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ExperimentEvent>>,
}

impl RecordingObserver {
    pub fn count(&self, pred: impl Fn(&ExperimentEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &ExperimentEvent) -> bool {
        self.events.lock().unwrap().iter().any(|e| e == event)
    }
}

impl ExperimentObserver for RecordingObserver {
    fn on_event(&self, event: &ExperimentEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn probes_named(names: &[&str]) -> Vec<Probe> {
    names
        .iter()
        .map(|name| Probe::http(*name, format!("http://{name}.test/health")))
        .collect()
}

pub fn targets(count: usize) -> Vec<Target> {
    (1..=count)
        .map(|i| Target::new(format!("m-{i}"), format!("web-{i}")).with_region("ams"))
        .collect()
}

pub fn experiment(duration: Duration, interval: Duration) -> Experiment {
    Experiment {
        name: "test-experiment".to_string(),
        description: "restart web machines".to_string(),
        steady_state: SteadyState {
            probes: probes_named(&["api", "web"]),
        },
        scenario: Scenario {
            kind: ScenarioKind::RestartRandom,
            selector: Selector {
                app: "web".to_string(),
                metadata: BTreeMap::new(),
            },
            duration,
            interval,
        },
    }
}
