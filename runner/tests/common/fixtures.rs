//! Test fixtures for runner integration tests

use std::collections::BTreeMap;
use std::time::Duration;

use shared::{Experiment, Probe, Scenario, ScenarioKind, Selector, SteadyState, Target};

pub struct TestFixtures;

impl TestFixtures {
    pub const APP: &'static str = "web";
    pub const PROBES: &'static [&'static str] = &["api", "web"];
    pub const TARGET_COUNT: usize = 3;

    pub fn targets() -> Vec<Target> {
        (1..=Self::TARGET_COUNT)
            .map(|i| Target::new(format!("m-{i}"), format!("web-{i}")).with_region("ams"))
            .collect()
    }

    pub fn probes() -> Vec<Probe> {
        Self::PROBES
            .iter()
            .map(|name| Probe::http(*name, format!("http://{name}.test/health")))
            .collect()
    }

    pub fn experiment(duration: Duration, interval: Duration) -> Experiment {
        Self::experiment_with_probes(Self::probes(), duration, interval)
    }

    pub fn experiment_with_probes(probes: Vec<Probe>, duration: Duration, interval: Duration) -> Experiment {
        Experiment {
            name: "restart-web".to_string(),
            description: "restart web machines while probing health".to_string(),
            steady_state: SteadyState { probes },
            scenario: Scenario {
                kind: ScenarioKind::RestartRandom,
                selector: Selector {
                    app: Self::APP.to_string(),
                    metadata: BTreeMap::new(),
                },
                duration,
                interval,
            },
        }
    }

    /// YAML document equivalent to a two-probe experiment against `base`
    pub fn experiment_yaml(base: &str) -> String {
        format!(
            r#"
name: restart-web
description: restart web machines while probing health
steady_state:
  probes:
    - name: api
      type: http
      timeout: 2s
      http:
        url: {base}/api/health
    - name: web
      type: http
      timeout: 2s
      http:
        url: {base}/health
        expected_status: 204
scenario:
  type: restart_random
  selector:
    app: web
  duration: 300ms
  interval: 100ms
"#
        )
    }
}
