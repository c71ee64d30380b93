//! Observer that renders engine events as log lines

use shared::duration::format_duration;
use shared::logging::format_timestamp;
use tracing::{debug, error, info, warn};

use crate::traits::ExperimentObserver;
use crate::types::{CheckPhase, ExperimentEvent};

/// Production observer: every event becomes one leveled `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ExperimentObserver for TracingObserver {
    fn on_event(&self, event: &ExperimentEvent) {
        let ts = format_timestamp();
        match event {
            ExperimentEvent::ExperimentStarted { run_id, name, description } => {
                info!(timestamp = ts, %run_id, "🚀 Starting experiment: {}", name);
                if !description.is_empty() {
                    info!(timestamp = ts, "📋 Description: {}", description);
                }
            }
            ExperimentEvent::SteadyStateCheckStarted { phase, probes } => {
                info!(timestamp = ts, probes, "🔍 Validating steady state {}...", phase);
            }
            ExperimentEvent::ProbePassed { probe } => {
                debug!(timestamp = ts, probe = %probe, "✅ Probe '{}' passed", probe);
            }
            ExperimentEvent::ProbeFailed { probe, error } => {
                warn!(timestamp = ts, probe = %probe, error = %error, "❌ Probe '{}' failed: {}", probe, error);
            }
            ExperimentEvent::SteadyStateConfirmed { phase } => match phase {
                CheckPhase::AfterChaos => info!(timestamp = ts, "✅ Steady state maintained after chaos"),
                _ => info!(timestamp = ts, "✅ Steady state validated {}", phase),
            },
            ExperimentEvent::ScenarioStarted {
                kind,
                app,
                duration,
                interval,
            } => {
                info!(
                    timestamp = ts,
                    app = %app,
                    "🔥 Executing chaos scenario: {} for {} (interval: {})",
                    kind,
                    format_duration(*duration),
                    format_duration(*interval)
                );
            }
            ExperimentEvent::TargetsFetched { count } => {
                info!(timestamp = ts, "🎯 Found {} eligible targets", count);
            }
            ExperimentEvent::AttackStarted { tick, target } => {
                info!(timestamp = ts, tick, region = %target.region, "💥 Attacking machine {}...", target);
            }
            ExperimentEvent::AttackSucceeded { tick, target } => {
                info!(timestamp = ts, tick, "✅ Successfully attacked machine {}", target.id);
            }
            ExperimentEvent::AttackFailed { tick, error } => {
                warn!(timestamp = ts, tick, "⚠️  Attack failed: {}", error);
            }
            ExperimentEvent::ScenarioCompleted { attacks, failed_attacks } => {
                info!(
                    timestamp = ts,
                    failed_attacks,
                    "⏰ Scenario duration completed. Attacks executed: {}",
                    attacks
                );
            }
            ExperimentEvent::ExperimentCompleted { elapsed } => {
                info!(timestamp = ts, "🎉 Experiment completed successfully in {:?}", elapsed);
            }
            ExperimentEvent::ExperimentAborted { reason } => {
                error!(timestamp = ts, "🛑 Experiment aborted: {}", reason);
            }
        }
    }
}
