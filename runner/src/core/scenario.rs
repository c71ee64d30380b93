//! Scenario loop
//!
//! Fetches the target snapshot once, then on every interval tick restarts one
//! random target, waits for the settle delay and re-validates steady state.
//! The loop ends cleanly only when the scenario deadline expires; the deadline
//! preempts whatever tick is in flight. A regression after an attack aborts
//! the loop, a failed injection does not.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use shared::{Experiment, ScenarioKind, Target};

use crate::core::validator::SteadyStateValidator;
use crate::error::{AttackError, ScenarioError, ScenarioResult};
use crate::traits::{ExperimentObserver, ProbeExecutor, Saboteur};
use crate::types::{CheckPhase, ExperimentEvent, InjectionEvent, ScenarioOutcome};

/// Pause after a successful restart before probing again
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Stand-in for instants the clock cannot represent, as `tokio::time::sleep` does
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

pub struct ScenarioLoop<S, E>
where
    S: Saboteur,
    E: ProbeExecutor + 'static,
{
    saboteur: Arc<S>,
    validator: SteadyStateValidator<E>,
    observer: Arc<dyn ExperimentObserver>,
    rng: Box<dyn RngCore + Send>,
    settle_delay: Duration,
}

impl<S, E> ScenarioLoop<S, E>
where
    S: Saboteur,
    E: ProbeExecutor + 'static,
{
    pub fn new(saboteur: Arc<S>, validator: SteadyStateValidator<E>, observer: Arc<dyn ExperimentObserver>) -> Self {
        Self {
            saboteur,
            validator,
            observer,
            rng: Box::new(StdRng::from_entropy()),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Replace the random source used for target selection
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Run the experiment's scenario until its deadline, a regression, or
    /// cancellation.
    pub async fn run(&mut self, experiment: &Experiment, cancel: &CancellationToken) -> ScenarioResult<ScenarioOutcome> {
        let scenario = &experiment.scenario;
        if let ScenarioKind::Unsupported(kind) = &scenario.kind {
            return Err(ScenarioError::UnsupportedScenarioKind { kind: kind.clone() });
        }

        self.observer.on_event(&ExperimentEvent::ScenarioStarted {
            kind: scenario.kind.to_string(),
            app: scenario.selector.app.clone(),
            duration: scenario.duration,
            interval: scenario.interval,
        });

        let targets = tokio::select! {
            _ = cancel.cancelled() => return Err(ScenarioError::Cancelled),
            result = self.saboteur.list_targets(&scenario.selector.app, &scenario.selector.metadata) => {
                result.map_err(ScenarioError::TargetFetchFailed)?
            }
        };
        self.observer.on_event(&ExperimentEvent::TargetsFetched { count: targets.len() });

        // Probe tasks still running when the loop exits are cancelled with it
        let scope = cancel.child_token();
        let _scope_guard = scope.clone().drop_guard();

        let started = Instant::now();
        let deadline = tokio::time::sleep(scenario.duration);
        tokio::pin!(deadline);

        let first_tick = started
            .checked_add(scenario.interval)
            .unwrap_or_else(|| started + FAR_FUTURE);
        let mut ticker = interval_at(first_tick, scenario.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut outcome = ScenarioOutcome::default();
        let mut tick = 0u32;

        loop {
            tokio::select! {
                biased;
                _ = scope.cancelled() => return Err(ScenarioError::Cancelled),
                _ = &mut deadline => break,
                _ = ticker.tick() => {
                    tick += 1;
                    let step = self.run_tick(tick, experiment, &targets, &scope, &mut outcome);
                    tokio::select! {
                        biased;
                        _ = scope.cancelled() => return Err(ScenarioError::Cancelled),
                        _ = &mut deadline => break,
                        result = step => result?,
                    }
                }
            }
        }

        outcome.elapsed = started.elapsed();
        self.observer.on_event(&ExperimentEvent::ScenarioCompleted {
            attacks: outcome.attacks,
            failed_attacks: outcome.failed_attacks,
        });
        Ok(outcome)
    }

    /// Attack → settle → validate for one tick
    async fn run_tick(
        &mut self,
        tick: u32,
        experiment: &Experiment,
        targets: &[Target],
        cancel: &CancellationToken,
        outcome: &mut ScenarioOutcome,
    ) -> ScenarioResult<()> {
        let target = match self.attack(tick, &experiment.scenario.selector.app, targets).await {
            Ok(target) => target,
            Err((target, error)) => {
                self.observer.on_event(&ExperimentEvent::AttackFailed {
                    tick,
                    error: error.to_string(),
                });
                outcome.record(InjectionEvent::failed(tick, target, error.to_string()));
                return Ok(());
            }
        };

        self.observer.on_event(&ExperimentEvent::AttackSucceeded {
            tick,
            target: target.clone(),
        });
        outcome.record(InjectionEvent::succeeded(tick, target.clone()));

        tokio::time::sleep(self.settle_delay).await;

        self.validator
            .check(CheckPhase::AfterAttack { tick }, &experiment.steady_state.probes, cancel)
            .await
            .map_err(|violation| ScenarioError::SteadyStateRegression {
                tick,
                target,
                violation,
            })
    }

    /// Restart one random target from the snapshot
    async fn attack(&mut self, tick: u32, app: &str, targets: &[Target]) -> Result<Target, (Option<Target>, AttackError)> {
        let target = self.pick_target(targets).ok_or((None, AttackError::NoTargetsAvailable))?;

        self.observer.on_event(&ExperimentEvent::AttackStarted {
            tick,
            target: target.clone(),
        });

        match self.saboteur.restart_target(app, &target.id).await {
            Ok(()) => Ok(target),
            Err(source) => {
                let error = AttackError::Injection {
                    target_id: target.id.clone(),
                    source,
                };
                Err((Some(target), error))
            }
        }
    }

    fn pick_target(&mut self, targets: &[Target]) -> Option<Target> {
        if targets.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..targets.len());
        Some(targets[index].clone())
    }
}
