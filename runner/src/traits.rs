//! Trait definitions with mockall annotations for testing
//!
//! These are the seams of the engine: the probe executor, the provider that
//! lists and disrupts targets, and the observer that receives progress
//! events. Production implementations live in `services` and `core::probe`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use shared::{Probe, Target};

use crate::error::{ProbeResult, ProviderResult};
use crate::types::ExperimentEvent;

/// Performs one health check against one endpoint
#[mockall::automock]
#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    /// Run the probe once. Must return promptly with `ProbeError::Cancelled`
    /// when `cancel` fires.
    async fn execute(&self, probe: &Probe, cancel: &CancellationToken) -> ProbeResult<()>;
}

/// Target inventory and failure injection for one provider
///
/// Implementations decide which targets are eligible; the engine applies no
/// filtering of its own.
#[mockall::automock]
#[async_trait]
pub trait Saboteur: Send + Sync {
    /// List eligible targets for `app`, restricted to those whose metadata
    /// contains every `selector` entry. An empty result is
    /// `ProviderError::NoEligibleTargets`.
    async fn list_targets(&self, app: &str, selector: &BTreeMap<String, String>) -> ProviderResult<Vec<Target>>;

    /// Restart one target
    async fn restart_target(&self, app: &str, target_id: &str) -> ProviderResult<()>;
}

/// Receives leveled, structured progress events from the engine
#[mockall::automock]
pub trait ExperimentObserver: Send + Sync {
    fn on_event(&self, event: &ExperimentEvent);
}
