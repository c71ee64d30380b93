//! Common test utilities and infrastructure
//!
//! Shared fixtures, mock builders and assertions used across the runner
//! integration suites.

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{OrchestratorBuilder, TestHelpers};
