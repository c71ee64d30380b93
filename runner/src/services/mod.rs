//! Service implementations
//!
//! Production implementations of the collaborator traits: the Fly.io
//! saboteur and the tracing-backed observer.

pub mod fly_saboteur;
pub mod tracing_observer;

#[cfg(test)]
mod tests;

pub use fly_saboteur::FlySaboteur;
pub use tracing_observer::TracingObserver;
