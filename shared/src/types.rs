//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of health check a probe performs
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProbeKind {
    Http,
    /// Any kind this build does not know how to execute
    Unsupported(String),
}

impl From<String> for ProbeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "http" => ProbeKind::Http,
            _ => ProbeKind::Unsupported(s),
        }
    }
}

impl From<ProbeKind> for String {
    fn from(kind: ProbeKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Http => write!(f, "http"),
            ProbeKind::Unsupported(s) => write!(f, "{s}"),
        }
    }
}

/// Failure-injection policy a scenario applies on every tick
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScenarioKind {
    /// Restart one target, chosen uniformly at random, per tick
    RestartRandom,
    Unsupported(String),
}

impl From<String> for ScenarioKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "restart_random" => ScenarioKind::RestartRandom,
            _ => ScenarioKind::Unsupported(s),
        }
    }
}

impl From<ScenarioKind> for String {
    fn from(kind: ScenarioKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::RestartRandom => write!(f, "restart_random"),
            ScenarioKind::Unsupported(s) => write!(f, "{s}"),
        }
    }
}

/// A remote instance eligible to receive an injected failure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub state: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Target {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: "started".to_string(),
            region: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// True when every selector entry is present in the target's metadata
    pub fn matches_metadata(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(k, v)| self.metadata.get(k).is_some_and(|actual| actual == v))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.id, self.name)
        }
    }
}
