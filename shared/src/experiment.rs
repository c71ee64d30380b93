//! Experiment definition types
//!
//! An [`Experiment`] is deserialized from YAML and then passed through
//! [`Experiment::validate`], which applies defaults and rejects anything the
//! runner cannot execute. Only validated experiments are handed to the runner.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::duration::{format_duration, serde_duration};
use crate::errors::{ConfigError, ConfigResult};
use crate::types::{ProbeKind, ScenarioKind};

pub const DEFAULT_HTTP_METHOD: &str = "GET";
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest scenario duration or interval an experiment may request
pub const MAX_SCENARIO_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Complete chaos experiment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steady_state: SteadyState,
    pub scenario: Scenario,
}

/// Health conditions that must hold for the system to count as healthy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SteadyState {
    #[serde(default)]
    pub probes: Vec<Probe>,
}

/// A single named health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProbeKind,
    #[serde(default = "default_timeout", with = "serde_duration")]
    pub timeout: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpProbe>,
}

/// HTTP-specific probe parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpProbe {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Failure-injection policy executed over the experiment's duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(rename = "type")]
    pub kind: ScenarioKind,
    #[serde(default)]
    pub selector: Selector,
    #[serde(with = "serde_duration")]
    pub duration: Duration,
    #[serde(with = "serde_duration")]
    pub interval: Duration,
}

/// Which targets a scenario may disrupt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(default)]
    pub app: String,
    /// Only targets carrying all of these metadata entries are eligible
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

fn default_timeout() -> Duration {
    DEFAULT_PROBE_TIMEOUT
}

fn default_method() -> String {
    DEFAULT_HTTP_METHOD.to_string()
}

fn default_expected_status() -> u16 {
    DEFAULT_EXPECTED_STATUS
}

impl Experiment {
    /// Validate the experiment, filling in defaults for unset probe fields.
    pub fn validate(mut self) -> ConfigResult<Self> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::missing("name"));
        }

        if self.steady_state.probes.is_empty() {
            return Err(ConfigError::invalid(
                "steady_state.probes",
                "at least one probe is required",
            ));
        }

        let mut seen = HashSet::new();
        for (i, probe) in self.steady_state.probes.iter_mut().enumerate() {
            let path = format!("steady_state.probes[{i}]");
            probe.validate(&path)?;
            if !seen.insert(probe.name.clone()) {
                return Err(ConfigError::invalid(
                    format!("{path}.name"),
                    format!("duplicate probe name '{}'", probe.name),
                ));
            }
        }

        self.scenario.validate("scenario")?;
        Ok(self)
    }
}

impl Probe {
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProbeKind::Http,
            timeout: DEFAULT_PROBE_TIMEOUT,
            http: Some(HttpProbe::get(url)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        if let Some(http) = self.http.as_mut() {
            http.expected_status = status;
        }
        self
    }

    fn validate(&mut self, path: &str) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::missing(format!("{path}.name")));
        }

        if let ProbeKind::Unsupported(kind) = &self.kind {
            return Err(ConfigError::UnsupportedKind {
                field: format!("{path}.type"),
                kind: kind.clone(),
            });
        }

        let http = self
            .http
            .as_mut()
            .ok_or_else(|| ConfigError::missing(format!("{path}.http")))?;
        http.validate(&format!("{path}.http"))?;

        if self.timeout.is_zero() {
            self.timeout = DEFAULT_PROBE_TIMEOUT;
        }

        Ok(())
    }
}

impl HttpProbe {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            expected_status: DEFAULT_EXPECTED_STATUS,
            headers: BTreeMap::new(),
        }
    }

    fn validate(&mut self, path: &str) -> ConfigResult<()> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::missing(format!("{path}.url")));
        }
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| ConfigError::invalid(format!("{path}.url"), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                format!("{path}.url"),
                format!("scheme must be http or https, got '{}'", parsed.scheme()),
            ));
        }

        if self.method.trim().is_empty() {
            self.method = default_method();
        }
        self.method = self.method.trim().to_ascii_uppercase();
        if !is_http_token(&self.method) {
            return Err(ConfigError::invalid(
                format!("{path}.method"),
                format!("'{}' is not a valid HTTP method", self.method),
            ));
        }

        if self.expected_status == 0 {
            self.expected_status = DEFAULT_EXPECTED_STATUS;
        }
        if !(100..=599).contains(&self.expected_status) {
            return Err(ConfigError::invalid(
                format!("{path}.expected_status"),
                format!("{} is not an HTTP status code", self.expected_status),
            ));
        }

        Ok(())
    }
}

impl Scenario {
    fn validate(&self, path: &str) -> ConfigResult<()> {
        if let ScenarioKind::Unsupported(kind) = &self.kind {
            return Err(ConfigError::UnsupportedKind {
                field: format!("{path}.type"),
                kind: kind.clone(),
            });
        }

        if self.selector.app.trim().is_empty() {
            return Err(ConfigError::missing(format!("{path}.selector.app")));
        }

        if self.duration.is_zero() {
            return Err(ConfigError::invalid(
                format!("{path}.duration"),
                "a positive duration is required",
            ));
        }

        if self.interval.is_zero() {
            return Err(ConfigError::invalid(
                format!("{path}.interval"),
                "a positive interval is required",
            ));
        }

        if self.duration > MAX_SCENARIO_DURATION {
            return Err(ConfigError::invalid(
                format!("{path}.duration"),
                format!("cannot exceed {}", format_duration(MAX_SCENARIO_DURATION)),
            ));
        }

        if self.interval > self.duration {
            return Err(ConfigError::invalid(
                format!("{path}.interval"),
                "interval cannot be greater than duration",
            ));
        }

        Ok(())
    }
}

/// RFC 9110 token characters
fn is_http_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
