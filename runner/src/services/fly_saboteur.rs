//! Fly.io Machines saboteur
//!
//! Lists machines for an app and restarts them through the Machines REST API.
//!
//! ## Configuration Sources
//! The API token is loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! ## Required Keys
//! - `FLY_API_TOKEN`: bearer token for the Machines API
//!
//! ## Optional Keys
//! - `FLY_API_BASE_URL`: overrides `https://api.machines.dev/v1`

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use shared::Target;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::Saboteur;

/// Real saboteur backed by the Fly.io Machines API
pub struct FlySaboteur {
    api_token: String,
    base_url: String,
    client: reqwest::Client,
}

/// Machine states that can be restarted
const ELIGIBLE_STATES: &[&str] = &["started", "running"];

#[derive(Debug, Deserialize)]
struct Machine {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    config: MachineConfig,
}

#[derive(Debug, Default, Deserialize)]
struct MachineConfig {
    #[serde(default)]
    metadata: Option<BTreeMap<String, String>>,
}

impl From<Machine> for Target {
    fn from(machine: Machine) -> Self {
        Target {
            id: machine.id,
            name: machine.name,
            state: machine.state,
            region: machine.region,
            metadata: machine.config.metadata.unwrap_or_default(),
        }
    }
}

impl FlySaboteur {
    pub const TOKEN_ENV: &'static str = "FLY_API_TOKEN";
    pub const BASE_URL_ENV: &'static str = "FLY_API_BASE_URL";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.machines.dev/v1";
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_token: impl Into<String>, base_url: impl Into<String>) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Client { message: e.to_string() })?;

        let saboteur = Self {
            api_token: api_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        };
        saboteur.endpoint(&[])?;
        Ok(saboteur)
    }

    /// Build from `FLY_API_TOKEN` (and optional `FLY_API_BASE_URL`)
    pub fn from_env() -> ProviderResult<Self> {
        // A missing .env file is fine
        let _ = dotenv::dotenv();

        let api_token = std::env::var(Self::TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingCredential {
                name: Self::TOKEN_ENV.to_string(),
            })?;
        let base_url = std::env::var(Self::BASE_URL_ENV).unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());

        Self::new(api_token, base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL extended with percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> ProviderResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| ProviderError::Client {
            message: format!("invalid base url '{}': {e}", self.base_url),
        })?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Client {
                message: format!("base url '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ProviderResult<reqwest::Response> {
        request
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ProviderError::Transport { message: e.to_string() })
    }
}

async fn unexpected_status(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::UnexpectedStatus { status, body }
}

#[async_trait]
impl Saboteur for FlySaboteur {
    async fn list_targets(&self, app: &str, selector: &BTreeMap<String, String>) -> ProviderResult<Vec<Target>> {
        let url = self.endpoint(&["apps", app, "machines"])?;
        let response = self.send(self.client.get(url)).await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(unexpected_status(response).await);
        }

        let machines: Vec<Machine> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode { message: e.to_string() })?;

        let targets: Vec<Target> = machines
            .into_iter()
            .filter(|m| ELIGIBLE_STATES.contains(&m.state.as_str()))
            .map(Target::from)
            .filter(|t| t.matches_metadata(selector))
            .collect();

        if targets.is_empty() {
            return Err(ProviderError::NoEligibleTargets { app: app.to_string() });
        }

        tracing::debug!(app, count = targets.len(), "listed eligible machines");
        Ok(targets)
    }

    async fn restart_target(&self, app: &str, target_id: &str) -> ProviderResult<()> {
        let url = self.endpoint(&["apps", app, "machines", target_id, "restart"])?;
        let response = self.send(self.client.post(url)).await?;

        match response.status() {
            reqwest::StatusCode::OK | reqwest::StatusCode::ACCEPTED => Ok(()),
            _ => Err(unexpected_status(response).await),
        }
    }
}
