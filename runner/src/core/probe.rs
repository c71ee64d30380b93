//! HTTP probe executor
//!
//! One request per invocation, no retries. The probe's own timeout bounds the
//! whole exchange, and the cancellation token preempts it.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use tokio_util::sync::CancellationToken;

use shared::{HttpProbe, Probe, ProbeKind};

use crate::error::{ProbeError, ProbeResult};
use crate::traits::ProbeExecutor;

/// Executes `http` probes with a shared, connection-pooling client
#[derive(Clone, Default)]
pub struct HttpProbeExecutor {
    client: Client,
}

impl HttpProbeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build_request(&self, probe: &Probe, http: &HttpProbe) -> ProbeResult<reqwest::Request> {
        let method = Method::from_bytes(http.method.as_bytes()).map_err(|e| ProbeError::RequestConstruction {
            message: format!("invalid method '{}': {e}", http.method),
        })?;

        let url = Url::parse(&http.url).map_err(|e| ProbeError::RequestConstruction {
            message: format!("invalid url '{}': {e}", http.url),
        })?;

        let mut headers = HeaderMap::with_capacity(http.headers.len());
        for (key, value) in &http.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| ProbeError::RequestConstruction {
                message: format!("invalid header name '{key}': {e}"),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| ProbeError::RequestConstruction {
                message: format!("invalid value for header '{key}': {e}"),
            })?;
            headers.insert(name, value);
        }

        self.client
            .request(method, url)
            .headers(headers)
            .timeout(probe.timeout)
            .build()
            .map_err(|e| ProbeError::RequestConstruction { message: e.to_string() })
    }

    async fn send(&self, probe: &Probe, http: &HttpProbe, request: reqwest::Request) -> ProbeResult<()> {
        let mut response = self.client.execute(request).await.map_err(|e| transport_error(probe, e))?;
        let status = response.status().as_u16();

        // Drain the body chunk by chunk so the connection goes back to the pool
        loop {
            match response.chunk().await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(probe = %probe.name, error = %e, "failed to drain response body");
                    break;
                }
            }
        }

        if status != http.expected_status {
            return Err(ProbeError::UnexpectedStatus {
                got: status,
                want: http.expected_status,
            });
        }

        Ok(())
    }
}

fn transport_error(probe: &Probe, e: reqwest::Error) -> ProbeError {
    let message = if e.is_timeout() {
        format!("timed out after {:?}", probe.timeout)
    } else {
        e.to_string()
    };
    ProbeError::Transport { message }
}

#[async_trait]
impl ProbeExecutor for HttpProbeExecutor {
    async fn execute(&self, probe: &Probe, cancel: &CancellationToken) -> ProbeResult<()> {
        let http = match &probe.kind {
            ProbeKind::Http => probe.http.as_ref().ok_or_else(|| ProbeError::MissingProbeConfig {
                kind: probe.kind.to_string(),
            })?,
            ProbeKind::Unsupported(kind) => {
                return Err(ProbeError::UnsupportedProbeKind { kind: kind.clone() });
            }
        };

        let request = self.build_request(probe, http)?;

        tokio::select! {
            _ = cancel.cancelled() => Err(ProbeError::Cancelled),
            result = self.send(probe, http, request) => result,
        }
    }
}
