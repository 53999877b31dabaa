use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;

use super::{CallFailure, Endpoint, UpstreamResponse};
use crate::config::Config;

/// Client for the upstream card service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    redeem_url: String,
    query_url: String,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            redeem_url: config.redeem_url(),
            query_url: config.query_url(),
            timeout: Duration::from_millis(config.upstream_timeout_ms),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Redeem => &self.redeem_url,
            Endpoint::Query => &self.query_url,
        }
    }

    /// POST `payload` to `endpoint` and capture whatever comes back.
    ///
    /// Never returns an error: a timeout or transport failure yields
    /// `ok: false, status: 500` with the failure text under `data.error`.
    pub async fn call(&self, endpoint: Endpoint, payload: &Value) -> UpstreamResponse {
        let url = self.url(endpoint);
        let started = Instant::now();

        let request = async {
            let response = self
                .client
                .post(url)
                .header("Content-Type", "application/json")
                .json(payload)
                .send()
                .await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok((status, text))) => {
                tracing::info!(
                    endpoint = %endpoint,
                    status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Upstream call completed"
                );
                UpstreamResponse::from_body(status, &text)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    endpoint = %endpoint,
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Upstream call failed"
                );
                UpstreamResponse::failed(CallFailure::Transport, e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    endpoint = %endpoint,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Upstream call timed out"
                );
                UpstreamResponse::failed(
                    CallFailure::Timeout,
                    format!(
                        "{} request timed out after {}ms",
                        endpoint,
                        self.timeout.as_millis()
                    ),
                )
            }
        }
    }
}
