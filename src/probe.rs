//! JSON-RPC health probes for network readiness.

use std::time::Duration;

use serde_json::Value;
use url::Url;

/// Issues chain-id health probes against HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    deadline: Duration,
}

impl HealthProbe {
    /// Creates a probe with the given per-endpoint deadline.
    pub fn new(deadline: Duration) -> Self {
        Self { client: reqwest::Client::new(), deadline }
    }

    /// Probes one endpoint with an `eth_chainId` request.
    ///
    /// The endpoint is healthy iff the response arrives within the deadline
    /// and parses as a JSON object carrying a `result` key.
    pub async fn check(&self, endpoint: &Url) -> bool {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_chainId",
            "params": [],
            "id": 1
        });

        let response = match self
            .client
            .post(endpoint.clone())
            .timeout(self.deadline)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "Endpoint not ready");
                return false;
            }
        };

        let value: Value = match response.json().await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "Invalid JSON response");
                return false;
            }
        };

        if value.get("result").is_none() {
            tracing::warn!(%endpoint, "Response carries no result field");
            return false;
        }

        true
    }
}
