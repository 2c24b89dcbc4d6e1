// src/oracle/http_client.rs
// Shared HTTP client for oracle and credential calls (one attempt per call)

use anyhow::{Result, anyhow};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::warn;

/// Upper bound for any single request when the caller sets none
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Default connect timeout
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Shared HTTP client for the oracle API and the credential endpoint
pub struct OracleHttpClient {
    client: Client,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl OracleHttpClient {
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            request_timeout,
            connect_timeout,
        }
    }

    /// POST a JSON body with Bearer auth and a per-call timeout.
    /// Returns the response body as text on success.
    pub async fn post_json(
        &self,
        request_id: &str,
        url: &str,
        bearer: &str,
        body: String,
        timeout: Duration,
    ) -> Result<String> {
        let request = self
            .client
            .post(url)
            .timeout(timeout)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", bearer))
            .body(body);
        self.send_once(request_id, request).await
    }

    /// POST a url-encoded form (credential exchange)
    pub async fn post_form(
        &self,
        request_id: &str,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<String> {
        let request = self
            .client
            .post(url)
            .timeout(timeout)
            .header("Accept", "application/json")
            .form(form);
        self.send_once(request_id, request).await
    }

    /// Send once; any non-2xx status becomes an `API error <status>` error
    async fn send_once(&self, request_id: &str, request: RequestBuilder) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(request_id = %request_id, status = %status, "Oracle endpoint rejected request");
            return Err(anyhow!("API error {}: {}", status, error_body));
        }

        Ok(response.text().await?)
    }
}

impl Default for OracleHttpClient {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }
}
