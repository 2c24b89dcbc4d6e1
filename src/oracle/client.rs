// src/oracle/client.rs
// Hosted chat API client (non-streaming, one attempt per call)

use crate::config::{OracleCredentials, OracleSection};
use crate::error::{IntakeError, Result};
use crate::oracle::http_client::OracleHttpClient;
use crate::oracle::logging::{log_completion, log_failure, log_usage};
use crate::oracle::token::{ApiKeyCredentialSource, TokenCache};
use crate::oracle::wire::{ChatRequest, parse_chat_response};
use crate::oracle::{Oracle, OracleRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Span, debug, instrument};
use uuid::Uuid;

/// API version pinned for the text-chat endpoint
const CHAT_API_VERSION: &str = "2023-05-29";

/// Hosted chat completion client
pub struct HostedChatClient {
    chat_url: String,
    project_id: String,
    model_id: String,
    http: OracleHttpClient,
    tokens: TokenCache,
}

impl HostedChatClient {
    /// Create a client from credentials and the `[oracle]` config section
    pub fn new(creds: &OracleCredentials, settings: &OracleSection) -> Self {
        let source = Arc::new(ApiKeyCredentialSource::new(&creds.iam_url, &creds.api_key));
        let tokens = TokenCache::new(source, settings.token_expiry_margin());
        let http = OracleHttpClient::new(Duration::from_secs(60), Duration::from_secs(10));

        Self {
            chat_url: Self::chat_url(&creds.base_url),
            project_id: creds.project_id.clone(),
            model_id: creds.model_id.clone(),
            http,
            tokens,
        }
    }

    fn chat_url(base_url: &str) -> String {
        format!(
            "{}/ml/v1/text/chat?version={}",
            base_url.trim_end_matches('/'),
            CHAT_API_VERSION
        )
    }

    async fn send(&self, request_id: &str, request: &OracleRequest) -> Result<String> {
        let bearer = self.tokens.bearer().await?;

        let body = serde_json::to_string(&ChatRequest {
            project_id: &self.project_id,
            model_id: &self.model_id,
            messages: &request.messages,
            parameters: &request.params,
        })?;
        debug!(request_id = %request_id, bytes = body.len(), "Oracle request built");

        let response_body = self
            .http
            .post_json(request_id, &self.chat_url, &bearer, body, request.timeout)
            .await
            .map_err(|e| {
                // A rejected bearer is refetched on the next call
                if e.to_string().contains("API error 401") {
                    self.tokens.invalidate();
                }
                IntakeError::Oracle(e.to_string())
            })?;

        let completion =
            parse_chat_response(&response_body).map_err(|e| IntakeError::Oracle(e.to_string()))?;
        if let Some(ref usage) = completion.usage {
            log_usage(request_id, request.stage, usage);
        }
        Ok(completion.content)
    }
}

#[async_trait]
impl Oracle for HostedChatClient {
    #[instrument(
        skip(self, request),
        fields(
            request_id,
            stage = request.stage,
            model = %self.model_id,
            message_count = request.messages.len()
        )
    )]
    async fn complete(&self, request: OracleRequest) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        Span::current().record("request_id", request_id.as_str());

        let result = self.send(&request_id, &request).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        match &result {
            Ok(content) => log_completion(&request_id, request.stage, duration_ms, content.len()),
            Err(e) => log_failure(&request_id, request.stage, duration_ms, e),
        }
        result
    }

    fn model_name(&self) -> String {
        self.model_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url() {
        assert_eq!(
            HostedChatClient::chat_url("https://us-south.ml.example.com/"),
            "https://us-south.ml.example.com/ml/v1/text/chat?version=2023-05-29"
        );
    }

    #[test]
    fn test_new_client_uses_credentials() {
        let creds = OracleCredentials::from_lookup(|name| match name {
            "ORACLE_URL" => Some("https://example.com".into()),
            "ORACLE_API_KEY" => Some("k".into()),
            "ORACLE_PROJECT_ID" => Some("p".into()),
            _ => None,
        })
        .unwrap();
        let client = HostedChatClient::new(&creds, &OracleSection::default());
        assert_eq!(client.model_name(), crate::config::env::DEFAULT_MODEL_ID);
        assert_eq!(client.project_id, "p");
        assert_eq!(client.http.connect_timeout, Duration::from_secs(10));
    }
}
