//! Client for the conversational completion endpoint.

use crate::{excerpt, optional_env};
use async_trait::async_trait;
use fabula_core::Turn;
use fabula_error::{FabulaResult, HttpError, ProviderError, ProviderErrorKind};
use fabula_interface::CompletionDriver;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "chat-endpoint";

/// Request timeout used when none is configured.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

/// Body posted to the completion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatEndpointRequest<'a> {
    /// The new user prompt
    pub prompt: &'a str,
    /// Prior turns, oldest first
    #[serde(rename = "conversationHistory")]
    pub conversation_history: &'a [Turn],
}

/// Completion endpoint speaking `{prompt, conversationHistory}` → `{response}`.
///
/// Any other response shape is reported as an error; the caller decides
/// whether to retry.
#[derive(Debug, Clone)]
pub struct ChatEndpointClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ChatEndpointClient {
    /// Create a client posting to `endpoint` without credentials.
    ///
    /// A request still pending after `timeout` fails with an HTTP error.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    #[instrument(skip(endpoint, timeout), fields(timeout_secs = timeout.as_secs()))]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> FabulaResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    /// Create a client that sends a bearer token read from `api_key_env`
    /// when that variable is set.
    #[instrument(skip(endpoint, timeout))]
    pub fn from_env(
        endpoint: impl Into<String>,
        api_key_env: &str,
        timeout: Duration,
    ) -> FabulaResult<Self> {
        let api_key = optional_env(api_key_env);
        debug!(authenticated = api_key.is_some(), "Created completion endpoint client");
        Ok(Self {
            api_key,
            ..Self::new(endpoint, timeout)?
        })
    }

    /// Send `api_key` as a bearer token with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionDriver for ChatEndpointClient {
    #[instrument(
        skip(self, prompt, history),
        fields(provider = PROVIDER, prompt_len = prompt.len(), history_len = history.len())
    )]
    async fn complete(&self, prompt: &str, history: &[Turn]) -> FabulaResult<String> {
        let body = ChatEndpointRequest {
            prompt,
            conversation_history: history,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                PROVIDER,
                ProviderErrorKind::HttpStatus {
                    status_code: status.as_u16(),
                    message: excerpt(&error_text),
                },
            )
            .into());
        }

        let text = response
            .text()
            .await
            .map_err(|e| HttpError::new(format!("Failed to read response body: {}", e)))?;

        let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            ProviderError::new(
                PROVIDER,
                ProviderErrorKind::MalformedResponse(format!("{}: {}", e, excerpt(&text))),
            )
        })?;

        let reply = json
            .get("response")
            .and_then(|value| value.as_str())
            .ok_or_else(|| {
                ProviderError::new(PROVIDER, ProviderErrorKind::MissingField("response".into()))
            })?;

        debug!(reply_len = reply.len(), "Received completion");
        Ok(reply.to_string())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
