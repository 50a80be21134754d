//! OpenAI-compatible client implementation.

use super::dto::{ChatCompletionRequest, ChatCompletionResponse};
use crate::excerpt;
use async_trait::async_trait;
use fabula_core::GenerateRequest;
use fabula_error::{
    BuilderError, ConfigError, FabulaResult, HttpError, ProviderError, ProviderErrorKind,
};
use fabula_interface::StoryDriver;
use reqwest::Client;
use tracing::{debug, instrument};

/// Groq chat completions endpoint.
pub const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Client for any OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    provider: &'static str,
}

impl OpenAICompatibleClient {
    /// Creates a client for an arbitrary endpoint.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        provider: &'static str,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
            provider,
        }
    }

    /// Creates a client reading its API key from `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns error if the variable is not set.
    #[instrument(skip(model, endpoint))]
    pub fn from_env(
        api_key_env: &str,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        provider: &'static str,
    ) -> FabulaResult<Self> {
        let api_key = crate::optional_env(api_key_env)
            .ok_or_else(|| ConfigError::missing_env(api_key_env))?;
        Ok(Self::new(api_key, model, endpoint, provider))
    }

    /// Creates a Groq client.
    ///
    /// Reads API token from `GROQ_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns error if API token is not set.
    pub fn groq(model: impl Into<String>) -> FabulaResult<Self> {
        Self::from_env("GROQ_API_KEY", model, GROQ_CHAT_URL, "groq")
    }

    fn to_wire(&self, req: &GenerateRequest) -> FabulaResult<ChatCompletionRequest> {
        let model = req.model().clone().unwrap_or_else(|| self.model.clone());
        let wire = ChatCompletionRequest::builder()
            .model(model)
            .messages(req.messages().clone())
            .temperature(*req.temperature())
            .max_tokens(*req.max_tokens())
            .top_p(*req.top_p())
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?;
        Ok(wire)
    }
}

#[async_trait]
impl StoryDriver for OpenAICompatibleClient {
    #[instrument(
        skip(self, req),
        fields(provider = self.provider, model = %self.model, messages = req.messages().len())
    )]
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<String> {
        let body = self.to_wire(req)?;

        debug!(endpoint = %self.endpoint, "Sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                self.provider,
                ProviderErrorKind::HttpStatus {
                    status_code: status.as_u16(),
                    message: excerpt(&error_text),
                },
            )
            .into());
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::new(
                self.provider,
                ProviderErrorKind::MalformedResponse(format!("Failed to parse response: {}", e)),
            )
        })?;

        let content = parsed
            .first_content()
            .ok_or_else(|| ProviderError::new(self.provider, ProviderErrorKind::EmptyResponse))?;

        debug!(content_len = content.len(), "Received chat completion");
        Ok(content.to_string())
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
