//! HTTP provider clients for Fabula.
//!
//! # Available Providers
//!
//! - [`ChatEndpointClient`] - conversational completion endpoint taking a
//!   prompt plus conversation history
//! - [`OpenAICompatibleClient`] - OpenAI-style chat completions (Groq by
//!   default) used to write the story
//! - [`ImageEndpointClient`] - GET-templated image generation endpoint
//!
//! None of the clients retry. Retry policy lives in `fabula_retry`.
//!
//! # Example
//!
//! ```no_run
//! use fabula_core::GenerateRequest;
//! use fabula_interface::StoryDriver;
//! use fabula_models::OpenAICompatibleClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAICompatibleClient::groq("llama-3.1-70b-versatile")?;
//! let request = GenerateRequest::builder().build()?;
//! let story = client.generate(&request).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chat_endpoint;
mod image;
mod openai_compat;

pub use chat_endpoint::{ChatEndpointClient, ChatEndpointRequest, DEFAULT_COMPLETION_TIMEOUT};
pub use image::{DEFAULT_IMAGE_TIMEOUT, ImageEndpointClient};
pub use openai_compat::{
    ChatCompletionRequest, ChatCompletionRequestBuilder, ChatCompletionResponse, GROQ_CHAT_URL,
    OpenAICompatibleClient,
};

/// Read an optional credential from the environment.
///
/// Unset and empty variables both count as absent.
pub(crate) fn optional_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.trim().is_empty())
}

/// First part of an error body, for log-friendly error messages.
pub(crate) fn excerpt(body: &str) -> String {
    const LIMIT: usize = 500;
    match body.char_indices().nth(LIMIT) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}
