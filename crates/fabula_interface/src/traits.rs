//! Trait definitions for remote providers.

use async_trait::async_trait;
use fabula_core::{GenerateRequest, ImageRequest, Turn};
use fabula_error::FabulaResult;

/// Black-box chat completion endpoint.
///
/// One call issues exactly one network request. Implementations report
/// failures as errors and never retry; retry policy lives in the
/// resilience layer.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Complete `prompt` given the prior conversation.
    async fn complete(&self, prompt: &str, history: &[Turn]) -> FabulaResult<String>;

    /// Provider name used in logs.
    fn provider_name(&self) -> &'static str;
}

/// Chat provider used once per run to write the story.
#[async_trait]
pub trait StoryDriver: Send + Sync {
    /// Generate the text of the first choice for the request.
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<String>;

    /// Provider name (e.g., "groq").
    fn provider_name(&self) -> &'static str;

    /// Model identifier sent when the request does not override it.
    fn model_name(&self) -> &str;
}

/// Image generation endpoint returning raw image bytes.
#[async_trait]
pub trait ImageDriver: Send + Sync {
    /// Fetch one image for the request.
    async fn fetch(&self, req: &ImageRequest) -> FabulaResult<Vec<u8>>;

    /// Provider name used in logs.
    fn provider_name(&self) -> &'static str;
}
