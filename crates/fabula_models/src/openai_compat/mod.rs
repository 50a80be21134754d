//! OpenAI-compatible chat completions client.
//!
//! Groq, and most hosted inference services, expose this wire format. The
//! client is used once per run to write the story.

mod client;
mod dto;

pub use client::{GROQ_CHAT_URL, OpenAICompatibleClient};
pub use dto::{ChatCompletionRequest, ChatCompletionRequestBuilder, ChatCompletionResponse};
