//! Wire types for OpenAI-style chat completions.

use derive_builder::Builder;
use derive_getters::Getters;
use fabula_core::Turn;
use serde::{Deserialize, Serialize};

/// Chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize, Builder, Getters)]
#[builder(setter(into))]
pub struct ChatCompletionRequest {
    /// Model identifier
    model: String,
    /// Conversation, oldest first
    messages: Vec<Turn>,
    /// Sampling temperature
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Completion length limit
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Nucleus sampling
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    /// Always false; the story is read in one piece
    #[builder(default = "false")]
    stream: bool,
}

impl ChatCompletionRequest {
    /// Creates a new builder.
    pub fn builder() -> ChatCompletionRequestBuilder {
        ChatCompletionRequestBuilder::default()
    }
}

/// Message inside a response choice.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

/// One generated alternative.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    pub(crate) message: ChoiceMessage,
}

/// Chat completion response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub(crate) choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}
