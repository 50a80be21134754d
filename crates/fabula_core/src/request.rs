//! Request types for the story and image providers.

use crate::Turn;
use fabula_error::{BuilderError, BuilderErrorKind};
use serde::{Deserialize, Serialize};

/// Chat generation request for the story provider.
///
/// # Examples
///
/// ```
/// use fabula_core::{GenerateRequest, Turn};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Turn::user("Write a story.")])
///     .temperature(1.0f32)
///     .max_tokens(1024u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.max_tokens(), Some(1024));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into), default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    messages: Vec<Turn>,
    /// Model identifier to use
    model: Option<String>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    max_tokens: Option<u32>,
    /// Nucleus sampling mass
    top_p: Option<f32>,
}

impl GenerateRequest {
    /// Creates a new request builder.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// Parameters of one image generation call.
///
/// # Examples
///
/// ```
/// use fabula_core::ImageRequest;
///
/// let request = ImageRequest::builder()
///     .prompt("A lighthouse at dusk")
///     .size("9:16")
///     .model("flux-disney")
///     .seed(4242u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.seed(), 4242);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_builder::Builder, derive_getters::Getters)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Image description
    prompt: String,
    /// Aspect ratio or pixel size understood by the provider
    size: String,
    /// Provider model name
    model: String,
    /// Random seed that varies output between calls
    seed: u32,
}

impl ImageRequest {
    /// Creates a new request builder.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

impl From<GenerateRequestBuilderError> for BuilderError {
    #[track_caller]
    fn from(err: GenerateRequestBuilderError) -> Self {
        builder_error(err.to_string(), matches!(err, GenerateRequestBuilderError::UninitializedField(_)))
    }
}

impl From<ImageRequestBuilderError> for BuilderError {
    #[track_caller]
    fn from(err: ImageRequestBuilderError) -> Self {
        builder_error(err.to_string(), matches!(err, ImageRequestBuilderError::UninitializedField(_)))
    }
}

#[track_caller]
fn builder_error(message: String, missing: bool) -> BuilderError {
    if missing {
        BuilderError::new(BuilderErrorKind::MissingField(message))
    } else {
        BuilderError::new(BuilderErrorKind::ValidationFailed(message))
    }
}
