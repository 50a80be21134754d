//! Orchestrator knobs.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings of a pipeline run.
///
/// # Examples
///
/// ```
/// use fabula_narrative::PipelineSettings;
/// use std::time::Duration;
///
/// let settings = PipelineSettings::builder()
///     .inter_scene_delay(Duration::ZERO)
///     .use_consolidated_context(false)
///     .build()
///     .unwrap();
///
/// assert_eq!(*settings.max_extraction_attempts(), 3);
/// assert_eq!(*settings.images_per_scene(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters)]
#[builder(setter(into), default)]
pub struct PipelineSettings {
    /// Wait before each scene imagination call
    inter_scene_delay: Duration,
    /// Imagine scenes against the summary instead of the full context
    use_consolidated_context: bool,
    /// Completion calls allowed per structured answer before giving up
    max_extraction_attempts: u32,
    /// Images requested for each scene prompt
    images_per_scene: u32,
    /// Attempts allowed per image
    asset_max_retries: u32,
    /// Wait between image attempts
    asset_retry_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            inter_scene_delay: Duration::from_secs(5),
            use_consolidated_context: true,
            max_extraction_attempts: 3,
            images_per_scene: 1,
            asset_max_retries: 3,
            asset_retry_delay: Duration::from_secs(5),
        }
    }
}

impl PipelineSettings {
    /// Creates a new builder.
    pub fn builder() -> PipelineSettingsBuilder {
        PipelineSettingsBuilder::default()
    }
}

fn default_temperature() -> f32 {
    1.0
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_top_p() -> f32 {
    1.0
}

/// Sampling parameters of the story request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct StoryParameters {
    /// Model override; the client's model is used when absent
    #[serde(default)]
    model: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    temperature: f32,
    /// Story length limit in tokens
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    top_p: f32,
}

impl Default for StoryParameters {
    fn default() -> Self {
        Self {
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

impl StoryParameters {
    /// Parameters with the given sampling values and no model override.
    pub fn new(temperature: f32, max_tokens: u32, top_p: f32) -> Self {
        Self {
            model: None,
            temperature,
            max_tokens,
            top_p,
        }
    }

    /// Send `model` instead of the client's default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
