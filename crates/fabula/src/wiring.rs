//! Assembling a pipeline from configuration.

use crate::FabulaConfig;
use fabula_error::FabulaResult;
use fabula_models::{ChatEndpointClient, GROQ_CHAT_URL, ImageEndpointClient, OpenAICompatibleClient};
use fabula_narrative::PipelineOrchestrator;
use fabula_retry::{CooldownRetry, ResilientAssetGenerator};
use fabula_storage::FileSystemStorage;
use tracing::{info, instrument};

/// Orchestrator backed by the HTTP providers and the local filesystem.
pub type StoryboardOrchestrator = PipelineOrchestrator<
    ChatEndpointClient,
    OpenAICompatibleClient,
    ImageEndpointClient,
    FileSystemStorage,
>;

/// Build a ready-to-run orchestrator.
///
/// Creates the output directory. The story API key must be set in the
/// environment variable named by `[story] api_key_env`; the completion key
/// is optional.
///
/// # Errors
///
/// Returns a configuration error for a missing story key or an invalid
/// image endpoint, an HTTP error if a client cannot be built, and a storage
/// error if the output directory cannot be created.
#[instrument(skip(config))]
pub fn build_orchestrator(config: &FabulaConfig) -> FabulaResult<StoryboardOrchestrator> {
    let completion = ChatEndpointClient::from_env(
        config.completion().endpoint().as_str(),
        config.completion().api_key_env(),
        config.completion().timeout(),
    )?;

    let story = config.story();
    let provider = if story.endpoint() == GROQ_CHAT_URL {
        "groq"
    } else {
        "openai-compatible"
    };
    let story_driver = OpenAICompatibleClient::from_env(
        story.api_key_env(),
        story.model().as_str(),
        story.endpoint().as_str(),
        provider,
    )?;

    let image = config.image();
    let images = ImageEndpointClient::new(image.endpoint(), image.timeout())?;
    let storage = FileSystemStorage::new(config.pipeline().output_dir())?;
    let assets =
        ResilientAssetGenerator::new(images, storage, image.size().as_str(), image.model().as_str());

    let retry = config.retry();
    let cooldown = CooldownRetry::new(retry.cooldown()).with_max_attempts(*retry.max_completion_attempts());

    info!(
        completion = %config.completion().endpoint(),
        story_model = %story.model(),
        image_model = %image.model(),
        output_dir = %config.pipeline().output_dir().display(),
        "Pipeline assembled"
    );

    Ok(PipelineOrchestrator::new(completion, story_driver, assets, cooldown)
        .with_settings(config.pipeline_settings()?)
        .with_story_parameters(story.parameters()))
}
