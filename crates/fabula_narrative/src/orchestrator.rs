//! The storyboard pipeline.

use crate::extraction::{describe, extract_as};
use crate::prompts;
use crate::report::{ImageStatus, PipelineReport, SceneOutcome};
use crate::{PipelineSettings, PipelineStage, StoryParameters};
use fabula_core::{
    Character, ConversationContext, GenerateRequest, Role, Scene, ScenePrompt, Turn,
};
use fabula_error::{
    BuilderError, ExtractionError, ExtractionErrorKind, FabulaError, FabulaResult, PipelineError,
    PipelineErrorKind,
};
use fabula_interface::{CompletionDriver, ImageDriver, StoryDriver};
use fabula_retry::{
    CooldownRetry, ResilientAssetGenerator, ResilientCompletionClient, Sleeper, TokioSleeper,
};
use fabula_storage::RunStore;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Runs story → characters → scenes → images, threading one persistent
/// conversation through the stages.
///
/// The orchestrator owns the persistent [`ConversationContext`]. It starts
/// seeded with the base instruction and its acknowledgment and only ever
/// grows: each ingested character adds an instruction/acknowledgment pair
/// and each imagined scene adds a scene/reply pair. Character extraction,
/// scene extraction and per-character description requests use throwaway
/// contexts and never touch it.
///
/// Stages can be driven one at a time or all at once with
/// [`PipelineOrchestrator::run`]. Calling a stage out of order is an error.
pub struct PipelineOrchestrator<C, S, I, R> {
    completion: ResilientCompletionClient<C>,
    story_driver: S,
    story_retry: CooldownRetry,
    assets: ResilientAssetGenerator<I, R>,
    settings: PipelineSettings,
    story_parameters: StoryParameters,
    sleeper: Arc<dyn Sleeper>,
    stage: PipelineStage,
    context: ConversationContext,
    story: String,
    characters: Vec<Character>,
    scenes: Vec<Scene>,
    summary: String,
    replies: Vec<String>,
    outcomes: Vec<SceneOutcome>,
}

impl<C, S, I, R> PipelineOrchestrator<C, S, I, R>
where
    C: CompletionDriver,
    S: StoryDriver,
    I: ImageDriver,
    R: RunStore,
{
    /// Create an orchestrator.
    ///
    /// `retry` governs both the completion calls and the story request.
    pub fn new(
        completion: C,
        story_driver: S,
        assets: ResilientAssetGenerator<I, R>,
        retry: CooldownRetry,
    ) -> Self {
        Self {
            completion: ResilientCompletionClient::new(completion, retry.clone()),
            story_driver,
            story_retry: retry,
            assets,
            settings: PipelineSettings::default(),
            story_parameters: StoryParameters::default(),
            sleeper: Arc::new(TokioSleeper),
            stage: PipelineStage::Init,
            context: ConversationContext::seeded(
                prompts::BASE_INSTRUCTION,
                prompts::BASE_ACKNOWLEDGMENT,
            ),
            story: String::new(),
            characters: Vec::new(),
            scenes: Vec::new(),
            summary: String::new(),
            replies: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Replace the run settings.
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the story sampling parameters.
    pub fn with_story_parameters(mut self, parameters: StoryParameters) -> Self {
        self.story_parameters = parameters;
        self
    }

    /// Replace the sleeper used for the delay between scenes.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Last stage entered.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// The persistent conversation.
    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Generated story, empty before story generation.
    pub fn story(&self) -> &str {
        &self.story
    }

    /// Extracted characters.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Extracted scenes.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Run every stage in order.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> FabulaResult<PipelineReport> {
        info!("Starting storyboard pipeline");

        self.generate_story().await?;
        self.extract_characters().await?;
        self.ingest_characters().await?;
        self.extract_scenes().await?;
        self.consolidate_context().await?;
        self.imagine_scenes().await?;
        self.generate_images().await?;
        let history_path = self.persist().await?;

        let report = PipelineReport::new(
            self.story.clone(),
            self.characters.clone(),
            self.scenes.clone(),
            self.summary.clone(),
            self.outcomes.clone(),
            history_path,
        );

        info!(
            characters = report.characters().len(),
            scenes = report.scenes().len(),
            images = report.image_paths().len(),
            failed_scenes = report.failed_scenes(),
            "Pipeline complete"
        );
        Ok(report)
    }

    fn enter(&mut self, stage: PipelineStage) -> FabulaResult<()> {
        if stage.previous() != Some(self.stage) {
            let requires = stage.previous().unwrap_or(PipelineStage::Init);
            return Err(PipelineError::new(PipelineErrorKind::OutOfOrder {
                stage: stage.to_string(),
                requires: requires.to_string(),
            })
            .into());
        }
        debug!(from = %self.stage, to = %stage, "Entering stage");
        self.stage = stage;
        Ok(())
    }

    /// Ask the story provider for a story.
    ///
    /// Failures, including an empty story, are retried with the cooldown
    /// policy.
    #[instrument(skip(self), fields(provider = self.story_driver.provider_name()))]
    pub async fn generate_story(&mut self) -> FabulaResult<&str> {
        self.enter(PipelineStage::StoryGeneration)?;

        let mut builder = GenerateRequest::builder();
        builder
            .messages(vec![
                Turn::system(prompts::SYNOPSIS_FORMULA),
                Turn::assistant(prompts::SYNOPSIS_ACKNOWLEDGMENT),
                Turn::user(prompts::STORY_DIRECTIVE),
            ])
            .temperature(*self.story_parameters.temperature())
            .max_tokens(*self.story_parameters.max_tokens())
            .top_p(*self.story_parameters.top_p());
        if let Some(model) = self.story_parameters.model() {
            builder.model(model.clone());
        }
        let request = builder.build().map_err(BuilderError::from)?;

        let driver = &self.story_driver;
        let request = &request;
        let story = self
            .story_retry
            .run("story", move || async move {
                let story = driver.generate(request).await?;
                if story.trim().is_empty() {
                    return Err(PipelineError::new(PipelineErrorKind::EmptyStory).into());
                }
                Ok::<String, FabulaError>(story)
            })
            .await?;

        info!(story_len = story.len(), "Story generated");
        self.story = story;
        Ok(&self.story)
    }

    /// Extract the story's characters.
    #[instrument(skip(self))]
    pub async fn extract_characters(&mut self) -> FabulaResult<&[Character]> {
        self.enter(PipelineStage::CharacterExtraction)?;

        let context = ConversationContext::with_scoped([Turn::assistant(self.story.as_str())]);
        let characters = self
            .ask_structured("characters", prompts::CHARACTER_EXTRACTION, &context, |reply| {
                let characters: Vec<Character> = extract_as(reply)?;
                if characters.is_empty() {
                    return Err(PipelineError::new(PipelineErrorKind::NoCharacters).into());
                }
                Ok(characters)
            })
            .await?;

        info!(count = characters.len(), "Characters extracted");
        self.characters = characters;
        Ok(&self.characters)
    }

    /// Fold each character's visual description into the persistent context.
    ///
    /// Characters are processed in extraction order. For each one, a
    /// throwaway request asks for a `{name: visual prompt}` mapping; the
    /// prompt is wrapped in the feeding instruction, sent against the
    /// persistent context, and the instruction and acknowledgment are then
    /// appended.
    #[instrument(skip(self), fields(characters = self.characters.len()))]
    pub async fn ingest_characters(&mut self) -> FabulaResult<&ConversationContext> {
        self.enter(PipelineStage::CharacterIngestion)?;

        let mut ingested = Vec::with_capacity(self.characters.len());
        for character in &self.characters {
            let request = prompts::character_description_request(character);
            let name = character.name().as_str();

            let visual_prompt = self
                .ask_structured("character description", &request, &[], |reply| {
                    let mapping: Map<String, Value> = extract_as(reply)?;
                    lookup_visual_prompt(&mapping, name)
                })
                .await?;

            let instruction = prompts::feeding_instruction(name, &visual_prompt);
            let acknowledgment = self
                .completion
                .complete(&instruction, self.context.turns())
                .await?;

            self.context.append(Role::User, instruction);
            self.context.append(Role::Assistant, acknowledgment);

            info!(character = %name, visual_prompt = %visual_prompt, "Character ingested");
            ingested.push(character.clone().with_visual_prompt(visual_prompt));
        }

        self.characters = ingested;
        Ok(&self.context)
    }

    /// Select storyboard sentences from the story.
    #[instrument(skip(self))]
    pub async fn extract_scenes(&mut self) -> FabulaResult<&[Scene]> {
        self.enter(PipelineStage::SceneExtraction)?;

        let context = ConversationContext::with_scoped([Turn::assistant(self.story.as_str())]);
        let scenes = self
            .ask_structured("scenes", prompts::SCENE_EXTRACTION, &context, |reply| {
                let scenes: Vec<Scene> = extract_as(reply)?;
                let scenes: Vec<Scene> = scenes
                    .into_iter()
                    .filter(|scene| !scene.trim().is_empty())
                    .collect();
                if scenes.is_empty() {
                    return Err(PipelineError::new(PipelineErrorKind::NoScenes).into());
                }
                Ok(scenes)
            })
            .await?;

        info!(count = scenes.len(), "Scenes extracted");
        self.scenes = scenes;
        Ok(&self.scenes)
    }

    /// Summarize the persistent context. Reads it without appending.
    #[instrument(skip(self), fields(context_turns = self.context.len()))]
    pub async fn consolidate_context(&mut self) -> FabulaResult<&str> {
        self.enter(PipelineStage::ContextConsolidation)?;

        let summary = self
            .completion
            .complete(prompts::CONSOLIDATION, self.context.turns())
            .await?;

        info!(summary = %summary, "Context consolidated");
        self.summary = summary;
        Ok(&self.summary)
    }

    /// Ask for an image prompt for every scene, in order.
    ///
    /// Each call waits the inter-scene delay first. With consolidation
    /// enabled the only context is the summary plus the output format;
    /// otherwise the full persistent context is sent. Either way the scene
    /// and the reply are appended to the persistent context.
    #[instrument(skip(self), fields(scenes = self.scenes.len()))]
    pub async fn imagine_scenes(&mut self) -> FabulaResult<&[String]> {
        self.enter(PipelineStage::SceneImagination)?;

        let instructions = prompts::scene_instructions(&self.summary);
        let use_summary = *self.settings.use_consolidated_context();

        let mut replies = Vec::with_capacity(self.scenes.len());
        for (index, scene) in self.scenes.iter().enumerate() {
            self.sleeper.sleep(*self.settings.inter_scene_delay()).await;

            let context = if use_summary {
                ConversationContext::with_scoped([Turn::assistant(instructions.as_str())])
            } else {
                self.context.snapshot()
            };

            debug!(scene = index + 1, context_turns = context.len(), "Imagining scene");
            let reply = self.completion.complete(scene, &context).await?;

            self.context.append(Role::User, scene.as_str());
            self.context.append(Role::Assistant, reply.as_str());
            replies.push(reply);
        }

        info!(count = replies.len(), "Scenes imagined");
        self.replies = replies;
        Ok(&self.replies)
    }

    /// Generate and save images for every imagined scene.
    ///
    /// A reply without a usable prompt, or an image that fails after its
    /// retries, is recorded as failed and the next scene proceeds.
    #[instrument(skip(self), fields(replies = self.replies.len()))]
    pub async fn generate_images(&mut self) -> FabulaResult<&[SceneOutcome]> {
        self.enter(PipelineStage::ImageGeneration)?;

        let mut outcomes = Vec::with_capacity(self.replies.len());
        for (scene, reply) in self.scenes.iter().zip(&self.replies) {
            let prompt = match extract_as::<ScenePrompt>(reply) {
                Ok(prompt) => prompt.img_prompt().clone(),
                Err(e) => {
                    error!(scene = %scene, error = %e, "Scene reply has no usable image prompt");
                    outcomes.push(SceneOutcome::new(
                        scene.clone(),
                        reply.clone(),
                        None,
                        ImageStatus::MalformedPrompt(e.to_string()),
                    ));
                    continue;
                }
            };

            info!(img_prompt = %prompt, "Generating image");
            let status = match self.generate_and_save(&prompt).await {
                Ok(paths) => {
                    for path in &paths {
                        info!(path = %path.display(), "Generated image");
                    }
                    ImageStatus::Saved(paths)
                }
                Err(e) => {
                    error!(scene = %scene, error = %e, "Image generation failed");
                    ImageStatus::GenerationFailed(e.to_string())
                }
            };

            outcomes.push(SceneOutcome::new(
                scene.clone(),
                reply.clone(),
                Some(prompt),
                status,
            ));
        }

        self.outcomes = outcomes;
        Ok(&self.outcomes)
    }

    async fn generate_and_save(&self, prompt: &str) -> FabulaResult<Vec<PathBuf>> {
        let images = self
            .assets
            .generate(
                prompt,
                *self.settings.images_per_scene(),
                *self.settings.asset_max_retries(),
                *self.settings.asset_retry_delay(),
            )
            .await?;
        self.assets.save(&images).await
    }

    /// Write the persistent context to the run store.
    #[instrument(skip(self), fields(context_turns = self.context.len()))]
    pub async fn persist(&mut self) -> FabulaResult<PathBuf> {
        self.enter(PipelineStage::Persist)?;

        let path = self.assets.store().save_history(&self.context).await?;
        info!(path = %path.display(), "Conversation history saved");

        self.enter(PipelineStage::Done)?;
        Ok(path)
    }

    /// Ask for a structured answer, re-asking when the reply cannot be used.
    ///
    /// Completion failures are already retried by the completion client and
    /// propagate as-is. Parse or validation failures re-issue the identical
    /// request up to `max_extraction_attempts` times; the last failure is
    /// returned.
    async fn ask_structured<T, P>(
        &self,
        what: &str,
        prompt: &str,
        context: &[Turn],
        parse: P,
    ) -> FabulaResult<T>
    where
        P: Fn(&str) -> FabulaResult<T>,
    {
        let max_attempts = (*self.settings.max_extraction_attempts()).max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let reply = self.completion.complete(prompt, context).await?;

            match parse(&reply) {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts => {
                    warn!(what, attempt, max_attempts, error = %e, "Unusable reply, asking again");
                }
                Err(e) => {
                    error!(what, attempts = attempt, error = %e, "Giving up on structured reply");
                    return Err(e);
                }
            }
        }
    }
}

/// Find a character's visual prompt in a `{name: prompt}` mapping.
///
/// Tries the exact name, then a case-insensitive match, then the only
/// entry of a single-entry mapping.
pub(crate) fn lookup_visual_prompt(
    mapping: &Map<String, Value>,
    name: &str,
) -> FabulaResult<String> {
    let value = mapping
        .get(name)
        .or_else(|| {
            let trimmed = name.trim();
            mapping
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(trimmed))
                .map(|(_, value)| value)
        })
        .or_else(|| match mapping.len() {
            1 => mapping.values().next(),
            _ => None,
        })
        .ok_or_else(|| ExtractionError::new(ExtractionErrorKind::MissingKey(name.to_string())))?;

    match value {
        Value::String(prompt) if !prompt.trim().is_empty() => Ok(prompt.clone()),
        Value::String(_) | Value::Null => Err(ExtractionError::new(
            ExtractionErrorKind::UnexpectedShape {
                expected: "non-empty visual prompt".to_string(),
                found: describe(value).to_string(),
            },
        )
        .into()),
        other => Ok(other.to_string()),
    }
}
