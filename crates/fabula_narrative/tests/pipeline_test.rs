//! End-to-end tests for the pipeline orchestrator with in-process drivers.

use async_trait::async_trait;
use fabula_core::{GenerateRequest, ImageRequest, Role, Turn};
use fabula_error::{FabulaErrorKind, FabulaResult, HttpError, PipelineErrorKind};
use fabula_interface::{CompletionDriver, ImageDriver, StoryDriver};
use fabula_narrative::{
    ImageStatus, PipelineOrchestrator, PipelineSettings, PipelineStage, StoryParameters, prompts,
};
use fabula_retry::{CooldownRetry, RecordingSleeper, ResilientAssetGenerator};
use fabula_storage::{FileSystemStorage, MemoryStorage, RunStore};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const STORY: &str = "Eira, a young adventurer, was stranded in a mystical forest. \
Orin the old guide found her by the river. A storm broke over the ancient Tree of Wisdom.";

#[derive(Debug, Clone)]
struct Call {
    prompt: String,
    history: Vec<Turn>,
}

/// Completion driver answering by prompt, with optional per-prefix
/// overrides consumed in order.
#[derive(Clone)]
struct ScriptedCompletion {
    characters: Vec<(&'static str, &'static str, &'static str)>,
    scenes: Vec<&'static str>,
    overrides: Arc<Mutex<HashMap<&'static str, VecDeque<String>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedCompletion {
    fn new() -> Self {
        Self {
            characters: vec![("Eira", "young determined adventurer", "auburn braid, green cloak")],
            scenes: vec![
                "Eira, a young adventurer, was stranded in a mystical forest.",
                "A storm broke over the ancient Tree of Wisdom.",
            ],
            overrides: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_characters(mut self, characters: Vec<(&'static str, &'static str, &'static str)>) -> Self {
        self.characters = characters;
        self
    }

    fn with_scenes(mut self, scenes: Vec<&'static str>) -> Self {
        self.scenes = scenes;
        self
    }

    fn override_replies(self, prefix: &'static str, replies: &[&str]) -> Self {
        self.overrides
            .lock()
            .unwrap()
            .insert(prefix, replies.iter().map(|r| r.to_string()).collect());
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_starting_with(&self, prefix: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.prompt.starts_with(prefix))
            .collect()
    }

    fn default_reply(&self, prompt: &str) -> String {
        if prompt == prompts::CHARACTER_EXTRACTION {
            let items: Vec<String> = self
                .characters
                .iter()
                .map(|(name, description, _)| {
                    format!("{{'name': '{}', 'description': '{}'}}", name, description)
                })
                .collect();
            return format!("```json\n[{}]\n```", items.join(", "));
        }
        if let Some(rest) = prompt.strip_prefix("Character name: ") {
            for (name, _, visual) in &self.characters {
                if rest.starts_with(name) {
                    return format!("```json\n{{'{}': '{}'}}\n```", name, visual);
                }
            }
        }
        if prompt.starts_with("In any scene where") {
            return "Understood, I will include those details.".to_string();
        }
        if prompt == prompts::SCENE_EXTRACTION {
            let items: Vec<String> = self.scenes.iter().map(|s| format!("\"{}\"", s)).collect();
            return format!("[{}]", items.join(", "));
        }
        if prompt == prompts::CONSOLIDATION {
            return "Summary: Eira has an auburn braid and a green cloak.".to_string();
        }
        format!("```json\n{{\"imgprompt\": \"Illustration of: {}\"}}\n```", prompt)
    }
}

#[async_trait]
impl CompletionDriver for ScriptedCompletion {
    async fn complete(&self, prompt: &str, history: &[Turn]) -> FabulaResult<String> {
        self.calls.lock().unwrap().push(Call {
            prompt: prompt.to_string(),
            history: history.to_vec(),
        });

        let overridden = {
            let mut overrides = self.overrides.lock().unwrap();
            overrides
                .iter_mut()
                .find(|(prefix, _)| prompt.starts_with(**prefix))
                .and_then(|(_, queue)| queue.pop_front())
        };

        Ok(overridden.unwrap_or_else(|| self.default_reply(prompt)))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Story driver returning queued stories, recording requests.
#[derive(Clone)]
struct ScriptedStory {
    stories: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl ScriptedStory {
    fn new(stories: &[&str]) -> Self {
        Self {
            stories: Arc::new(Mutex::new(stories.iter().map(|s| s.to_string()).collect())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl StoryDriver for ScriptedStory {
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<String> {
        self.requests.lock().unwrap().push(req.clone());
        Ok(self
            .stories
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| STORY.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "scripted-story"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Image driver failing for prompts that mention a keyword.
#[derive(Clone)]
struct ScriptedImages {
    fail_on: Option<&'static str>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl ScriptedImages {
    fn new() -> Self {
        Self {
            fail_on: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing_on(keyword: &'static str) -> Self {
        Self {
            fail_on: Some(keyword),
            ..Self::new()
        }
    }
}

#[async_trait]
impl ImageDriver for ScriptedImages {
    async fn fetch(&self, req: &ImageRequest) -> FabulaResult<Vec<u8>> {
        self.requests.lock().unwrap().push(req.clone());
        if let Some(keyword) = self.fail_on {
            if req.prompt().contains(keyword) {
                Err(HttpError::with_status(500, "renderer crashed"))?
            }
        }
        Ok(format!("png:{}", req.prompt()).into_bytes())
    }

    fn provider_name(&self) -> &'static str {
        "scripted-images"
    }
}

fn fast_settings() -> PipelineSettings {
    PipelineSettings::builder()
        .inter_scene_delay(Duration::from_secs(5))
        .asset_max_retries(2u32)
        .asset_retry_delay(Duration::ZERO)
        .build()
        .unwrap()
}

struct Harness<R> {
    orchestrator: PipelineOrchestrator<ScriptedCompletion, ScriptedStory, ScriptedImages, R>,
    completion: ScriptedCompletion,
    story: ScriptedStory,
    images: ScriptedImages,
    sleeper: RecordingSleeper,
    retry_sleeper: RecordingSleeper,
}

fn harness_with<R: RunStore>(
    completion: ScriptedCompletion,
    story: ScriptedStory,
    images: ScriptedImages,
    store: R,
    settings: PipelineSettings,
) -> Harness<R> {
    let sleeper = RecordingSleeper::new();
    let retry_sleeper = RecordingSleeper::new();
    let retry = CooldownRetry::new(Duration::from_secs(15))
        .with_sleeper(Arc::new(retry_sleeper.clone()));
    let assets = ResilientAssetGenerator::new(images.clone(), store, "9:16", "flux-disney");

    let orchestrator = PipelineOrchestrator::new(completion.clone(), story.clone(), assets, retry)
        .with_settings(settings)
        .with_sleeper(Arc::new(sleeper.clone()));

    Harness {
        orchestrator,
        completion,
        story,
        images,
        sleeper,
        retry_sleeper,
    }
}

fn harness(completion: ScriptedCompletion) -> Harness<MemoryStorage> {
    harness_with(
        completion,
        ScriptedStory::new(&[]),
        ScriptedImages::new(),
        MemoryStorage::new(),
        fast_settings(),
    )
}

#[tokio::test]
async fn test_eira_end_to_end() {
    let store = MemoryStorage::new();
    let mut h = harness_with(
        ScriptedCompletion::new(),
        ScriptedStory::new(&[]),
        ScriptedImages::new(),
        store.clone(),
        fast_settings(),
    );

    let report = h.orchestrator.run().await.unwrap();

    assert_eq!(report.story(), STORY);
    assert_eq!(report.characters().len(), 1);
    assert_eq!(report.characters()[0].name(), "Eira");
    assert_eq!(
        report.characters()[0].visual_prompt().as_deref(),
        Some("auburn braid, green cloak")
    );
    assert_eq!(report.scenes().len(), 2);
    assert_eq!(report.failed_scenes(), 0);

    let paths: Vec<String> = report
        .image_paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    assert_eq!(paths, vec!["images_of_scene1.png", "images_of_scene2.png"]);
    assert_eq!(
        store.images()[0],
        format!(
            "png:Illustration of: {}",
            "Eira, a young adventurer, was stranded in a mystical forest."
        )
        .into_bytes()
    );

    // Seed, one ingested character, two imagined scenes
    let context = h.orchestrator.context();
    assert_eq!(context.len(), 2 + 2 + 4);
    assert_eq!(
        context.turns()[2],
        Turn::user(prompts::feeding_instruction("Eira", "auburn braid, green cloak"))
    );
    assert_eq!(h.orchestrator.stage(), PipelineStage::Done);

    let history: serde_json::Value = serde_json::from_slice(&store.history().unwrap()).unwrap();
    assert_eq!(history.as_array().unwrap().len(), 8);
    assert_eq!(history[0]["role"], "user");
    assert_eq!(history[1]["content"], "Yes.");
}

#[tokio::test]
async fn test_story_request_uses_three_turn_seed() {
    let mut h = harness(ScriptedCompletion::new());
    h.orchestrator.generate_story().await.unwrap();

    let requests = h.story.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    let roles: Vec<Role> = request.messages().iter().map(|t| *t.role()).collect();
    assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
    assert_eq!(request.messages()[0].content(), prompts::SYNOPSIS_FORMULA);
    assert_eq!(*request.temperature(), Some(1.0));
    assert_eq!(*request.max_tokens(), Some(1024));
    assert_eq!(*request.top_p(), Some(1.0));
    assert!(request.model().is_none());
}

#[tokio::test]
async fn test_story_model_override() {
    let mut h = harness(ScriptedCompletion::new());
    h.orchestrator = h
        .orchestrator
        .with_story_parameters(StoryParameters::new(0.7, 512, 0.9).with_model("llama-3.1-8b"));
    h.orchestrator.generate_story().await.unwrap();

    let request = h.story.requests.lock().unwrap()[0].clone();
    assert_eq!(request.model().as_deref(), Some("llama-3.1-8b"));
    assert_eq!(*request.max_tokens(), Some(512));
}

#[tokio::test]
async fn test_empty_story_is_retried_after_cooldown() {
    let mut h = harness_with(
        ScriptedCompletion::new(),
        ScriptedStory::new(&["   ", STORY]),
        ScriptedImages::new(),
        MemoryStorage::new(),
        fast_settings(),
    );

    let story = h.orchestrator.generate_story().await.unwrap().to_string();

    assert_eq!(story, STORY);
    assert_eq!(h.story.requests.lock().unwrap().len(), 2);
    assert_eq!(h.retry_sleeper.waits(), vec![Duration::from_secs(15)]);
}

#[tokio::test]
async fn test_ingestion_order_and_context_growth() {
    let completion = ScriptedCompletion::new().with_characters(vec![
        ("Eira", "young determined adventurer", "auburn braid"),
        ("Orin", "old forest guide", "grey beard"),
    ]);
    let mut h = harness(completion);

    h.orchestrator.generate_story().await.unwrap();
    h.orchestrator.extract_characters().await.unwrap();
    h.orchestrator.ingest_characters().await.unwrap();

    let turns = h.orchestrator.context().turns().to_vec();
    assert_eq!(turns.len(), 6);
    assert_eq!(turns[0], Turn::user(prompts::BASE_INSTRUCTION));
    assert_eq!(turns[1], Turn::assistant("Yes."));
    assert_eq!(turns[2], Turn::user(prompts::feeding_instruction("Eira", "auburn braid")));
    assert_eq!(*turns[3].role(), Role::Assistant);
    assert_eq!(turns[4], Turn::user(prompts::feeding_instruction("Orin", "grey beard")));
    assert_eq!(*turns[5].role(), Role::Assistant);

    // Each feeding call saw the persistent context as it stood before the append
    let feeding = h.completion.calls_starting_with("In any scene where");
    assert_eq!(feeding.len(), 2);
    assert_eq!(feeding[0].history, turns[..2].to_vec());
    assert_eq!(feeding[1].history, turns[..4].to_vec());
}

#[tokio::test]
async fn test_ephemeral_calls_use_scoped_contexts() {
    let mut h = harness(ScriptedCompletion::new());

    h.orchestrator.generate_story().await.unwrap();
    h.orchestrator.extract_characters().await.unwrap();
    h.orchestrator.ingest_characters().await.unwrap();
    h.orchestrator.extract_scenes().await.unwrap();

    let story_only = vec![Turn::assistant(STORY)];

    let extraction = h.completion.calls_starting_with(prompts::CHARACTER_EXTRACTION);
    assert_eq!(extraction[0].history, story_only);

    let description = h.completion.calls_starting_with("Character name: Eira");
    assert!(description[0].history.is_empty());

    let scenes = h.completion.calls_starting_with(prompts::SCENE_EXTRACTION);
    assert_eq!(scenes[0].history, story_only);

    // Only ingestion touched the persistent context
    assert_eq!(h.orchestrator.context().len(), 4);
}

#[tokio::test]
async fn test_consolidation_reads_without_appending() {
    let mut h = harness(ScriptedCompletion::new());

    h.orchestrator.generate_story().await.unwrap();
    h.orchestrator.extract_characters().await.unwrap();
    h.orchestrator.ingest_characters().await.unwrap();
    h.orchestrator.extract_scenes().await.unwrap();
    let before = h.orchestrator.context().snapshot();

    let summary = h.orchestrator.consolidate_context().await.unwrap().to_string();

    assert!(summary.starts_with("Summary:"));
    assert_eq!(h.orchestrator.context().snapshot(), before);
    let call = &h.completion.calls_starting_with(prompts::CONSOLIDATION)[0];
    assert_eq!(call.history, before);
}

#[tokio::test]
async fn test_scene_imagination_against_summary() {
    let completion = ScriptedCompletion::new().with_scenes(vec![
        "Eira walked into the mist.",
        "Orin lit a lantern.",
        "The storm broke.",
    ]);
    let mut h = harness(completion);

    let report = h.orchestrator.run().await.unwrap();

    // One reply, one prompt and one outcome per scene, in order
    let outcome_scenes: Vec<&str> = report.outcomes().iter().map(|o| o.scene().as_str()).collect();
    assert_eq!(
        outcome_scenes,
        vec!["Eira walked into the mist.", "Orin lit a lantern.", "The storm broke."]
    );
    assert_eq!(
        report.outcomes()[1].img_prompt().as_deref(),
        Some("Illustration of: Orin lit a lantern.")
    );

    let summary_context = vec![Turn::assistant(prompts::scene_instructions(report.summary()))];
    for scene in report.scenes() {
        let call = &h.completion.calls_starting_with(scene)[0];
        assert_eq!(call.history, summary_context);
    }

    // Scenes and replies still land in the persistent context
    let turns = h.orchestrator.context().turns();
    assert_eq!(turns.len(), 4 + 6);
    assert_eq!(turns[4], Turn::user("Eira walked into the mist."));
}

#[tokio::test]
async fn test_scene_imagination_against_persistent_context() {
    let settings = PipelineSettings::builder()
        .use_consolidated_context(false)
        .inter_scene_delay(Duration::ZERO)
        .build()
        .unwrap();
    let mut h = harness_with(
        ScriptedCompletion::new(),
        ScriptedStory::new(&[]),
        ScriptedImages::new(),
        MemoryStorage::new(),
        settings,
    );

    let report = h.orchestrator.run().await.unwrap();

    let first = &h.completion.calls_starting_with(&report.scenes()[0])[0];
    let second = &h.completion.calls_starting_with(&report.scenes()[1])[0];
    assert_eq!(first.history.len(), 4);
    assert_eq!(second.history.len(), 6);
    assert_eq!(second.history[4], Turn::user(report.scenes()[0].as_str()));
}

#[tokio::test]
async fn test_delay_before_each_scene() {
    let mut h = harness(ScriptedCompletion::new());

    h.orchestrator.run().await.unwrap();

    assert_eq!(h.sleeper.waits(), vec![Duration::from_secs(5); 2]);
    assert!(h.retry_sleeper.waits().is_empty());
}

#[tokio::test]
async fn test_image_failure_does_not_stop_run() {
    let store = MemoryStorage::new();
    let mut h = harness_with(
        ScriptedCompletion::new(),
        ScriptedStory::new(&[]),
        ScriptedImages::failing_on("storm"),
        store.clone(),
        fast_settings(),
    );

    let report = h.orchestrator.run().await.unwrap();

    assert_eq!(report.failed_scenes(), 1);
    assert!(report.outcomes()[0].status().is_saved());
    match report.outcomes()[1].status() {
        ImageStatus::GenerationFailed(message) => assert!(message.contains("2 attempts")),
        other => panic!("unexpected status: {:?}", other),
    }
    // Two attempts for the failing image, one for the other
    assert_eq!(h.images.requests.lock().unwrap().len(), 3);
    assert_eq!(store.images().len(), 1);
    assert!(store.history().is_some());
}

#[tokio::test]
async fn test_malformed_scene_reply_is_recorded() {
    let completion = ScriptedCompletion::new()
        .override_replies("A storm broke", &["Sorry, I cannot draw storms."]);
    let mut h = harness(completion);

    let report = h.orchestrator.run().await.unwrap();

    assert!(report.outcomes()[0].status().is_saved());
    assert!(matches!(
        report.outcomes()[1].status(),
        ImageStatus::MalformedPrompt(_)
    ));
    assert!(report.outcomes()[1].img_prompt().is_none());
    assert_eq!(h.images.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_character_list_is_asked_again() {
    let completion = ScriptedCompletion::new()
        .override_replies(prompts::CHARACTER_EXTRACTION, &["The characters are Eira and Orin."]);
    let mut h = harness(completion);

    h.orchestrator.generate_story().await.unwrap();
    let characters = h.orchestrator.extract_characters().await.unwrap().to_vec();

    assert_eq!(characters.len(), 1);
    assert_eq!(
        h.completion
            .calls_starting_with(prompts::CHARACTER_EXTRACTION)
            .len(),
        2
    );
}

#[tokio::test]
async fn test_malformed_character_list_aborts_after_attempts() {
    let completion = ScriptedCompletion::new().override_replies(
        prompts::CHARACTER_EXTRACTION,
        &["no", "still no", "nope", "unused"],
    );
    let mut h = harness(completion);

    let err = h.orchestrator.run().await.unwrap_err();

    assert!(err.is_extraction());
    assert_eq!(
        h.completion
            .calls_starting_with(prompts::CHARACTER_EXTRACTION)
            .len(),
        3
    );
    assert_eq!(h.orchestrator.stage(), PipelineStage::CharacterExtraction);
}

#[tokio::test]
async fn test_empty_scene_list_aborts() {
    let completion = ScriptedCompletion::new().with_scenes(vec![]);
    let mut h = harness(completion);

    let err = h.orchestrator.run().await.unwrap_err();

    match err.kind() {
        FabulaErrorKind::Pipeline(e) => assert_eq!(e.kind, PipelineErrorKind::NoScenes),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_character_description_key_mismatch_is_asked_again() {
    let completion = ScriptedCompletion::new().override_replies(
        "Character name: Eira",
        &["```json\n{'Orin': 'x', 'Lira': 'y'}\n```"],
    );
    let mut h = harness(completion);

    h.orchestrator.generate_story().await.unwrap();
    h.orchestrator.extract_characters().await.unwrap();
    h.orchestrator.ingest_characters().await.unwrap();

    assert_eq!(h.completion.calls_starting_with("Character name: Eira").len(), 2);
    assert_eq!(
        h.orchestrator.characters()[0].visual_prompt().as_deref(),
        Some("auburn braid, green cloak")
    );
}

#[tokio::test]
async fn test_stage_out_of_order_is_rejected() {
    let mut h = harness(ScriptedCompletion::new());

    let err = h.orchestrator.extract_scenes().await.unwrap_err();

    match err.kind() {
        FabulaErrorKind::Pipeline(e) => assert!(matches!(
            &e.kind,
            PipelineErrorKind::OutOfOrder { stage, requires }
                if stage == "scene_extraction" && requires == "character_ingestion"
        )),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(h.completion.calls().is_empty());
    assert_eq!(h.orchestrator.stage(), PipelineStage::Init);
}

#[tokio::test]
async fn test_run_writes_files_to_output_directory() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
    let mut h = harness_with(
        ScriptedCompletion::new(),
        ScriptedStory::new(&[]),
        ScriptedImages::new(),
        storage,
        fast_settings(),
    );

    let report = h.orchestrator.run().await.unwrap();

    assert_eq!(report.history_path(), &temp_dir.path().join("history.json"));
    assert!(temp_dir.path().join("images_of_scene1.png").is_file());
    assert!(temp_dir.path().join("images_of_scene2.png").is_file());

    let restored: fabula_core::ConversationContext =
        serde_json::from_str(&std::fs::read_to_string(report.history_path()).unwrap()).unwrap();
    assert_eq!(&restored, h.orchestrator.context());
}

#[test]
fn test_stage_sequence() {
    let mut stage = PipelineStage::Init;
    let mut seen = vec![stage];
    while let Some(next) = stage.next() {
        seen.push(next);
        stage = next;
    }
    assert_eq!(seen.len(), 10);
    assert_eq!(seen.last(), Some(&PipelineStage::Done));
    assert_eq!(PipelineStage::SceneImagination.previous(), Some(PipelineStage::ContextConsolidation));
    assert_eq!(PipelineStage::Init.previous(), None);
}
