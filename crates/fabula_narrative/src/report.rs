//! Results of a pipeline run.

use derive_getters::Getters;
use fabula_core::{Character, Scene};
use std::path::PathBuf;

/// What happened to one scene after imagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Images were generated and written to these paths
    Saved(Vec<PathBuf>),
    /// The imagination reply held no usable image prompt
    MalformedPrompt(String),
    /// Image generation failed after its retries
    GenerationFailed(String),
}

impl ImageStatus {
    /// True when at least one image was saved.
    pub fn is_saved(&self) -> bool {
        matches!(self, ImageStatus::Saved(_))
    }
}

/// Per-scene record, in scene order.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SceneOutcome {
    /// The verbatim scene sentence
    scene: Scene,
    /// Raw imagination reply
    reply: String,
    /// Image prompt read from the reply, when it parsed
    img_prompt: Option<String>,
    /// Image generation result
    status: ImageStatus,
}

impl SceneOutcome {
    pub(crate) fn new(
        scene: Scene,
        reply: String,
        img_prompt: Option<String>,
        status: ImageStatus,
    ) -> Self {
        Self {
            scene,
            reply,
            img_prompt,
            status,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PipelineReport {
    /// Generated story
    story: String,
    /// Characters with their visual prompts
    characters: Vec<Character>,
    /// Extracted scenes
    scenes: Vec<Scene>,
    /// Consolidated instructions
    summary: String,
    /// One outcome per scene
    outcomes: Vec<SceneOutcome>,
    /// Where the conversation history was written
    history_path: PathBuf,
}

impl PipelineReport {
    pub(crate) fn new(
        story: String,
        characters: Vec<Character>,
        scenes: Vec<Scene>,
        summary: String,
        outcomes: Vec<SceneOutcome>,
        history_path: PathBuf,
    ) -> Self {
        Self {
            story,
            characters,
            scenes,
            summary,
            outcomes,
            history_path,
        }
    }

    /// Paths of every saved image, in scene order.
    pub fn image_paths(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome.status() {
                ImageStatus::Saved(paths) => Some(paths),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Number of scenes whose image could not be produced.
    pub fn failed_scenes(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.status().is_saved())
            .count()
    }
}
