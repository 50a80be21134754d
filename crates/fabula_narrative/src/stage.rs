//! Pipeline stages.

use strum::IntoEnumIterator;

/// Fixed stages of a run, in execution order.
///
/// A run moves through every stage exactly once; there is no branching
/// and no re-entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    /// Nothing has run yet
    Init,
    /// Writing the story
    StoryGeneration,
    /// Listing the story's characters
    CharacterExtraction,
    /// Folding each character's visual description into the context
    CharacterIngestion,
    /// Selecting storyboard sentences
    SceneExtraction,
    /// Summarizing the persistent context
    ContextConsolidation,
    /// Turning each scene into an image prompt
    SceneImagination,
    /// Generating and saving one image per scene prompt
    ImageGeneration,
    /// Writing the conversation history
    Persist,
    /// Run finished
    Done,
}

impl PipelineStage {
    /// The stage that follows this one, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_narrative::PipelineStage;
    ///
    /// assert_eq!(PipelineStage::Init.next(), Some(PipelineStage::StoryGeneration));
    /// assert_eq!(PipelineStage::Done.next(), None);
    /// ```
    pub fn next(self) -> Option<Self> {
        Self::iter().skip_while(|stage| *stage != self).nth(1)
    }

    /// The stage that must have completed before this one, if any.
    pub fn previous(self) -> Option<Self> {
        Self::iter().take_while(|stage| *stage != self).last()
    }
}
