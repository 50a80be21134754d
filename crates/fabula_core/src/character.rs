//! Story characters.

use serde::{Deserialize, Serialize};

/// A character extracted from the story.
///
/// Extraction fills `name` and `description`; ingestion adds the visual
/// prompt once, after which the character is only read.
///
/// # Examples
///
/// ```
/// use fabula_core::Character;
///
/// let eira = Character::new("Eira", "young determined adventurer");
/// assert!(eira.visual_prompt().is_none());
///
/// let eira = eira.with_visual_prompt("Auburn braid, green cloak");
/// assert_eq!(eira.visual_prompt().as_deref(), Some("Auburn braid, green cloak"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Character {
    /// Character name as written in the story
    name: String,
    /// Short description of the character
    #[serde(default)]
    description: String,
    /// Image-generation description, populated during ingestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visual_prompt: Option<String>,
}

impl Character {
    /// Create a character without a visual prompt.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            visual_prompt: None,
        }
    }

    /// Return the character enriched with its visual prompt.
    pub fn with_visual_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.visual_prompt = Some(prompt.into());
        self
    }
}
