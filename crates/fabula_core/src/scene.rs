//! Scenes and their image prompts.

use serde::{Deserialize, Serialize};

/// One verbatim sentence of the story chosen as a storyboard frame.
pub type Scene = String;

/// Structured result of imagining a scene.
///
/// Models spell the key inconsistently; all of `imgprompt`, `imgPrompt`
/// and `img_prompt` are accepted.
///
/// # Examples
///
/// ```
/// use fabula_core::ScenePrompt;
///
/// let prompt: ScenePrompt =
///     serde_json::from_str(r#"{"imgPrompt": "Eira in a misty forest"}"#).unwrap();
/// assert_eq!(prompt.img_prompt(), "Eira in a misty forest");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ScenePrompt {
    /// Prompt text sent to the image provider
    #[serde(rename = "imgprompt", alias = "imgPrompt", alias = "img_prompt")]
    img_prompt: String,
}

impl ScenePrompt {
    /// Wrap a prompt string.
    pub fn new(img_prompt: impl Into<String>) -> Self {
        Self {
            img_prompt: img_prompt.into(),
        }
    }
}
