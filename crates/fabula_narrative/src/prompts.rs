//! Fixed prompt text driving each pipeline stage.

use fabula_core::Character;

/// Instruction that opens the persistent conversation.
pub const BASE_INSTRUCTION: &str = r#"I am assigning you a task and guiding you on how to work on it.
We are creating an animated short video, and you need to help us generate prompts for the scenes. These prompts will be sent to a text-to-image model to generate the images. I will give you the entire story (the script) and you will analyze it, focusing on the main characters.
For each character I will give you a description of their facial features, body, face shape, hair, figure, age, skin tone and clothes. Each character's facial features, age and clothing are different from the others.
After the characters, I will send you the scenes of the script one at a time. For each scene you will generate an image prompt based on the whole story.
Use the environment of the story to adjust the prompt. For a survival story, add keywords such as "Cinematic, Shot of, Wide shot" to express the scene. For a cartoon, use something like "3D Pixar cartoon style".
Prompts must be in English and no longer than 4 lines.

Example:
input = "A young adventurer named Eira found herself stranded in a mystical forest to find the ancient Tree of Wisdom,"
answer = "```json
{
    "imgprompt": "A young, determined adventurer named Eira stands at the edge of a mystical forest. Towering, gnarled trees with luminescent leaves create an otherworldly glow. Mist swirls around her feet, and in the distance a massive ancient tree with a shimmering aura can be seen: the Tree of Wisdom. Her expression mixes awe and determination. Ethereal atmosphere, deep greens, purples and soft golden light."
}
```"

Important: do not provide any explanation or context in the prompt.
Are you ready? If yes, say "Yes.""#;

/// Acknowledgment recorded after [`BASE_INSTRUCTION`].
pub const BASE_ACKNOWLEDGMENT: &str = "Yes.";

/// System turn of the story request: the synopsis formula.
pub const SYNOPSIS_FORMULA: &str = "I will provide you a formula to generate a unique story.\nFormula for the synopsis: {Character} {Situation} in a {setting} to achieve {goal}, facing {obstacle}, with the help of {allies}, leading to a {climax}, and discovering that {moral}.\nUse it to generate a synopsis. Don't provide any explanation.";

/// Assistant turn of the story request.
pub const SYNOPSIS_ACKNOWLEDGMENT: &str =
    "Ok, the synopsis is generated on my end. What do I need to do next?";

/// User turn of the story request.
pub const STORY_DIRECTIVE: &str =
    "Use that generated synopsis to create a story. Don't provide any explanation.";

/// Asks for the story's characters as `[{name, description}]`.
pub const CHARACTER_EXTRACTION: &str = "Your task is to extract the characters from the story you provided. OUTPUT: [{'name': 'character_name', 'description': 'character short description in 3 to 4 words only'}]";

/// Asks for a character's image-generation description as `{name: prompt}`.
pub const CHARACTER_DESCRIPTION: &str = "Write me a prompt for this character to generate it with an AI text-to-image generator. Include facial details, character style, what they are wearing, their hair, and everything else. Don't start with phrases like 'Create a' or 'Imagine a'. OUTPUT RESPONSE MUST BE JSON like:\n{(character name): (character image prompt)}";

/// Asks for storyboard-worthy sentences, verbatim, as a flat list.
pub const SCENE_EXTRACTION: &str = r#"Your task is to provide all scenes from the storytelling perspective. Analyze the whole story and pick only the sentences that help create storyboard images for it. Extract single lines from the story that describe a situation; don't rephrase them. OUTPUT RESPONSE MUST BE JSON like: ["scene1", "scene2", "scene3"]"#;

/// Asks the model to summarize every instruction given so far.
pub const CONSOLIDATION: &str = "Extract all instructions, including context and character prompts, in the most accurate and exact way possible and summarize them.";

/// Output format appended to the summary for scene imagination.
pub const IMAGE_PROMPT_FORMAT: &str = r#"
OUTPUT RESPONSE MUST BE A JSON:
like:
```json
{"imgprompt":"image prompt is here"}
```
"#;

/// Request for the visual description of one extracted character.
pub fn character_description_request(character: &Character) -> String {
    format!(
        "Character name: {} \n Key features: {} {}",
        character.name(),
        character.description(),
        CHARACTER_DESCRIPTION
    )
}

/// Instruction folding a character's visual description into the context.
///
/// # Examples
///
/// ```
/// use fabula_narrative::prompts::feeding_instruction;
///
/// assert_eq!(
///     feeding_instruction("Eira", "auburn braid"),
///     "In any scene where Eira's name appears, you will add these details to the prompt:auburn braid"
/// );
/// ```
pub fn feeding_instruction(name: &str, visual_prompt: &str) -> String {
    format!(
        "In any scene where {}'s name appears, you will add these details to the prompt:{}",
        name, visual_prompt
    )
}

/// Instructions given as the only context when imagining a scene from the summary.
pub fn scene_instructions(summary: &str) -> String {
    format!("{}{}", summary, IMAGE_PROMPT_FORMAT)
}
