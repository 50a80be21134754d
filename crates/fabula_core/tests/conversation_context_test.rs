//! Tests for the append-only conversation context.

use fabula_core::{Character, ConversationContext, Role, ScenePrompt, Turn};

#[test]
fn test_append_grows_by_exactly_one_turn() {
    let mut context = ConversationContext::new();

    for i in 0..5 {
        let before = context.snapshot().len();
        context.append(Role::User, format!("turn {}", i));
        assert_eq!(context.snapshot().len(), before + 1);
    }
}

#[test]
fn test_append_never_alters_prior_turns() {
    let mut context = ConversationContext::seeded("Base instruction", "Yes.");
    let before = context.snapshot();

    context.append(Role::User, "In any scene where Eira's name appears...");
    context.append(Role::Assistant, "Understood.");

    let after = context.snapshot();
    assert_eq!(after.len(), before.len() + 2);
    assert_eq!(&after[..before.len()], before.as_slice());
}

#[test]
fn test_seeded_context_order() {
    let context = ConversationContext::seeded("Base instruction", "Yes.");

    assert_eq!(context.turns()[0], Turn::user("Base instruction"));
    assert_eq!(context.turns()[1], Turn::assistant("Yes."));
    assert_eq!(context.last().map(|t| *t.role()), Some(Role::Assistant));
}

#[test]
fn test_scoped_context_is_isolated() {
    let mut context = ConversationContext::seeded("Base instruction", "Yes.");

    let scoped = ConversationContext::with_scoped([Turn::assistant("Once upon a time")]);
    assert_eq!(scoped, vec![Turn::assistant("Once upon a time")]);

    // Building a scoped context leaves the persistent one untouched
    assert_eq!(context.len(), 2);

    // And later appends do not leak into an earlier scoped list
    context.append(Role::User, "more");
    assert_eq!(scoped.len(), 1);
}

#[test]
fn test_snapshot_is_detached_copy() {
    let mut context = ConversationContext::new();
    context.append(Role::User, "first");

    let snapshot = context.snapshot();
    context.append(Role::Assistant, "second");

    assert_eq!(snapshot.len(), 1);
    assert_eq!(context.len(), 2);
}

#[test]
fn test_context_serializes_as_role_content_array() {
    let context = ConversationContext::seeded("Base instruction", "Yes.");

    let json = serde_json::to_value(&context).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!([
            {"role": "user", "content": "Base instruction"},
            {"role": "assistant", "content": "Yes."}
        ])
    );

    let restored: ConversationContext = serde_json::from_value(json).expect("deserialize");
    assert_eq!(restored, context);
}

#[test]
fn test_character_deserializes_without_visual_prompt() {
    let character: Character =
        serde_json::from_str(r#"{"name": "Eira", "description": "brave young explorer"}"#)
            .expect("deserialize");

    assert_eq!(character.name(), "Eira");
    assert!(character.visual_prompt().is_none());
}

#[test]
fn test_scene_prompt_accepts_key_spellings() {
    for key in ["imgprompt", "imgPrompt", "img_prompt"] {
        let json = format!(r#"{{"{}": "Eira in the forest"}}"#, key);
        let prompt: ScenePrompt = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(prompt.img_prompt(), "Eira in the forest");
    }
}
