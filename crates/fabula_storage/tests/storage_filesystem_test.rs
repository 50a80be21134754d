//! Tests for filesystem and in-memory run storage.

use fabula_core::{ConversationContext, Role};
use fabula_storage::{FileSystemStorage, MemoryStorage, RunStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_images_are_numbered_from_one() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let first = storage.save_image(b"first").await.unwrap();
    let second = storage.save_image(b"second").await.unwrap();

    assert_eq!(first, temp_dir.path().join("images_of_scene1.png"));
    assert_eq!(second, temp_dir.path().join("images_of_scene2.png"));
    assert_eq!(std::fs::read(&first).unwrap(), b"first");
    assert_eq!(std::fs::read(&second).unwrap(), b"second");
}

#[tokio::test]
async fn test_payloads_written_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    // Not a valid PNG; storage must not care
    let payload = vec![0u8, 159, 146, 150, 255];
    let path = storage.save_image(&payload).await.unwrap();

    assert_eq!(std::fs::read(path).unwrap(), payload);
}

#[tokio::test]
async fn test_no_temp_files_left_behind() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    storage.save_image(b"data").await.unwrap();
    storage
        .save_history(&ConversationContext::seeded("Base", "Yes."))
        .await
        .unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_history_is_indented_role_content_array() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let mut context = ConversationContext::seeded("Base instruction", "Yes.");
    context.append(Role::User, "Scene 1");

    let path = storage.save_history(&context).await.unwrap();
    assert_eq!(path, temp_dir.path().join("history.json"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n    {"));

    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([
            {"role": "user", "content": "Base instruction"},
            {"role": "assistant", "content": "Yes."},
            {"role": "user", "content": "Scene 1"}
        ])
    );
}

#[tokio::test]
async fn test_history_overwritten_on_second_save() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let mut context = ConversationContext::seeded("Base", "Yes.");
    storage.save_history(&context).await.unwrap();
    context.append(Role::User, "more");
    let path = storage.save_history(&context).await.unwrap();

    let restored: ConversationContext =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(restored, context);
}

#[tokio::test]
async fn test_creates_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("runs").join("today");

    let storage = FileSystemStorage::new(&nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(storage.base_path(), nested.as_path());
}

#[tokio::test]
async fn test_memory_storage_mirrors_file_names() {
    let storage = MemoryStorage::new();

    let path = storage.save_image(b"one").await.unwrap();
    assert_eq!(path.to_str(), Some("images_of_scene1.png"));

    let path = storage
        .save_history(&ConversationContext::seeded("Base", "Yes."))
        .await
        .unwrap();
    assert_eq!(path.to_str(), Some("history.json"));

    assert_eq!(storage.images(), vec![b"one".to_vec()]);
    assert!(storage.history().is_some());
}
