//! Tests for layered configuration loading.

use fabula::{FabulaConfig, FabulaErrorKind, GROQ_CHAT_URL};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_bundled_defaults() {
    let config = FabulaConfig::from_toml("").unwrap();

    assert_eq!(config.completion().timeout(), Duration::from_secs(120));
    assert_eq!(config.story().endpoint(), GROQ_CHAT_URL);
    assert_eq!(config.story().model(), "llama-3.1-70b-versatile");
    assert_eq!(config.story().api_key_env(), "GROQ_API_KEY");
    assert_eq!(*config.story().max_tokens(), 1024);

    assert_eq!(config.image().size(), "9:16");
    assert_eq!(config.image().model(), "flux-disney");
    assert_eq!(config.image().timeout(), Duration::from_secs(60));

    assert_eq!(config.retry().cooldown(), Duration::from_secs(15));
    assert!(config.retry().max_completion_attempts().is_none());
    assert_eq!(*config.retry().asset_max_retries(), 3);

    assert!(*config.pipeline().use_consolidated_context());
    assert_eq!(config.pipeline().output_dir(), &PathBuf::from("."));
}

#[test]
fn test_partial_override_keeps_other_defaults() {
    let config = FabulaConfig::from_toml(
        r#"
        [retry]
        cooldown_secs = 30
        max_completion_attempts = 10

        [image]
        model = "flux-anime"
        "#,
    )
    .unwrap();

    assert_eq!(config.retry().cooldown(), Duration::from_secs(30));
    assert_eq!(*config.retry().max_completion_attempts(), Some(10));
    assert_eq!(*config.retry().asset_retry_delay_secs(), 5);
    assert_eq!(config.image().model(), "flux-anime");
    assert_eq!(config.image().size(), "9:16");
}

#[test]
fn test_pipeline_settings_from_sections() {
    let config = FabulaConfig::from_toml(
        r#"
        [pipeline]
        inter_scene_delay_secs = 2
        max_extraction_attempts = 5

        [image]
        amount = 2

        [retry]
        asset_max_retries = 4
        asset_retry_delay_secs = 1
        "#,
    )
    .unwrap();

    let settings = config.pipeline_settings().unwrap();
    assert_eq!(*settings.inter_scene_delay(), Duration::from_secs(2));
    assert_eq!(*settings.max_extraction_attempts(), 5);
    assert_eq!(*settings.images_per_scene(), 2);
    assert_eq!(*settings.asset_max_retries(), 4);
    assert_eq!(*settings.asset_retry_delay(), Duration::from_secs(1));
    assert!(*settings.use_consolidated_context());
}

#[test]
fn test_cli_overrides() {
    let config = FabulaConfig::from_toml("")
        .unwrap()
        .with_output_dir("storyboards")
        .with_consolidated_context(false);

    assert_eq!(config.pipeline().output_dir(), &PathBuf::from("storyboards"));
    assert!(!*config.pipeline_settings().unwrap().use_consolidated_context());
}

#[test]
fn test_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[story]\nmodel = \"llama-3.1-8b-instant\"\n").unwrap();

    let config = FabulaConfig::from_file(&path).unwrap();

    assert_eq!(config.story().model(), "llama-3.1-8b-instant");
    assert_eq!(config.story().api_key_env(), "GROQ_API_KEY");
}

#[test]
fn test_zero_asset_retries_rejected() {
    let err = FabulaConfig::from_toml("[retry]\nasset_max_retries = 0\n").unwrap_err();
    assert!(matches!(err.kind(), FabulaErrorKind::Config(_)));
    assert!(err.to_string().contains("asset_max_retries"));
}

#[test]
fn test_zero_image_amount_rejected() {
    let err = FabulaConfig::from_toml("[image]\namount = 0\n").unwrap_err();
    assert!(err.to_string().contains("amount"));
}

#[test]
fn test_wrong_type_rejected() {
    let err = FabulaConfig::from_toml("[pipeline]\nuse_consolidated_context = \"sometimes\"\n")
        .unwrap_err();
    assert!(matches!(err.kind(), FabulaErrorKind::Config(_)));
}

#[test]
fn test_missing_explicit_file_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(FabulaConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_completion_timeout_override() {
    let config = FabulaConfig::from_toml("[completion]\ntimeout_secs = 30\n").unwrap();
    assert_eq!(config.completion().timeout(), Duration::from_secs(30));

    let err = FabulaConfig::from_toml("[completion]\ntimeout_secs = 0\n").unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
}
