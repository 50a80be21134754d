//! Fabula - storyboards from a generated story
//!
//! Fabula asks a language model for a short story, pulls out its
//! characters and key scenes, folds each character's look into a running
//! conversation, turns every scene into an image prompt and renders the
//! images.
//!
//! # Architecture
//!
//! Fabula is organized as a workspace with focused crates:
//!
//! - `fabula_core` - Conversation model and story entities
//! - `fabula_interface` - Completion, story and image driver traits
//! - `fabula_error` - Error types
//! - `fabula_retry` - Cooldown and bounded retry policies
//! - `fabula_models` - HTTP provider clients
//! - `fabula_storage` - Image and history persistence
//! - `fabula_narrative` - Structured output extraction and the pipeline
//!
//! This crate re-exports everything for convenience and adds layered
//! configuration and logging setup.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fabula::{FabulaConfig, build_orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FabulaConfig::load(None)?;
//!     let mut orchestrator = build_orchestrator(&config)?;
//!     let report = orchestrator.run().await?;
//!     println!("{} images", report.image_paths().len());
//!     Ok(())
//! }
//! ```

mod config;
mod wiring;

pub mod telemetry;

pub use crate::config::{
    CompletionConfig, DEFAULT_CONFIG, ENV_PREFIX, FabulaConfig, ImageConfig, PipelineConfig,
    StoryConfig,
};
pub use wiring::{StoryboardOrchestrator, build_orchestrator};

pub use fabula_core::*;
pub use fabula_error::*;
pub use fabula_interface::*;
pub use fabula_models::*;
pub use fabula_narrative::{
    CLOSING_FENCE, Extracted, ImageStatus, OPENING_FENCE, PipelineOrchestrator, PipelineReport,
    PipelineSettings, PipelineSettingsBuilder, PipelineStage, SceneOutcome, StoryParameters,
    extract, extract_as, extract_value, parse_literal, prompts,
};
pub use fabula_retry::*;
pub use fabula_storage::*;
