//! Storyboard pipeline for Fabula.
//!
//! This crate turns a generated story into a storyboard:
//!
//! - [`extract`] and friends coerce model replies into structured data,
//!   tolerating fences, prose and scripting-language literals
//! - [`prompts`] holds the fixed instructions for every stage
//! - [`PipelineOrchestrator`] runs the stages and owns the persistent
//!   conversation
//!
//! # Example
//!
//! ```rust,ignore
//! use fabula_narrative::{PipelineOrchestrator, PipelineSettings};
//!
//! let mut orchestrator = PipelineOrchestrator::new(completion, story, assets, retry)
//!     .with_settings(PipelineSettings::default());
//! let report = orchestrator.run().await?;
//! println!("{} images", report.image_paths().len());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;
mod literal;
mod orchestrator;
pub mod prompts;
mod report;
mod settings;
mod stage;

pub use extraction::{CLOSING_FENCE, Extracted, OPENING_FENCE, extract, extract_as, extract_value};
pub use literal::parse_literal;
pub use orchestrator::PipelineOrchestrator;
pub use report::{ImageStatus, PipelineReport, SceneOutcome};
pub use settings::{PipelineSettings, PipelineSettingsBuilder, StoryParameters};
pub use stage::PipelineStage;
