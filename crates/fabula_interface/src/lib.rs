//! Trait definitions for the Fabula storyboard pipeline.
//!
//! The pipeline talks to three remote collaborators. Each sits behind a
//! trait so the orchestration and resilience layers can be exercised with
//! in-process fakes.

mod traits;

pub use traits::{CompletionDriver, ImageDriver, StoryDriver};
