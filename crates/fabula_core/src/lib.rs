//! Core data types for the Fabula storyboard pipeline.
//!
//! This crate provides the conversation model (roles, turns and the
//! append-only [`ConversationContext`]) together with the story entities
//! that flow between pipeline stages.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character;
mod context;
mod request;
mod role;
mod scene;
mod turn;

pub use character::Character;
pub use context::ConversationContext;
pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateRequestBuilderError, ImageRequest,
    ImageRequestBuilder, ImageRequestBuilderError,
};
pub use role::Role;
pub use scene::{Scene, ScenePrompt};
pub use turn::Turn;
