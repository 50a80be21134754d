//! A single role-tagged message.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One role-tagged message in a conversation.
///
/// Turns are immutable: fields are only reachable through getters, so a
/// turn appended to a [`ConversationContext`](crate::ConversationContext)
/// can never change afterwards.
///
/// # Examples
///
/// ```
/// use fabula_core::{Role, Turn};
///
/// let turn = Turn::user("Hello!");
/// assert_eq!(*turn.role(), Role::User);
/// assert_eq!(turn.content(), "Hello!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct Turn {
    /// The role of the message sender
    role: Role,
    /// The text of the message
    content: String,
}

impl Turn {
    /// Create a turn with an explicit role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}
