//! Append-only conversation log.

use crate::{Role, Turn};
use serde::{Deserialize, Serialize};

/// Ordered, append-only log of turns forming the prompt context of a call.
///
/// The pipeline keeps exactly one persistent context per run. Calls that
/// must not pollute it build a throwaway turn list with
/// [`ConversationContext::with_scoped`] instead.
///
/// Serializes as a plain JSON array of turns.
///
/// # Examples
///
/// ```
/// use fabula_core::{ConversationContext, Role, Turn};
///
/// let mut context = ConversationContext::new();
/// context.append(Role::User, "Describe the forest.");
/// context.append(Role::Assistant, "Tall, gnarled trees.");
/// assert_eq!(context.len(), 2);
///
/// let scoped = ConversationContext::with_scoped([Turn::assistant("A story.")]);
/// assert_eq!(scoped.len(), 1);
/// assert_eq!(context.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationContext {
    turns: Vec<Turn>,
}

impl ConversationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context primed with an instruction and its acknowledgment.
    pub fn seeded(instruction: impl Into<String>, acknowledgment: impl Into<String>) -> Self {
        let mut context = Self::new();
        context.append(Role::User, instruction);
        context.append(Role::Assistant, acknowledgment);
        context
    }

    /// Append a turn and return a reference to it.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> &Turn {
        self.push(Turn::new(role, content))
    }

    /// Append an already constructed turn.
    pub fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// Owned copy of the turns in insertion order.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Borrow the turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Build an ephemeral context from the given turns only.
    ///
    /// The result is never merged with any persistent history.
    pub fn with_scoped(turns: impl IntoIterator<Item = Turn>) -> Vec<Turn> {
        turns.into_iter().collect()
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turn has been appended.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recently appended turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

impl<'a> IntoIterator for &'a ConversationContext {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
