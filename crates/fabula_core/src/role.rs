//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Who authored a turn.
///
/// Serialized in lowercase, matching the wire format of chat providers.
///
/// # Examples
///
/// ```
/// use fabula_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "system");
/// assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System messages provide context and instructions
    #[display("system")]
    System,
    /// User messages carry the pipeline's instructions
    #[display("user")]
    User,
    /// Assistant messages are model replies
    #[display("assistant")]
    Assistant,
}
