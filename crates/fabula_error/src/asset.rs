//! Image generation error types.

/// Asset generation failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AssetErrorKind {
    /// Precondition violated; never retried
    #[display("Invalid argument: {}", _0)]
    InvalidArgument(String),
    /// Every allowed attempt failed
    #[display("Failed to generate image after {} attempts: {}", attempts, last_error)]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the final failure
        last_error: String,
    },
}

/// Asset generation error with location tracking.
///
/// # Examples
///
/// ```
/// use fabula_error::{AssetError, AssetErrorKind};
///
/// let err = AssetError::new(AssetErrorKind::InvalidArgument("Prompt cannot be empty".into()));
/// assert!(format!("{}", err).contains("Prompt cannot be empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Asset Error: {} at line {} in {}", kind, line, file)]
pub struct AssetError {
    /// The kind of error that occurred
    pub kind: AssetErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AssetError {
    /// Create a new asset error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AssetErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an [`AssetErrorKind::InvalidArgument`] error.
    #[track_caller]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(AssetErrorKind::InvalidArgument(message.into()))
    }
}
