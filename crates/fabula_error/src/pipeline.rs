//! Pipeline error types.

/// Specific error conditions for pipeline orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Story generation returned an empty story
    #[display("Story provider returned an empty story")]
    EmptyStory,
    /// Character extraction found no characters
    #[display("No characters could be extracted from the story")]
    NoCharacters,
    /// Scene extraction found no scenes
    #[display("No scenes could be extracted from the story")]
    NoScenes,
    /// A stage was entered out of order
    #[display("Stage '{}' requires '{}' to have completed", stage, requires)]
    OutOfOrder {
        /// Stage being entered
        stage: String,
        /// Stage that must run first
        requires: String,
    },
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use fabula_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::NoScenes);
/// assert!(format!("{}", err).contains("No scenes"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
