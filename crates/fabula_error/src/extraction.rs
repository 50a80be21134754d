//! Structured output extraction errors.

/// Reasons a model reply could not be coerced into structured data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ExtractionErrorKind {
    /// Literal syntax error at a byte offset of the parsed text
    #[display("Malformed literal at offset {}: {}", offset, message)]
    MalformedLiteral {
        /// Byte offset in the parsed text
        offset: usize,
        /// What the parser expected or found
        message: String,
    },
    /// Parsed value does not have the shape the caller needs
    #[display("Expected {}, found {}", expected, found)]
    UnexpectedShape {
        /// Shape the caller asked for
        expected: String,
        /// Shape actually parsed
        found: String,
    },
    /// Mapping lacks a required key
    #[display("Structured output is missing key '{}'", _0)]
    MissingKey(String),
}

/// The `MalformedStructuredOutput` error.
///
/// Never retried by the extractor itself; callers decide whether to
/// re-issue the originating completion call.
///
/// # Examples
///
/// ```
/// use fabula_error::{ExtractionError, ExtractionErrorKind};
///
/// let err = ExtractionError::new(ExtractionErrorKind::MissingKey("imgprompt".into()));
/// assert!(format!("{}", err).contains("imgprompt"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Malformed Structured Output: {} at line {} in {}", kind, line, file)]
pub struct ExtractionError {
    /// The specific error condition
    pub kind: ExtractionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ExtractionError {
    /// Create a new ExtractionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ExtractionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
