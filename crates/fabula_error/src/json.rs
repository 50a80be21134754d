//! JSON error types.

/// JSON encoding or decoding failure outside of model-reply extraction.
///
/// Used for provider wire payloads and for the persisted history document.
/// Replies that fail to parse as structured output raise
/// [`ExtractionError`](crate::ExtractionError) instead.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_error::JsonError;
    ///
    /// let err = JsonError::new("trailing characters at line 1 column 9");
    /// assert!(err.message.contains("trailing"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
