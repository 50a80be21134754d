//! Provider error types and retry classification.

/// Conditions under which a remote provider response is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Non-success HTTP status with the response body
    #[display("HTTP {} error: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Error message or body excerpt
        message: String,
    },
    /// Response body was not the expected JSON document
    #[display("Malformed response body: {}", _0)]
    MalformedResponse(String),
    /// Response JSON lacked a required field
    #[display("Response is missing field '{}'", _0)]
    MissingField(String),
    /// Response carried no content at all
    #[display("Provider returned an empty response")]
    EmptyResponse,
}

impl ProviderErrorKind {
    /// Check if this error type is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderErrorKind::HttpStatus { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            ProviderErrorKind::MalformedResponse(_) => true,
            ProviderErrorKind::MissingField(_) => true,
            ProviderErrorKind::EmptyResponse => true,
        }
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use fabula_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new("groq", ProviderErrorKind::EmptyResponse);
/// assert!(format!("{}", err).contains("empty response"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error ({}): {} at line {} in {}", provider, kind, line, file)]
pub struct ProviderError {
    /// Name of the provider that failed
    pub provider: &'static str,
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(provider: &'static str, kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            provider,
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that know whether a retry could help.
///
/// The completion client retries regardless of classification; the
/// classification is recorded in logs so permanent misconfiguration stands
/// out from transient outages.
///
/// # Examples
///
/// ```
/// use fabula_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new("image", ProviderErrorKind::HttpStatus {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 (service unavailable), 429 (rate limit),
    /// or network timeouts should return true. Permanent errors like a
    /// missing credential should return false.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl RetryableError for crate::HttpError {
    fn is_retryable(&self) -> bool {
        match self.status {
            Some(status) => matches!(status, 408 | 429 | 500..=599),
            None => true,
        }
    }
}

impl RetryableError for crate::FabulaError {
    fn is_retryable(&self) -> bool {
        use crate::FabulaErrorKind;
        match self.kind() {
            FabulaErrorKind::Http(e) => e.is_retryable(),
            FabulaErrorKind::Provider(e) => e.is_retryable(),
            FabulaErrorKind::Json(_) => true,
            _ => false,
        }
    }
}
