//! Structured output extraction from model replies.
//!
//! Replies arrive in three shapes: a fenced ```` ```json ```` block, prose
//! with such a block somewhere inside, or a bare literal. [`extract`]
//! handles all three and reports which one it saw through [`Extracted`].

use crate::literal::parse_literal;
use fabula_error::{ExtractionError, ExtractionErrorKind, FabulaResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Opening fence models put around structured output.
pub const OPENING_FENCE: &str = "```json";

/// Closing fence.
pub const CLOSING_FENCE: &str = "```";

/// Result of running the extractor over a reply.
///
/// A reply that is exactly one fenced block, or a bare literal, is parsed
/// immediately. A reply with a fenced block buried in prose yields the
/// block's raw text instead; [`Extracted::into_value`] parses it on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// Literal parsed from the whole reply or from a bracketing fence
    Parsed(Value),
    /// Unparsed text found between the first fence pair inside prose
    Raw(String),
}

impl Extracted {
    /// Normalize to a parsed value, parsing `Raw` text with the same grammar.
    ///
    /// # Errors
    ///
    /// Returns a `MalformedStructuredOutput` error if the raw text is not a
    /// valid literal.
    pub fn into_value(self) -> Result<Value, ExtractionError> {
        match self {
            Extracted::Parsed(value) => Ok(value),
            Extracted::Raw(raw) => parse_literal(raw.trim()),
        }
    }

    /// True for the prose fallback shape.
    pub fn is_raw(&self) -> bool {
        matches!(self, Extracted::Raw(_))
    }
}

/// Extract structured data from a model reply.
///
/// 1. Trim the reply.
/// 2. If it starts with [`OPENING_FENCE`] and ends with [`CLOSING_FENCE`],
///    strip both and parse what is left.
/// 3. Otherwise, if [`OPENING_FENCE`] appears anywhere, return the text
///    between its end and the next [`CLOSING_FENCE`] (or the end of the
///    reply when the block is never closed) without parsing it.
/// 4. Otherwise parse the whole trimmed reply.
///
/// # Errors
///
/// Returns a `MalformedStructuredOutput` error when a parse in step 2 or 4
/// fails. The extractor never retries.
///
/// # Examples
///
/// ```
/// use fabula_narrative::{Extracted, extract};
///
/// let fenced = "```json\n[{'name': 'Eira', 'description': 'explorer'}]\n```";
/// let value = extract(fenced).unwrap().into_value().unwrap();
/// assert_eq!(value[0]["name"], "Eira");
///
/// let prose = "Here you go:\n```json\n{'imgprompt': 'Eira'}\n```\nEnjoy!";
/// assert_eq!(
///     extract(prose).unwrap(),
///     Extracted::Raw("\n{'imgprompt': 'Eira'}\n".to_string())
/// );
/// ```
pub fn extract(text: &str) -> Result<Extracted, ExtractionError> {
    let trimmed = text.trim();

    if trimmed.len() >= OPENING_FENCE.len() + CLOSING_FENCE.len()
        && trimmed.starts_with(OPENING_FENCE)
        && trimmed.ends_with(CLOSING_FENCE)
    {
        let inner = &trimmed[OPENING_FENCE.len()..trimmed.len() - CLOSING_FENCE.len()];
        return parse_logged(inner.trim()).map(Extracted::Parsed);
    }

    if let Some(start) = trimmed.find(OPENING_FENCE) {
        let content_start = start + OPENING_FENCE.len();
        let rest = &trimmed[content_start..];
        let raw = match rest.find(CLOSING_FENCE) {
            Some(end) => &rest[..end],
            None => {
                tracing::debug!("Opening fence without closing fence, taking rest of reply");
                rest
            }
        };
        tracing::debug!(raw_len = raw.len(), "Extracted raw block from surrounding prose");
        return Ok(Extracted::Raw(raw.to_string()));
    }

    parse_logged(trimmed).map(Extracted::Parsed)
}

fn parse_logged(text: &str) -> Result<Value, ExtractionError> {
    parse_literal(text).map_err(|e| {
        tracing::error!(
            text_length = text.len(),
            error = %e,
            "Failed to parse structured output. Hint: ask the model for a single fenced ```json block."
        );
        e
    })
}

/// Extract and normalize a reply to a parsed value.
pub fn extract_value(text: &str) -> FabulaResult<Value> {
    Ok(extract(text)?.into_value()?)
}

/// Extract a reply and deserialize it into `T`.
///
/// # Errors
///
/// Returns `MalformedStructuredOutput` when the reply does not parse, or
/// when the parsed value does not have the shape of `T`.
///
/// # Examples
///
/// ```
/// use fabula_core::ScenePrompt;
/// use fabula_narrative::extract_as;
///
/// let prompt: ScenePrompt = extract_as("{'imgPrompt': 'Eira at dawn'}").unwrap();
/// assert_eq!(prompt.img_prompt(), "Eira at dawn");
/// ```
pub fn extract_as<T: DeserializeOwned>(text: &str) -> FabulaResult<T> {
    let value = extract_value(text)?;
    let found = describe(&value);
    let parsed = serde_json::from_value(value).map_err(|e| {
        ExtractionError::new(ExtractionErrorKind::UnexpectedShape {
            expected: short_type_name::<T>(),
            found: format!("{} ({})", found, e),
        })
    })?;
    Ok(parsed)
}

/// One-word description of a value's shape.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    // Strip module paths but keep generic structure readable
    full.split(['<', '>', ',', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| part.rsplit("::").next().unwrap_or(part))
        .collect::<Vec<_>>()
        .join(" of ")
}
