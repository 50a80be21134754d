//! Tolerant parser for structured literals in model replies.
//!
//! Models asked for JSON frequently answer with something closer to a
//! scripting-language literal: single-quoted strings, `True`/`None`,
//! tuples, trailing commas, unescaped newlines inside strings. This parser
//! accepts all of those and produces a [`serde_json::Value`].
//!
//! Accepted grammar:
//!
//! ```text
//! value   := string | number | keyword | list | tuple | mapping
//! string  := ('"' | "'") chars (same quote), adjacent strings concatenate
//! keyword := true | false | null | True | False | None
//! list    := '[' (value ',')* value? ']'
//! tuple   := '(' (value ',')* value? ')'       (single element without comma is that element)
//! mapping := '{' (value ':' value ',')* '}'    (non-string keys are stringified)
//!         |  '{' (value ',')* value? '}'       (set, becomes an array)
//! ```

use fabula_error::{ExtractionError, ExtractionErrorKind};
use serde_json::{Map, Number, Value};

/// Deepest container nesting accepted before the reply is rejected.
const MAX_DEPTH: usize = 128;

/// Parse `text` as a single literal value.
///
/// # Errors
///
/// Returns an [`ExtractionErrorKind::MalformedLiteral`] error carrying the
/// byte offset where parsing failed.
///
/// # Examples
///
/// ```
/// use fabula_narrative::parse_literal;
///
/// let value = parse_literal("[{'name': 'Eira', 'brave': True,}]").unwrap();
/// assert_eq!(value[0]["name"], "Eira");
/// assert_eq!(value[0]["brave"], true);
/// ```
pub fn parse_literal(text: &str) -> Result<Value, ExtractionError> {
    let mut parser = Parser::new(text);
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < text.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            depth: 0,
        }
    }

    #[track_caller]
    fn error(&self, message: impl Into<String>) -> ExtractionError {
        ExtractionError::new(ExtractionErrorKind::MalformedLiteral {
            offset: self.pos,
            message: message.into(),
        })
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if c == '#' {
                // Line comment
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, ExtractionError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('"') | Some('\'') => self.parse_strings().map(Value::String),
            Some(open @ ('[' | '(' | '{')) => {
                if self.depth >= MAX_DEPTH {
                    return Err(self.error("nesting too deep"));
                }
                self.depth += 1;
                let value = match open {
                    '[' => self.parse_sequence(']'),
                    '(' => self.parse_tuple(),
                    _ => self.parse_mapping(),
                };
                self.depth -= 1;
                value
            }
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn parse_strings(&mut self) -> Result<String, ExtractionError> {
        let mut out = self.parse_string()?;
        loop {
            let checkpoint = self.pos;
            self.skip_whitespace();
            match self.peek() {
                Some('"') | Some('\'') => out.push_str(&self.parse_string()?),
                _ => {
                    self.pos = checkpoint;
                    return Ok(out);
                }
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, ExtractionError> {
        let start = self.pos;
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected string")),
        };

        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    self.pos = start;
                    return Err(self.error("unterminated string"));
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.parse_escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), ExtractionError> {
        let escaped = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape sequence"))?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '\\' | '\'' | '"' | '/' => out.push(escaped),
            // Escaped line break continues the string
            '\n' => {}
            'x' => out.push(self.parse_code_point(2)?),
            'u' => out.push(self.parse_code_point(4)?),
            other => {
                // Unknown escapes are kept literally
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn parse_code_point(&mut self, digits: usize) -> Result<char, ExtractionError> {
        let end = self.pos + digits;
        let hex = self
            .text
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated escape sequence"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos = end;

        if (0xD800..0xDC00).contains(&code) {
            // High surrogate; expect a \uXXXX low surrogate to follow
            if self.text[self.pos..].starts_with("\\u") {
                let low_start = self.pos + 2;
                if let Some(low) = self
                    .text
                    .get(low_start..low_start + 4)
                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                    .filter(|low| (0xDC00..0xE000).contains(low))
                {
                    self.pos = low_start + 4;
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| self.error("invalid surrogate pair"));
                }
            }
            return Ok(char::REPLACEMENT_CHARACTER);
        }

        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }

    fn parse_number(&mut self) -> Result<Value, ExtractionError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' | 'e' | 'E' => is_float = true,
                '+' | '-' if matches!(self.text[..self.pos].chars().last(), Some('e' | 'E')) => {}
                _ => break,
            }
            self.bump();
        }

        let literal: String = self.text[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let literal = literal.trim_start_matches('+');

        if !is_float {
            if let Ok(n) = literal.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            if let Ok(n) = literal.parse::<u64>() {
                return Ok(Value::Number(n.into()));
            }
        }

        match literal.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => {
                let raw = self.text[start..self.pos].to_string();
                self.pos = start;
                Err(self.error(format!("invalid number '{}'", raw)))
            }
        }
    }

    fn parse_keyword(&mut self) -> Result<Value, ExtractionError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }

        match &self.text[start..self.pos] {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            "null" | "None" => Ok(Value::Null),
            word => {
                let word = word.to_string();
                self.pos = start;
                Err(self.error(format!("unknown identifier '{}'", word)))
            }
        }
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    ///
    /// Returns the items and whether any comma was seen.
    fn parse_items(&mut self, close: char) -> Result<(Vec<Value>, bool), ExtractionError> {
        let mut items = Vec::new();
        let mut saw_comma = false;

        loop {
            self.skip_whitespace();
            if self.eat(close) {
                return Ok((items, saw_comma));
            }

            items.push(self.parse_value()?);

            self.skip_whitespace();
            if self.eat(',') {
                saw_comma = true;
            } else if self.eat(close) {
                return Ok((items, saw_comma));
            } else {
                return Err(self.error(format!("expected ',' or '{}'", close)));
            }
        }
    }

    fn parse_sequence(&mut self, close: char) -> Result<Value, ExtractionError> {
        self.bump();
        let (items, _) = self.parse_items(close)?;
        Ok(Value::Array(items))
    }

    fn parse_tuple(&mut self) -> Result<Value, ExtractionError> {
        self.bump();
        let (mut items, saw_comma) = self.parse_items(')')?;
        if items.len() == 1 && !saw_comma {
            // Parenthesized expression, not a tuple
            return Ok(items.remove(0));
        }
        Ok(Value::Array(items))
    }

    fn parse_mapping(&mut self) -> Result<Value, ExtractionError> {
        self.bump();
        self.skip_whitespace();
        if self.eat('}') {
            return Ok(Value::Object(Map::new()));
        }

        let first = self.parse_value()?;
        self.skip_whitespace();
        if !self.eat(':') {
            // A set literal
            let mut items = vec![first];
            self.skip_whitespace();
            if self.eat(',') {
                let (rest, _) = self.parse_items('}')?;
                items.extend(rest);
            } else if !self.eat('}') {
                return Err(self.error("expected ':', ',' or '}'"));
            }
            return Ok(Value::Array(items));
        }

        let mut map = Map::new();
        let mut key = first;
        loop {
            self.skip_whitespace();
            let value = self.parse_value()?;
            map.insert(key_string(key), value);

            self.skip_whitespace();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' or '}'"));
            }

            self.skip_whitespace();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            key = self.parse_value()?;
            self.skip_whitespace();
            if !self.eat(':') {
                return Err(self.error("expected ':'"));
            }
        }
    }
}

fn key_string(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
