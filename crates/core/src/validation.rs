//! Document validation.
//!
//! Validation runs in two steps:
//! 1. Syntax: the text must parse as JSON. A failure yields exactly one error whose
//!    message ends in `at position N`; line and column are derived from that offset.
//! 2. Schema: when a schema is configured, every violation becomes one error record
//!    with the failing instance path and schema keyword.
//!
//! Both kinds are returned as data in a [`ValidationOutcome`]; neither is an `Err`.

use crate::schema::CompiledSchema;
use serde::Serialize;
use serde_json::error::Category;
use serde_json::Value;

/// One problem found in a document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub message: String,
    /// JSON pointer of the failing value; empty for the root.
    pub path: String,
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<usize>,
}

impl ValidationError {
    /// Message prefixed with its line, or `unknown` when no location could be derived.
    pub fn full_message(&self) -> String {
        match self.line_number {
            Some(line) => format!("Error on line {line}: {}", self.message),
            None => format!("Error on line unknown: {}", self.message),
        }
    }
}

/// Result of validating one document. A document is either valid or not.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// A JSON syntax failure with a best-effort character offset.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    /// Parser diagnostic, ending in `at position N` when the offset is known.
    pub message: String,
    pub position: Option<usize>,
}

impl SyntaxError {
    /// Rewrite a `serde_json` diagnostic into offset form.
    ///
    /// `serde_json` reports `line`/`column`; the column is a byte count on that line, so
    /// the offset is recovered in bytes and then converted to characters. Premature end
    /// of input points just past the last character.
    pub fn from_parser(text: &str, err: &serde_json::Error) -> Self {
        let rendered = err.to_string();
        let reason = match rendered.rfind(" at line ") {
            Some(idx) => rendered[..idx].to_string(),
            None => rendered,
        };
        let position = if err.classify() == Category::Eof {
            Some(text.chars().count())
        } else {
            char_offset(text, err.line(), err.column())
        };
        let message = match position {
            Some(position) => format!("{reason} at position {position}"),
            None => reason,
        };
        Self { message, position }
    }

    /// Convert into a validation error, deriving the location from the message.
    pub fn to_validation_error(&self, text: &str) -> ValidationError {
        let location = position_from_message(&self.message).map(|pos| line_column(text, pos));
        ValidationError {
            message: self.message.clone(),
            path: String::new(),
            keyword: "syntax".into(),
            params: None,
            line_number: location.map(|(line, _)| line),
            column_number: location.map(|(_, column)| column),
        }
    }
}

/// A document accepted by the upload path.
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub document: Value,
    pub outcome: ValidationOutcome,
}

/// Parse text as a JSON document.
///
/// # Errors
///
/// Returns a [`SyntaxError`] carrying the parser diagnostic and offset.
pub fn parse_document(text: &str) -> Result<Value, SyntaxError> {
    serde_json::from_str(text).map_err(|err| SyntaxError::from_parser(text, &err))
}

/// Validate raw text, optionally against a compiled schema.
pub fn validate(text: &str, schema: Option<&CompiledSchema>) -> ValidationOutcome {
    match parse_document(text) {
        Ok(document) => validate_value(&document, schema),
        Err(err) => ValidationOutcome::from_errors(vec![err.to_validation_error(text)]),
    }
}

/// Validate an already-parsed document.
///
/// An array root whose only complaint is a root-level `type` mismatch is accepted:
/// schemas written for object roots are relaxed for array roots.
pub fn validate_value(document: &Value, schema: Option<&CompiledSchema>) -> ValidationOutcome {
    let Some(schema) = schema else {
        return ValidationOutcome::valid();
    };

    let errors = schema.violations(document);
    if document.is_array()
        && errors.len() == 1
        && errors[0].keyword == "type"
        && errors[0].path.is_empty()
    {
        tracing::debug!("accepting array root despite root type mismatch");
        return ValidationOutcome::valid();
    }

    ValidationOutcome::from_errors(errors)
}

/// Parse an uploaded file and validate it.
///
/// The parsed document is returned even when it violates the schema so it can be
/// cached for the viewers; only unparseable text is rejected.
///
/// # Errors
///
/// Returns a [`SyntaxError`] when the text is not JSON.
pub fn accept_upload(text: &str, schema: Option<&CompiledSchema>) -> Result<Upload, SyntaxError> {
    let document = parse_document(text)?;
    let outcome = validate_value(&document, schema);
    Ok(Upload { document, outcome })
}

/// Extract `N` from a diagnostic containing `at position N`.
pub fn position_from_message(message: &str) -> Option<usize> {
    const MARKER: &str = "at position ";
    let start = message.find(MARKER)? + MARKER.len();
    let digits: String = message[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// 1-based line and column of a character offset.
pub fn line_column(text: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for ch in text.chars().take(position) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

fn char_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }

    let line_start = if line == 1 {
        0
    } else {
        text.match_indices('\n').nth(line - 2).map(|(idx, _)| idx + 1)?
    };

    let mut byte = (line_start + column.saturating_sub(1)).min(text.len());
    while !text.is_char_boundary(byte) {
        byte -= 1;
    }
    Some(text[..byte].chars().count())
}
