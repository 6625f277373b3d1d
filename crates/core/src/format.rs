//! Pretty-printing with located syntax errors.

use crate::validation::{line_column, parse_document, position_from_message};
use serde::Serialize;
use serde_json::Value;

/// Why a document could not be formatted, with the offending line for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct FormatError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_content: Option<String>,
    /// Marker line with `^` under the failing column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caret: Option<String>,
}

impl FormatError {
    fn from_message(text: &str, message: String) -> Self {
        let position = position_from_message(&message);
        let location = position.map(|pos| line_column(text, pos));
        let line_content = location.map(|(line, _)| {
            text.split('\n')
                .nth(line - 1)
                .unwrap_or_default()
                .trim_end_matches('\r')
                .to_string()
        });
        let caret = location.map(|(_, column)| format!("{}^", " ".repeat(column - 1)));

        Self {
            message,
            position,
            line_number: location.map(|(line, _)| line),
            column_number: location.map(|(_, column)| column),
            line_content,
            caret,
        }
    }

    /// Multi-line rendering: headline, offending line, caret.
    pub fn render(&self) -> String {
        match (self.line_number, self.column_number) {
            (Some(line), Some(column)) => format!(
                "Error on line {line}, column {column}: {}\n{}\n{}",
                self.message,
                self.line_content.as_deref().unwrap_or_default(),
                self.caret.as_deref().unwrap_or_default(),
            ),
            _ => format!("Error on line unknown: {}", self.message),
        }
    }
}

/// Re-serialise JSON text with 2-space indentation.
///
/// Key order is preserved, so formatting already-formatted output is a no-op.
///
/// # Errors
///
/// Returns a [`FormatError`] locating the syntax failure.
pub fn format_json(text: &str) -> Result<String, FormatError> {
    let document =
        parse_document(text).map_err(|err| FormatError::from_message(text, err.message))?;
    format_value(&document).map_err(|err| FormatError::from_message(text, err.to_string()))
}

/// Serialise a parsed document with 2-space indentation.
pub fn format_value(document: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}
