//! Patient records and the parsing facade.
//!
//! Responsibilities:
//! - Define the patient wire model (`patientId`, `name`, `age`, `sex`, `cmgTests`)
//! - Keep unrecognised top-level fields so they survive share-link round trips
//! - Translate a JSON document (single object or array) into typed records

use crate::{RecordError, RecordResult, TestRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Patient identifier as found in uploaded documents: text or a bare number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One patient with their pressure tests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default)]
    pub cmg_tests: Vec<TestRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Namespace for record parsing operations.
pub struct Records;

impl Records {
    /// Parse patient records from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidJson`] for unparseable text and
    /// [`RecordError::Translation`] when the document does not match the record model.
    pub fn parse(text: &str) -> RecordResult<Vec<PatientRecord>> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Translate a parsed document into patient records.
    ///
    /// An array root yields one record per element; an object root yields a single record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidInput`] for scalar roots and
    /// [`RecordError::Translation`] naming the failing path on shape mismatches.
    pub fn from_value(value: &Value) -> RecordResult<Vec<PatientRecord>> {
        match value {
            Value::Array(_) => translate::<Vec<PatientRecord>>(value, "Patient list"),
            Value::Object(_) => Ok(vec![translate::<PatientRecord>(value, "Patient")?]),
            other => Err(RecordError::InvalidInput(format!(
                "expected an object or array of patient records, got {}",
                kind_name(other)
            ))),
        }
    }

    /// Translate a single test record, e.g. from an annotation request body.
    pub fn test_from_value(value: &Value) -> RecordResult<TestRecord> {
        translate::<TestRecord>(value, "Test")
    }
}

fn translate<T: DeserializeOwned>(value: &Value, what: &str) -> RecordResult<T> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(RecordError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_array_of_patients() {
        let input = r##"[
  {
    "patientId": "P-001",
    "name": "Sarah Williams",
    "age": 34,
    "sex": "F",
    "ward": "B2",
    "cmgTests": [
      {
        "createdAt": "2024-03-20T10:15:00Z",
        "dataPoints": [10, 12, 15],
        "notes": [{"timestamp": 1, "pressure": 12, "note": "cough", "color": "#ff0000"}],
        "targetPressure": 14
      }
    ]
  },
  {"patientId": 7, "name": "Jane"}
]"##;

        let records = Records::parse(input).expect("parse patients");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].patient_id, Some(RecordId::Text("P-001".into())));
        assert_eq!(records[0].cmg_tests[0].data_points, vec![10.0, 12.0, 15.0]);
        assert_eq!(records[0].extra.get("ward"), Some(&json!("B2")));
        assert_eq!(records[1].patient_id, Some(RecordId::Number(7)));
        assert!(records[1].cmg_tests.is_empty());
    }

    #[test]
    fn object_root_is_a_single_patient() {
        let records = Records::from_value(&json!({"name": "Solo", "cmgTests": []}))
            .expect("single patient");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Solo"));
    }

    #[test]
    fn wrong_types_report_the_failing_path() {
        let value = json!([{"cmgTests": [{"dataPoints": [1, "two", 3]}]}]);
        let err = Records::from_value(&value).expect_err("should reject string sample");
        match err {
            RecordError::Translation(msg) => {
                assert!(msg.contains("cmgTests"), "message was {msg}");
                assert!(msg.contains("dataPoints"), "message was {msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn scalar_root_is_rejected() {
        let err = Records::from_value(&json!("nope")).expect_err("scalar root");
        assert!(matches!(err, RecordError::InvalidInput(msg) if msg.contains("string")));
    }

    #[test]
    fn record_id_displays_plainly() {
        assert_eq!(RecordId::Number(12).to_string(), "12");
        assert_eq!(RecordId::Text("abc".into()).to_string(), "abc");
    }
}
