//! CMG pressure test records and their timestamped notes.

use serde::{Deserialize, Serialize};

/// Marker colour of a note: a `#rrggbb` string or a packed `0xRRGGBB` integer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteColor {
    Packed(u32),
    Hex(String),
}

/// A clinician note pinned to one sample of a test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Index into the owning test's `dataPoints`.
    pub timestamp: i64,
    pub pressure: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
}

/// One pressure test: an evenly sampled series plus annotations and thresholds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    #[serde(default)]
    pub data_points: Vec<f64>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_range_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_range_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_clinical_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_clinical_notes: Option<String>,
    /// Original series length when the record arrived through a truncated share link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_points_count: Option<usize>,
}

impl TestRecord {
    /// Largest sample, or `None` for an empty series.
    pub fn max_point(&self) -> Option<f64> {
        self.data_points.iter().copied().reduce(f64::max)
    }

    /// Number of samples the test really had, including any dropped by share truncation.
    pub fn point_count(&self) -> usize {
        self.data_points_count
            .unwrap_or(0)
            .max(self.data_points.len())
    }

    /// True when the series was cut short for a share link.
    pub fn is_truncated(&self) -> bool {
        self.data_points_count
            .is_some_and(|count| count > self.data_points.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_color_accepts_hex_or_packed() {
        let hex: Note =
            serde_json::from_str(r##"{"timestamp":1,"pressure":2,"note":"a","color":"#ff0000"}"##)
                .expect("hex note");
        assert_eq!(hex.color, Some(NoteColor::Hex("#ff0000".into())));

        let packed: Note =
            serde_json::from_str(r#"{"timestamp":1,"pressure":2,"note":"a","color":65280}"#)
                .expect("packed note");
        assert_eq!(packed.color, Some(NoteColor::Packed(0x00ff00)));
    }

    #[test]
    fn test_record_defaults_missing_collections() {
        let test: TestRecord = serde_json::from_str(r#"{"createdAt":"2024-01-01"}"#)
            .expect("minimal test");
        assert!(test.data_points.is_empty());
        assert!(test.notes.is_empty());
        assert_eq!(test.max_point(), None);
    }

    #[test]
    fn truncated_count_reports_original_length() {
        let test = TestRecord {
            data_points: vec![1.0; 20],
            data_points_count: Some(45),
            ..TestRecord::default()
        };
        assert!(test.is_truncated());
        assert_eq!(test.point_count(), 45);
    }

    #[test]
    fn serialises_camel_case_and_skips_absent_fields() {
        let test = TestRecord {
            data_points: vec![1.0, 2.5],
            target_pressure: Some(40.0),
            ..TestRecord::default()
        };
        let value = serde_json::to_value(&test).expect("serialise");
        assert_eq!(value["dataPoints"], serde_json::json!([1.0, 2.5]));
        assert_eq!(value["targetPressure"], serde_json::json!(40.0));
        assert!(value.get("normalRangeLow").is_none());
    }
}
