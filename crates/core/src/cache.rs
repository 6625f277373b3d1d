//! In-memory document slots shared by the editor, upload and viewer paths.

use crate::constants::{EDITOR_TEXT_KEY, UPLOADED_TEXT_KEY, VALIDATED_DOCUMENT_KEY};
use crate::share::{find_record, RecordCache};
use serde_json::Value;

/// Last validated document plus the raw texts it came from.
///
/// A slot is only ever replaced whole; readers see either the old or the new value.
#[derive(Clone, Debug, Default)]
pub struct DocumentCache {
    validated: Option<Value>,
    editor_text: Option<String>,
    uploaded_text: Option<String>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document that passed validation, with the editor text that produced it.
    pub fn store_validated(&mut self, document: Value, editor_text: Option<String>) {
        tracing::debug!(slot = VALIDATED_DOCUMENT_KEY, "replacing validated document");
        self.validated = Some(document);
        if let Some(text) = editor_text {
            tracing::debug!(slot = EDITOR_TEXT_KEY, bytes = text.len(), "replacing editor text");
            self.editor_text = Some(text);
        }
    }

    pub fn store_upload(&mut self, text: String) {
        tracing::debug!(slot = UPLOADED_TEXT_KEY, bytes = text.len(), "replacing upload");
        self.uploaded_text = Some(text);
    }

    pub fn validated(&self) -> Option<&Value> {
        self.validated.as_ref()
    }

    pub fn editor_text(&self) -> Option<&str> {
        self.editor_text.as_deref()
    }

    pub fn uploaded_text(&self) -> Option<&str> {
        self.uploaded_text.as_deref()
    }
}

impl RecordCache for DocumentCache {
    fn lookup(&self, patient_id: &str) -> Option<Value> {
        self.validated
            .as_ref()
            .and_then(|document| find_record(document, patient_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slots_are_independent() {
        let mut cache = DocumentCache::new();
        cache.store_upload("{\"a\":1}".into());
        assert!(cache.validated().is_none());
        assert_eq!(cache.uploaded_text(), Some("{\"a\":1}"));

        cache.store_validated(json!({"a": 1}), Some("{\"a\": 1}".into()));
        assert_eq!(cache.validated(), Some(&json!({"a": 1})));
        assert_eq!(cache.editor_text(), Some("{\"a\": 1}"));
        assert_eq!(cache.uploaded_text(), Some("{\"a\":1}"));
    }

    #[test]
    fn upload_path_keeps_previous_editor_text() {
        let mut cache = DocumentCache::new();
        cache.store_validated(json!(1), Some("1".into()));
        cache.store_validated(json!(2), None);
        assert_eq!(cache.validated(), Some(&json!(2)));
        assert_eq!(cache.editor_text(), Some("1"));
    }

    #[test]
    fn looks_up_patients_in_validated_document() {
        let mut cache = DocumentCache::new();
        assert!(cache.lookup("P-1").is_none());

        cache.store_validated(json!([{"patientId": "P-1", "name": "Ada"}]), None);
        let found = cache.lookup("P-1").expect("cached patient");
        assert_eq!(found["name"], json!("Ada"));
        assert!(cache.lookup("P-2").is_none());
    }
}
