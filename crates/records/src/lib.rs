//! Patient record wire models.
//!
//! This crate provides the serde models for the documents users upload and share:
//! - patient records carrying one or more CMG pressure tests
//! - test records (`dataPoints`, timestamped notes, thresholds)
//!
//! Parsing goes through `serde_path_to_error` so a shape mismatch names the failing
//! field (for example `[0].cmgTests[1].dataPoints[3]`).

pub mod cmg;
pub mod patient;

pub use cmg::{Note, NoteColor, TestRecord};
pub use patient::{PatientRecord, RecordId, Records};

/// Errors returned by the `records` crate.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`RecordError`].
pub type RecordResult<T> = Result<T, RecordError>;
