//! # jsonviz Core
//!
//! Pure pipelines behind the JSON validation and visualisation tool:
//! - Validation: parse, optional JSON Schema check, normalised error list
//! - Formatting with located syntax errors
//! - Statistics and chart annotations for CMG pressure tests
//! - Share-link encoding and resolution
//! - Card and table view models
//!
//! **No API concerns**: HTTP servers, the admin gate and the report store client live in
//! `api-rest`, `api-shared` and `report-store`.

pub mod annotations;
pub mod cache;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod schema;
pub mod share;
pub mod stats;
pub mod time;
pub mod validation;
pub mod view;

pub use annotations::{
    build_annotations, build_overlay, AnnotationSet, ChartOverlay, ChartStyle, Highlight,
    PointTooltip,
};
pub use cache::DocumentCache;
pub use config::{CoreConfig, ReportSource};
pub use error::{CoreError, CoreResult};
pub use format::{format_json, FormatError};
pub use schema::CompiledSchema;
pub use share::{resolve_shared, RecordCache, SharedParams, SharedRecord, ShareKind};
pub use stats::{compute_stats, StatsResult};
pub use validation::{parse_document, validate, SyntaxError, ValidationError, ValidationOutcome};

pub use jsonviz_types::JsonNode;
