//! Constants used throughout the jsonviz core crate.
//!
//! Environment variable names, defaults and pipeline thresholds live here so the
//! binaries and the library agree on them.

/// Default REST listen address when `JSONVIZ_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// REST listen address.
pub const ENV_REST_ADDR: &str = "JSONVIZ_REST_ADDR";

/// Base URL of the report backend (`<backend>/api/v1/reports`).
pub const ENV_BACKEND_URL: &str = "JSONVIZ_BACKEND_URL";

/// Base URL of a gist-hosting API used instead of the report backend.
pub const ENV_GIST_API: &str = "JSONVIZ_GIST_API";

/// Plain bearer token for the gist API.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// AES-GCM encrypted bearer token for the gist API.
pub const ENV_ENCRYPTED_GITHUB_TOKEN: &str = "ENCRYPTED_GITHUB_TOKEN";

/// Passphrase for `ENCRYPTED_GITHUB_TOKEN`.
pub const ENV_TOKEN_KEY: &str = "TOKEN_KEY";

/// Shared secret for the admin gate.
pub const ENV_ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";

/// Optional JSON Schema file; the built-in object-or-array schema is used otherwise.
pub const ENV_SCHEMA_PATH: &str = "JSONVIZ_SCHEMA_PATH";

/// Cache slot for the last successfully parsed document.
pub const VALIDATED_DOCUMENT_KEY: &str = "validatedJSON";

/// Cache slot for the editor text that produced the validated document.
pub const EDITOR_TEXT_KEY: &str = "editorJSON";

/// Cache slot for the raw text of the last upload.
pub const UPLOADED_TEXT_KEY: &str = "uploadedJSON";

/// Samples kept per test when a record is embedded in a share link.
pub const SHARE_POINT_LIMIT: usize = 20;

/// Anomaly threshold in population standard deviations.
pub const ANOMALY_SIGMA: f64 = 2.0;

/// Fraction of the series maximum used when a test has no target pressure.
pub const DEFAULT_TARGET_RATIO: f64 = 0.75;

/// Entries previewed on a card before collapsing into "+N more".
pub const CARD_PREVIEW_LIMIT: usize = 8;
