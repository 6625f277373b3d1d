//! # API Shared
//!
//! Shared definitions for the jsonviz APIs.
//!
//! Contains:
//! - Request/response types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - The admin gate
//!
//! Used by `api-rest` and the CLI.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{AdminGate, AuthError};
pub use dto::*;
pub use health::HealthService;
