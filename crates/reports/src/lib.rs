//! # Report store
//!
//! Read-only client for the remote store that holds uploaded report documents, either the
//! report backend (`/api/v1/reports`) or a gist-hosting API (`/gists`).
//!
//! The client is built once at startup from [`jsonviz_core::CoreConfig`] and handed to
//! whoever needs it. There are no retries, timeouts or caching.

pub mod client;
pub mod credential;

pub use client::{Backend, ReportClient};
pub use credential::Credential;

use jsonviz_core::SyntaxError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("report store returned status {0}")]
    Status(u16),
    #[error("report {0} has no files")]
    MissingFile(String),
    #[error("report content is not valid JSON: {0}")]
    Content(SyntaxError),
    #[error("unexpected report store payload: {0}")]
    UnexpectedPayload(String),
    #[error("invalid report id: {0:?}")]
    InvalidId(String),
    #[error("credential error: {0}")]
    Credential(String),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
