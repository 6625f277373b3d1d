//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services.
//! Nothing reads process-wide environment variables while handling a request.

use crate::constants::{
    DEFAULT_REST_ADDR, ENV_ADMIN_PASSWORD, ENV_BACKEND_URL, ENV_ENCRYPTED_GITHUB_TOKEN,
    ENV_GIST_API, ENV_GITHUB_TOKEN, ENV_REST_ADDR, ENV_SCHEMA_PATH, ENV_TOKEN_KEY,
};
use crate::schema::{default_schema, load_schema, CompiledSchema};
use crate::{CoreError, CoreResult};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Where reports are listed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportSource {
    /// `<base>/api/v1/reports`
    Backend(String),
    /// A gist-hosting API.
    Gists(String),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    rest_addr: String,
    report_source: Option<ReportSource>,
    github_token: Option<String>,
    encrypted_github_token: Option<String>,
    token_key: Option<String>,
    admin_password: Option<String>,
    schema_path: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Blank values count as unset. When both a report backend and a gist API are
    /// configured the backend wins.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] when the listen address is blank or a token key
    /// is configured without an encrypted token.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let rest_addr = lookup(ENV_REST_ADDR).unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        if rest_addr.trim().is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "{ENV_REST_ADDR} cannot be empty"
            )));
        }

        let report_source = match (get(ENV_BACKEND_URL), get(ENV_GIST_API)) {
            (Some(backend), _) => Some(ReportSource::Backend(trim_slash(backend))),
            (None, Some(gists)) => Some(ReportSource::Gists(trim_slash(gists))),
            (None, None) => None,
        };

        let encrypted_github_token = get(ENV_ENCRYPTED_GITHUB_TOKEN);
        let token_key = get(ENV_TOKEN_KEY);
        let github_token = get(ENV_GITHUB_TOKEN);
        if token_key.is_some() && encrypted_github_token.is_none() && github_token.is_none() {
            return Err(CoreError::InvalidInput(format!(
                "{ENV_TOKEN_KEY} needs {ENV_ENCRYPTED_GITHUB_TOKEN} or {ENV_GITHUB_TOKEN}"
            )));
        }

        Ok(Self {
            rest_addr: rest_addr.trim().to_string(),
            report_source,
            github_token,
            encrypted_github_token,
            token_key,
            admin_password: lookup(ENV_ADMIN_PASSWORD).filter(|v| !v.trim().is_empty()),
            schema_path: get(ENV_SCHEMA_PATH).map(PathBuf::from),
        })
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn report_source(&self) -> Option<&ReportSource> {
        self.report_source.as_ref()
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }

    pub fn encrypted_github_token(&self) -> Option<&str> {
        self.encrypted_github_token.as_deref()
    }

    pub fn token_key(&self) -> Option<&str> {
        self.token_key.as_deref()
    }

    /// Admin secret, exactly as configured.
    pub fn admin_password(&self) -> Option<&str> {
        self.admin_password.as_deref()
    }

    pub fn schema_path(&self) -> Option<&Path> {
        self.schema_path.as_deref()
    }

    /// The configured schema document, or the built-in one.
    pub fn resolve_schema(&self) -> CoreResult<Value> {
        match &self.schema_path {
            Some(path) => load_schema(path),
            None => Ok(default_schema()),
        }
    }

    /// Load and compile the schema. Failures here are configuration faults.
    pub fn compiled_schema(&self) -> CoreResult<CompiledSchema> {
        CompiledSchema::compile(&self.resolve_schema()?)
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> CoreResult<CoreConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config(&[]).expect("config");
        assert_eq!(cfg.rest_addr(), DEFAULT_REST_ADDR);
        assert_eq!(cfg.report_source(), None);
        assert_eq!(cfg.admin_password(), None);
        assert_eq!(cfg.schema_path(), None);
        assert_eq!(cfg.resolve_schema().expect("schema"), default_schema());
    }

    #[test]
    fn backend_wins_over_gists_and_loses_trailing_slash() {
        let cfg = config(&[
            (ENV_BACKEND_URL, "https://reports.example/"),
            (ENV_GIST_API, "https://api.github.com"),
        ])
        .expect("config");
        assert_eq!(
            cfg.report_source(),
            Some(&ReportSource::Backend("https://reports.example".into()))
        );

        let cfg = config(&[(ENV_GIST_API, "https://api.github.com")]).expect("config");
        assert_eq!(
            cfg.report_source(),
            Some(&ReportSource::Gists("https://api.github.com".into()))
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[(ENV_BACKEND_URL, "  "), (ENV_ADMIN_PASSWORD, "")]).expect("config");
        assert_eq!(cfg.report_source(), None);
        assert_eq!(cfg.admin_password(), None);
    }

    #[test]
    fn admin_password_keeps_surrounding_whitespace() {
        let cfg = config(&[(ENV_ADMIN_PASSWORD, " pass ")]).expect("config");
        assert_eq!(cfg.admin_password(), Some(" pass "));
    }

    #[test]
    fn blank_listen_address_is_rejected() {
        let err = config(&[(ENV_REST_ADDR, " ")]).expect_err("blank address");
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn token_key_without_token_is_rejected() {
        let err = config(&[(ENV_TOKEN_KEY, "secret")]).expect_err("dangling key");
        assert!(matches!(err, CoreError::InvalidInput(_)));

        let cfg = config(&[(ENV_TOKEN_KEY, "secret"), (ENV_ENCRYPTED_GITHUB_TOKEN, "abc")])
            .expect("config");
        assert_eq!(cfg.token_key(), Some("secret"));
        assert_eq!(cfg.encrypted_github_token(), Some("abc"));
    }

    #[test]
    fn schema_file_is_loaded_and_compiled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("schema.json");
        std::fs::write(&path, r#"{"type": "object", "required": ["name"]}"#).expect("write");

        let cfg = config(&[(ENV_SCHEMA_PATH, path.to_str().expect("utf-8 path"))])
            .expect("config");
        let schema = cfg.compiled_schema().expect("compile");
        assert_eq!(schema.source()["required"][0], "name");
    }

    #[test]
    fn missing_schema_file_is_a_read_error() {
        let cfg = config(&[(ENV_SCHEMA_PATH, "/definitely/not/here.json")]).expect("config");
        let err = cfg.compiled_schema().expect_err("missing file");
        assert!(matches!(err, CoreError::SchemaRead(_)));
    }
}
