//! HTTP access to stored reports.
//!
//! A report is a listing entry with a `files` map; the document lives in the first
//! file, inline as `content` or behind a `raw_url`.

use crate::credential::Credential;
use crate::{ReportError, ReportResult};
use futures::future::join_all;
use jsonviz_core::config::ReportSource;
use jsonviz_core::share::id_text;
use jsonviz_core::validation::parse_document;
use jsonviz_core::CoreConfig;
use jsonviz_types::NonEmptyText;
use serde_json::Value;

const USER_AGENT: &str = concat!("jsonviz/", env!("CARGO_PKG_VERSION"));

/// Raw files fetched concurrently per batch when listing.
const FETCH_BATCH: usize = 5;

/// Which kind of store to talk to.
#[derive(Clone, Debug)]
pub enum Backend {
    /// Report backend; responses are wrapped in `{ "data": ... }`.
    Reports { base_url: String },
    /// Gist-hosting API; responses are bare.
    Gists {
        api_base: String,
        token: Option<Credential>,
    },
}

#[derive(Clone, Debug)]
pub struct ReportClient {
    http: reqwest::Client,
    backend: Backend,
}

impl ReportClient {
    pub fn new(backend: Backend) -> ReportResult<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, backend })
    }

    /// Build the client described by configuration, or `None` when no store is configured.
    ///
    /// The gist credential is resolved (and decrypted if needed) here, once.
    pub fn from_config(cfg: &CoreConfig) -> ReportResult<Option<Self>> {
        let backend = match cfg.report_source() {
            None => return Ok(None),
            Some(ReportSource::Backend(base_url)) => Backend::Reports {
                base_url: base_url.clone(),
            },
            Some(ReportSource::Gists(api_base)) => Backend::Gists {
                api_base: api_base.clone(),
                token: Credential::resolve(
                    cfg.github_token(),
                    cfg.encrypted_github_token(),
                    cfg.token_key(),
                )?,
            },
        };
        Self::new(backend).map(Some)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Fetch one report and parse its first file.
    ///
    /// The document comes back wrapped in a one-element list, the shape the viewers take.
    pub async fn get_report(&self, id: &str) -> ReportResult<Vec<Value>> {
        let id = NonEmptyText::new(id)
            .ok()
            .filter(|id| !id.as_str().contains('/'))
            .ok_or_else(|| ReportError::InvalidId(id.to_string()))?;
        let id = id.as_str();

        let url = format!("{}/{}", self.collection_url(), urlencoding::encode(id));
        let report = self.unwrap_envelope(self.fetch_json(&url).await?)?;
        let file = first_file(&report).ok_or_else(|| ReportError::MissingFile(id.to_string()))?;

        let document = match file.get("content").and_then(Value::as_str) {
            Some(content) => parse_document(content).map_err(ReportError::Content)?,
            None => match file.get("raw_url").and_then(Value::as_str) {
                Some(raw_url) => self.fetch_raw(raw_url).await?,
                None => return Err(ReportError::MissingFile(id.to_string())),
            },
        };

        tracing::info!(report = %id, "fetched report");
        Ok(vec![document])
    }

    /// Fetch every listed report's document.
    ///
    /// Raw files are fetched in batches of five. Entries without a `raw_url`, and entries
    /// whose fetch or parse fails, are logged and skipped; only a failure of the listing
    /// itself is an error.
    pub async fn list_reports(&self) -> ReportResult<Vec<Value>> {
        let listing = self.unwrap_envelope(self.fetch_json(&self.collection_url()).await?)?;
        let Value::Array(entries) = listing else {
            return Err(ReportError::UnexpectedPayload(
                "report listing is not an array".into(),
            ));
        };

        let mut sources = Vec::with_capacity(entries.len());
        for entry in &entries {
            let id = entry
                .get("id")
                .and_then(id_text)
                .unwrap_or_else(|| "<unknown>".into());
            match first_file(entry)
                .and_then(|file| file.get("raw_url"))
                .and_then(Value::as_str)
            {
                Some(raw_url) => sources.push((id, raw_url.to_string())),
                None => tracing::warn!(report = %id, "no raw_url found, skipping"),
            }
        }

        let mut documents = Vec::with_capacity(sources.len());
        for batch in sources.chunks(FETCH_BATCH) {
            let fetched = join_all(batch.iter().map(|(_, url)| self.fetch_raw(url))).await;
            for ((id, _), result) in batch.iter().zip(fetched) {
                match result {
                    Ok(document) => documents.push(document),
                    Err(err) => tracing::warn!(report = %id, error = %err, "skipping report"),
                }
            }
        }

        tracing::info!(
            listed = entries.len(),
            fetched = documents.len(),
            "fetched report listing"
        );
        Ok(documents)
    }

    fn collection_url(&self) -> String {
        match &self.backend {
            Backend::Reports { base_url } => format!("{base_url}/api/v1/reports"),
            Backend::Gists { api_base, .. } => format!("{api_base}/gists"),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match &self.backend {
            Backend::Gists {
                token: Some(token), ..
            } => request.bearer_auth(token.expose()),
            _ => request,
        }
    }

    async fn send(&self, url: &str) -> ReportResult<reqwest::Response> {
        let response = self.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "report store error status");
            return Err(ReportError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn fetch_json(&self, url: &str) -> ReportResult<Value> {
        Ok(self.send(url).await?.json().await?)
    }

    async fn fetch_raw(&self, url: &str) -> ReportResult<Value> {
        let text = self.send(url).await?.text().await?;
        parse_document(&text).map_err(ReportError::Content)
    }

    fn unwrap_envelope(&self, payload: Value) -> ReportResult<Value> {
        match (&self.backend, payload) {
            (Backend::Reports { .. }, Value::Object(mut map)) => map
                .remove("data")
                .ok_or_else(|| ReportError::UnexpectedPayload("missing data envelope".into())),
            (Backend::Reports { .. }, _) => Err(ReportError::UnexpectedPayload(
                "expected an object envelope".into(),
            )),
            (Backend::Gists { .. }, payload) => Ok(payload),
        }
    }
}

fn first_file(report: &Value) -> Option<&Value> {
    report.get("files")?.as_object()?.values().next()
}
