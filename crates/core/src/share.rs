//! Share links.
//!
//! A record travels in one of three forms:
//! - `data`: the whole record (series truncated) as URL-safe base64 JSON
//! - `qr`: a small `{patientId, name, requiredData}` payload resolved against local data
//! - `pid` + `name`: plain identity parameters
//!
//! Decoding accepts both base64 alphabets, with or without padding, so links produced by
//! older clients keep working.

use crate::constants::SHARE_POINT_LIMIT;
use crate::{CoreError, CoreResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

/// Which form of link to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    #[default]
    Data,
    Qr,
    Identity,
}

impl FromStr for ShareKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(ShareKind::Data),
            "qr" => Ok(ShareKind::Qr),
            "identity" => Ok(ShareKind::Identity),
            other => Err(CoreError::InvalidInput(format!(
                "unknown share kind '{other}' (expected 'data', 'qr' or 'identity')"
            ))),
        }
    }
}

/// Query parameters a shared link may carry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SharedParams {
    pub data: Option<String>,
    pub qr: Option<String>,
    pub pid: Option<String>,
    pub name: Option<String>,
}

/// What a shared link resolved to.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SharedRecord {
    /// The record was embedded in the link. `truncated` is set when any series was cut.
    Full { record: Value, truncated: bool },
    /// The link named a patient found in local data.
    Cached { record: Value },
    /// The link named a patient that is not available locally.
    Minimal {
        #[serde(rename = "patientId")]
        patient_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    None,
}

/// Local record lookup used to resolve QR and identity links.
pub trait RecordCache {
    fn lookup(&self, patient_id: &str) -> Option<Value>;
}

/// A fixed set of records keyed by patient id.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecordCache {
    records: HashMap<String, Value>,
}

impl MemoryRecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every record in `document` (object or array of objects) by its `patientId`.
    pub fn from_document(document: &Value) -> Self {
        let mut cache = Self::new();
        for record in records_in(document) {
            if let Some(id) = record.get("patientId").and_then(id_text) {
                cache.records.insert(id, record.clone());
            }
        }
        cache
    }
}

impl RecordCache for MemoryRecordCache {
    fn lookup(&self, patient_id: &str) -> Option<Value> {
        self.records.get(patient_id).cloned()
    }
}

/// Find the record with this patient id in an object or array document.
pub fn find_record(document: &Value, patient_id: &str) -> Option<Value> {
    records_in(document)
        .find(|record| {
            record
                .get("patientId")
                .and_then(id_text)
                .is_some_and(|id| id == patient_id)
        })
        .cloned()
}

fn records_in(document: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match document {
        Value::Array(items) => Box::new(items.iter().filter(|item| item.is_object())),
        Value::Object(_) => Box::new(std::iter::once(document)),
        _ => Box::new(std::iter::empty()),
    }
}

/// Text form of an id that may be a string or a number.
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Cap every nested `dataPoints` array at the share limit, recording the original length
/// in `dataPointsCount`.
pub fn truncate_for_share(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(truncate_for_share).collect()),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                out.insert(key.clone(), truncate_for_share(child));
            }
            if let Some(Value::Array(points)) = map.get("dataPoints") {
                if points.len() > SHARE_POINT_LIMIT {
                    out.insert(
                        "dataPoints".into(),
                        Value::Array(points[..SHARE_POINT_LIMIT].to_vec()),
                    );
                    out.insert("dataPointsCount".into(), json!(points.len()));
                }
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// True when some nested series is shorter than its recorded `dataPointsCount`.
pub fn is_truncated(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(is_truncated),
        Value::Object(map) => {
            let cut = match (map.get("dataPointsCount"), map.get("dataPoints")) {
                (Some(count), Some(Value::Array(points))) => count
                    .as_u64()
                    .is_some_and(|count| count > points.len() as u64),
                _ => false,
            };
            cut || map.values().any(is_truncated)
        }
        _ => false,
    }
}

/// JSON-serialise and base64 (URL-safe, unpadded) encode a payload.
pub fn encode_payload(value: &Value) -> CoreResult<String> {
    let bytes = serde_json::to_vec(value).map_err(CoreError::Serialization)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Decode a `data` or `qr` parameter back into JSON.
///
/// Standard and URL-safe alphabets are both accepted, padded or not. A `+` that a query
/// decoder turned into a space is restored.
pub fn decode_share_param(param: &str) -> CoreResult<Value> {
    let normalised: String = param
        .chars()
        .filter(|c| !matches!(c, '=' | '\n' | '\r' | '\t'))
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD
        .decode(normalised.as_bytes())
        .map_err(CoreError::ShareDecode)?;
    serde_json::from_slice(&bytes).map_err(CoreError::Deserialization)
}

/// Link embedding the whole (truncated) record.
pub fn build_share_url(base: &str, record: &Value) -> CoreResult<String> {
    let payload = encode_payload(&truncate_for_share(record))?;
    with_query(base, &[("data", payload.as_str())])
}

/// Link embedding just enough to look the patient up again.
pub fn build_qr_url(base: &str, record: &Value) -> CoreResult<String> {
    let payload = json!({
        "patientId": record.get("patientId").cloned().unwrap_or(Value::Null),
        "name": record.get("name").cloned().unwrap_or(Value::Null),
        "requiredData": true,
    });
    with_query(base, &[("qr", encode_payload(&payload)?.as_str())])
}

/// Link carrying plain `pid` and `name` parameters. Absent values are left out.
pub fn build_identity_url(
    base: &str,
    patient_id: Option<&str>,
    name: Option<&str>,
) -> CoreResult<String> {
    let mut params = Vec::with_capacity(2);
    if let Some(pid) = patient_id.filter(|p| !p.is_empty()) {
        params.push(("pid", pid));
    }
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        params.push(("name", name));
    }
    with_query(base, &params)
}

/// Build a link of the requested kind for a record.
pub fn build_link(kind: ShareKind, base: &str, record: &Value) -> CoreResult<String> {
    match kind {
        ShareKind::Data => build_share_url(base, record),
        ShareKind::Qr => build_qr_url(base, record),
        ShareKind::Identity => {
            let pid = record.get("patientId").and_then(id_text);
            let name = record.get("name").and_then(Value::as_str);
            build_identity_url(base, pid.as_deref(), name)
        }
    }
}

/// `mailto:` link offering the share URL.
pub fn email_share_link(share_url: &str) -> String {
    let body = format!("I'd like to share this patient information with you: {share_url}");
    format!(
        "mailto:?subject={}&body={}",
        urlencoding::encode("Patient Information"),
        urlencoding::encode(&body)
    )
}

/// WhatsApp deep link offering the share URL.
pub fn whatsapp_share_link(share_url: &str) -> String {
    let text = format!("Patient Information: {share_url}");
    format!("https://wa.me/?text={}", urlencoding::encode(&text))
}

/// Resolve the parameters of an incoming shared link.
///
/// `data` wins over `qr`, which wins over `pid`. Undecodable payloads are errors; a
/// patient missing from the cache falls back to [`SharedRecord::Minimal`].
pub fn resolve_shared(
    params: &SharedParams,
    cache: &impl RecordCache,
) -> CoreResult<SharedRecord> {
    if let Some(data) = params.data.as_deref().filter(|d| !d.is_empty()) {
        let record = decode_share_param(data)?;
        let truncated = is_truncated(&record);
        if truncated {
            tracing::debug!("shared record carries a truncated series");
        }
        return Ok(SharedRecord::Full { record, truncated });
    }

    if let Some(qr) = params.qr.as_deref().filter(|q| !q.is_empty()) {
        let payload = decode_share_param(qr)?;
        let Some(patient_id) = payload.get("patientId").and_then(id_text) else {
            return Err(CoreError::InvalidInput("qr payload has no patientId".into()));
        };
        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Ok(from_cache(cache, patient_id, name));
    }

    if let Some(pid) = params.pid.as_deref().filter(|p| !p.is_empty()) {
        return Ok(from_cache(cache, pid.to_string(), params.name.clone()));
    }

    Ok(SharedRecord::None)
}

fn from_cache(cache: &impl RecordCache, patient_id: String, name: Option<String>) -> SharedRecord {
    match cache.lookup(&patient_id) {
        Some(record) => SharedRecord::Cached { record },
        None => {
            tracing::debug!(%patient_id, "shared patient not in local data");
            SharedRecord::Minimal { patient_id, name }
        }
    }
}

/// Append query parameters to an absolute base URL, keeping any existing query.
fn with_query(base: &str, params: &[(&str, &str)]) -> CoreResult<String> {
    let mut url = Url::parse(base)
        .map_err(|e| CoreError::InvalidInput(format!("invalid base URL '{base}': {e}")))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url.into())
}
