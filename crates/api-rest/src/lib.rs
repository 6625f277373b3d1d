//! # API REST
//!
//! REST API implementation for jsonviz.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response types and the admin gate, and `jsonviz-core`
//! for every pipeline. The only mutable state is the in-memory [`DocumentCache`].

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    AdminGate, AdminLoginReq, AnnotationsReq, AnnotationsRes, AuthError, CardsRes,
    FormatFailureRes, FormatReq, FormatRes, HealthRes, HealthService, PatientsRes, ReportsRes,
    ShareReq, ShareRes, StatsReq, StatsRes, TableRes, UploadReq, UploadRes, ValidateReq,
    ValidateRes, ValidatedDocumentRes, ViewReq,
};
use jsonviz_core::{
    annotations::build_overlay,
    format::format_json,
    share::{
        build_link, email_share_link, resolve_shared, whatsapp_share_link, SharedParams,
        SharedRecord,
    },
    stats::compute_stats,
    validation::{accept_upload, parse_document, validate},
    view::{cards, flatten, patient_summaries},
    CompiledSchema, CoreConfig, CoreError, DocumentCache, JsonNode,
};
use records::Records;
use report_store::{ReportClient, ReportError};

type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers
///
/// Everything except the document cache is resolved once at startup.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub schema: Arc<CompiledSchema>,
    pub reports: Option<ReportClient>,
    pub gate: AdminGate,
    pub documents: Arc<RwLock<DocumentCache>>,
}

/// Build the handler state from configuration.
///
/// # Errors
///
/// Returns an error if the configured schema cannot be loaded or compiled, or the report
/// store credential cannot be resolved.
pub fn build_state(cfg: CoreConfig) -> anyhow::Result<AppState> {
    let schema = cfg.compiled_schema()?;
    let reports = ReportClient::from_config(&cfg)?;
    let gate = AdminGate::new(cfg.admin_password());

    if reports.is_none() {
        tracing::warn!("no report store configured; admin listing is disabled");
    }
    if !gate.is_configured() {
        tracing::warn!("no admin password configured; admin login is disabled");
    }

    Ok(AppState {
        cfg: Arc::new(cfg),
        schema: Arc::new(schema),
        reports,
        gate,
        documents: Arc::new(RwLock::new(DocumentCache::new())),
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        validate_document,
        format_document,
        upload_document,
        validated_document,
        stats,
        annotations,
        view_cards,
        view_table,
        view_patients,
        share,
        shared,
        admin_login,
        get_report,
    ),
    components(schemas(
        HealthRes,
        ValidateReq,
        ValidateRes,
        FormatReq,
        FormatRes,
        FormatFailureRes,
        UploadReq,
        UploadRes,
        ValidatedDocumentRes,
        StatsReq,
        StatsRes,
        AnnotationsReq,
        AnnotationsRes,
        ViewReq,
        CardsRes,
        TableRes,
        PatientsRes,
        ShareReq,
        ShareRes,
        AdminLoginReq,
        ReportsRes,
    ))
)]
pub struct ApiDoc;

/// The full REST router, with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/validate", post(validate_document))
        .route("/format", post(format_document))
        .route("/upload", post(upload_document))
        .route("/documents/validated", get(validated_document))
        .route("/stats", post(stats))
        .route("/annotations", post(annotations))
        .route("/view/cards", post(view_cards))
        .route("/view/table", post(view_table))
        .route("/view/patients", post(view_patients))
        .route("/share", post(share))
        .route("/shared", get(shared))
        .route("/admin/login", post(admin_login))
        .route("/reports/:id", get(get_report))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/validate",
    request_body = ValidateReq,
    responses(
        (status = 200, description = "Validation outcome", body = ValidateRes),
        (status = 400, description = "Supplied schema does not compile")
    )
)]
/// Validate document text
///
/// Uses the supplied schema when one is given, otherwise the configured schema. A valid
/// document becomes the last validated document.
///
/// # Errors
/// Returns `400 Bad Request` if the supplied schema does not compile.
#[axum::debug_handler]
async fn validate_document(
    State(state): State<AppState>,
    Json(req): Json<ValidateReq>,
) -> Result<Json<ValidateRes>, ApiError> {
    let custom = match &req.schema {
        Some(schema) => Some(CompiledSchema::compile(schema).map_err(|e| {
            tracing::debug!("rejecting supplied schema: {e}");
            (StatusCode::BAD_REQUEST, "Invalid schema")
        })?),
        None => None,
    };
    let schema = custom.as_ref().unwrap_or(state.schema.as_ref());

    let outcome = validate(&req.text, Some(schema));
    if outcome.valid {
        if let Ok(document) = parse_document(&req.text) {
            state
                .documents
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .store_validated(document, Some(req.text.clone()));
        }
    }

    tracing::info!(valid = outcome.valid, errors = outcome.errors.len(), "validated document");
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/format",
    request_body = FormatReq,
    responses(
        (status = 200, description = "Formatted document", body = FormatRes),
        (status = 422, description = "Document is not JSON", body = FormatFailureRes)
    )
)]
/// Pretty-print document text with 2-space indentation
///
/// # Errors
/// Returns `422 Unprocessable Entity` with the located syntax error.
#[axum::debug_handler]
async fn format_document(
    Json(req): Json<FormatReq>,
) -> Result<Json<FormatRes>, (StatusCode, Json<FormatFailureRes>)> {
    format_json(&req.text)
        .map(|formatted| Json(FormatRes { formatted }))
        .map_err(|err| (StatusCode::UNPROCESSABLE_ENTITY, Json(err.into())))
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body = UploadReq,
    responses(
        (status = 200, description = "Upload outcome", body = UploadRes)
    )
)]
/// Accept an uploaded file
///
/// The raw text is always kept; the parsed document replaces the last validated document
/// only when it passes validation.
#[axum::debug_handler]
async fn upload_document(
    State(state): State<AppState>,
    Json(req): Json<UploadReq>,
) -> Json<UploadRes> {
    let mut documents = state
        .documents
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    documents.store_upload(req.text.clone());

    let res = match accept_upload(&req.text, Some(&state.schema)) {
        Ok(upload) if upload.outcome.valid => {
            documents.store_validated(upload.document, None);
            UploadRes {
                valid: true,
                errors: Vec::new(),
                stored: true,
            }
        }
        Ok(upload) => UploadRes {
            valid: false,
            errors: upload.outcome.errors,
            stored: false,
        },
        Err(err) => UploadRes {
            valid: false,
            errors: vec![err.to_validation_error(&req.text)],
            stored: false,
        },
    };

    tracing::info!(valid = res.valid, stored = res.stored, "processed upload");
    Json(res)
}

#[utoipa::path(
    get,
    path = "/documents/validated",
    responses(
        (status = 200, description = "Last validated document", body = ValidatedDocumentRes),
        (status = 404, description = "Nothing validated yet")
    )
)]
/// Return the last validated document
///
/// # Errors
/// Returns `404 Not Found` if no document has been validated.
#[axum::debug_handler]
async fn validated_document(
    State(state): State<AppState>,
) -> Result<Json<ValidatedDocumentRes>, ApiError> {
    let documents = state
        .documents
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    let document = documents
        .validated()
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "No validated document"))?;
    Ok(Json(ValidatedDocumentRes {
        document,
        editor_text: documents.editor_text().map(str::to_string),
    }))
}

#[utoipa::path(
    post,
    path = "/stats",
    request_body = StatsReq,
    responses(
        (status = 200, description = "Series statistics", body = StatsRes)
    )
)]
/// Descriptive statistics for a series
#[axum::debug_handler]
async fn stats(Json(req): Json<StatsReq>) -> Json<StatsRes> {
    Json(StatsRes {
        stats: compute_stats(&req.data_points),
    })
}

#[utoipa::path(
    post,
    path = "/annotations",
    request_body = AnnotationsReq,
    responses(
        (status = 200, description = "Chart overlay", body = AnnotationsRes)
    )
)]
/// Statistics, annotations and marker radii for one test chart
#[axum::debug_handler]
async fn annotations(Json(req): Json<AnnotationsReq>) -> Json<AnnotationsRes> {
    let overlay = build_overlay(
        &req.test,
        req.highlight,
        req.chart_type,
        req.compare_with.as_ref(),
    );
    Json(AnnotationsRes { overlay })
}

#[utoipa::path(
    post,
    path = "/view/cards",
    request_body = ViewReq,
    responses(
        (status = 200, description = "Card view", body = CardsRes)
    )
)]
/// Card view of a document
#[axum::debug_handler]
async fn view_cards(Json(req): Json<ViewReq>) -> Json<CardsRes> {
    Json(CardsRes {
        cards: cards(&JsonNode::from(&req.document)),
    })
}

#[utoipa::path(
    post,
    path = "/view/table",
    request_body = ViewReq,
    responses(
        (status = 200, description = "Flattened table view", body = TableRes)
    )
)]
/// Flattened key/value view of a document
#[axum::debug_handler]
async fn view_table(Json(req): Json<ViewReq>) -> Json<TableRes> {
    Json(TableRes {
        rows: flatten(&JsonNode::from(&req.document)),
    })
}

#[utoipa::path(
    post,
    path = "/view/patients",
    request_body = ViewReq,
    responses(
        (status = 200, description = "Patient list", body = PatientsRes),
        (status = 400, description = "Document is not a patient record list")
    )
)]
/// Patient list view of a document of patient records
///
/// # Errors
/// Returns `400 Bad Request` if the document does not match the patient record model.
#[axum::debug_handler]
async fn view_patients(Json(req): Json<ViewReq>) -> Result<Json<PatientsRes>, ApiError> {
    let records = Records::from_value(&req.document).map_err(|e| {
        tracing::debug!("patient view rejected document: {e}");
        (StatusCode::BAD_REQUEST, "Document is not a patient record list")
    })?;
    Ok(Json(PatientsRes {
        patients: patient_summaries(&records),
    }))
}

#[utoipa::path(
    post,
    path = "/share",
    request_body = ShareReq,
    responses(
        (status = 200, description = "Share links", body = ShareRes),
        (status = 400, description = "Base URL is not absolute"),
        (status = 500, description = "Internal server error")
    )
)]
/// Build a share link for a record, plus email and WhatsApp variants
#[axum::debug_handler]
async fn share(Json(req): Json<ShareReq>) -> Result<Json<ShareRes>, ApiError> {
    let url = build_link(req.kind, &req.base_url, &req.record).map_err(|e| match e {
        CoreError::InvalidInput(_) => {
            tracing::debug!("rejecting share request: {e}");
            (StatusCode::BAD_REQUEST, "Invalid base URL")
        }
        _ => {
            tracing::error!("Share link error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    })?;
    Ok(Json(ShareRes {
        email: email_share_link(&url),
        whatsapp: whatsapp_share_link(&url),
        url,
    }))
}

#[utoipa::path(
    get,
    path = "/shared",
    params(
        ("data" = Option<String>, Query, description = "Embedded record payload"),
        ("qr" = Option<String>, Query, description = "QR identity payload"),
        ("pid" = Option<String>, Query, description = "Patient id"),
        ("name" = Option<String>, Query, description = "Patient name")
    ),
    responses(
        (status = 200, description = "Resolved shared record, tagged by kind"),
        (status = 400, description = "Payload could not be decoded")
    )
)]
/// Resolve an incoming share link
///
/// QR and identity links are looked up in the last validated document.
///
/// # Errors
/// Returns `400 Bad Request` if a payload is not valid base64 JSON.
#[axum::debug_handler]
async fn shared(
    State(state): State<AppState>,
    Query(params): Query<SharedParams>,
) -> Result<Json<SharedRecord>, ApiError> {
    let documents = state
        .documents
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    resolve_shared(&params, &*documents).map(Json).map_err(|e| {
        tracing::debug!("rejecting share payload: {e}");
        (StatusCode::BAD_REQUEST, "Invalid share payload")
    })
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = AdminLoginReq,
    responses(
        (status = 200, description = "Every stored report", body = ReportsRes),
        (status = 401, description = "Invalid password"),
        (status = 403, description = "Admin access not configured"),
        (status = 502, description = "Report store unavailable"),
        (status = 503, description = "Report store not configured")
    )
)]
/// Check the admin password, then list every stored report
///
/// # Errors
/// Returns `401`/`403` from the gate, `503` without a report store, and `502` when the
/// listing itself fails.
#[axum::debug_handler]
async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginReq>,
) -> Result<Json<ReportsRes>, ApiError> {
    state.gate.check(&req.password).map_err(|e| {
        tracing::warn!("admin login refused: {e}");
        match e {
            AuthError::NotConfigured => (StatusCode::FORBIDDEN, "Admin access not configured"),
            AuthError::InvalidPassword => (StatusCode::UNAUTHORIZED, "Invalid password"),
        }
    })?;

    let client = state
        .reports
        .as_ref()
        .ok_or((StatusCode::SERVICE_UNAVAILABLE, "Report store not configured"))?;
    let documents = client.list_reports().await.map_err(|e| {
        tracing::error!("List reports error: {:?}", e);
        (StatusCode::BAD_GATEWAY, "Report store unavailable")
    })?;
    Ok(Json(ReportsRes { documents }))
}

#[utoipa::path(
    get,
    path = "/reports/{id}",
    params(
        ("id" = String, Path, description = "Report identifier")
    ),
    responses(
        (status = 200, description = "Report document", body = ReportsRes),
        (status = 400, description = "Invalid report id"),
        (status = 404, description = "Report not found"),
        (status = 502, description = "Report store unavailable"),
        (status = 503, description = "Report store not configured")
    )
)]
/// Fetch a single stored report, as opened from a shared report link
///
/// # Errors
/// Returns `404` when the store has no such report, `502` on any other store failure.
#[axum::debug_handler]
async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReportsRes>, ApiError> {
    let client = state
        .reports
        .as_ref()
        .ok_or((StatusCode::SERVICE_UNAVAILABLE, "Report store not configured"))?;
    let documents = client.get_report(&id).await.map_err(|e| {
        tracing::error!("Get report error: {:?}", e);
        match e {
            ReportError::InvalidId(_) => (StatusCode::BAD_REQUEST, "Invalid report id"),
            ReportError::Status(404) => (StatusCode::NOT_FOUND, "Report not found"),
            _ => (StatusCode::BAD_GATEWAY, "Report store unavailable"),
        }
    })?;
    Ok(Json(ReportsRes { documents }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use jsonviz_core::constants::{ENV_ADMIN_PASSWORD, ENV_BACKEND_URL};
    use jsonviz_core::share::encode_payload;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state_with(vars: Vec<(&'static str, String)>) -> AppState {
        let cfg = CoreConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        })
        .expect("config");
        build_state(cfg).expect("state")
    }

    fn test_state() -> AppState {
        state_with(vec![(ENV_ADMIN_PASSWORD, "letmein".into())])
    }

    async fn call(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_is_alive() {
        let (status, body) = call(router(test_state()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn valid_document_is_cached_for_viewers() {
        let state = test_state();
        let (status, body) = call(
            router(state.clone()),
            "POST",
            "/validate",
            Some(json!({"text": "[{\"patientId\": \"P-1\"}]"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], json!(true));

        let (status, body) = call(router(state), "GET", "/documents/validated", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document"], json!([{"patientId": "P-1"}]));
        assert_eq!(body["editorText"], json!("[{\"patientId\": \"P-1\"}]"));
    }

    #[tokio::test]
    async fn syntax_error_is_reported_with_line() {
        let (status, body) = call(
            router(test_state()),
            "POST",
            "/validate",
            Some(json!({"text": "[1,\n2,\n]"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], json!(false));
        assert_eq!(body["errors"][0]["keyword"], json!("syntax"));
        assert_eq!(body["errors"][0]["lineNumber"], json!(3));
    }

    #[tokio::test]
    async fn supplied_schema_overrides_configured_one() {
        let (_, body) = call(
            router(test_state()),
            "POST",
            "/validate",
            Some(json!({
                "text": "{\"age\": \"old\"}",
                "schema": {"type": "object", "properties": {"age": {"type": "number"}}}
            })),
        )
        .await;
        assert_eq!(body["valid"], json!(false));
        assert_eq!(body["errors"][0]["path"], json!("/age"));

        let (status, _) = call(
            router(test_state()),
            "POST",
            "/validate",
            Some(json!({"text": "{}", "schema": {"type": 12}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nothing_validated_is_not_found() {
        let (status, _) = call(router(test_state()), "GET", "/documents/validated", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn format_failure_is_unprocessable() {
        let (status, body) = call(
            router(test_state()),
            "POST",
            "/format",
            Some(json!({"text": "{\"a\" 1}"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["lineNumber"], json!(1));
        assert!(body["rendered"]
            .as_str()
            .is_some_and(|r| r.starts_with("Error on line 1")));
    }

    #[tokio::test]
    async fn upload_keeps_text_but_only_stores_valid_documents() {
        let state = test_state();
        let (_, body) = call(
            router(state.clone()),
            "POST",
            "/upload",
            Some(json!({"text": "{broken"})),
        )
        .await;
        assert_eq!(body["stored"], json!(false));
        assert!(state
            .documents
            .read()
            .expect("lock")
            .uploaded_text()
            .is_some());

        let (_, body) = call(
            router(state.clone()),
            "POST",
            "/upload",
            Some(json!({"text": "{\"name\": \"Ada\"}"})),
        )
        .await;
        assert_eq!(body["stored"], json!(true));
        assert_eq!(
            state.documents.read().expect("lock").validated(),
            Some(&json!({"name": "Ada"}))
        );
    }

    #[tokio::test]
    async fn annotations_endpoint_builds_overlay() {
        let (status, body) = call(
            router(test_state()),
            "POST",
            "/annotations",
            Some(json!({
                "test": {
                    "dataPoints": [10, 20, 30, 40],
                    "notes": [{"timestamp": 2, "pressure": 30, "note": "cough", "color": "#ff0000"}]
                },
                "chartType": "linear"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let annotations = body["overlay"]["annotations"]
            .as_object()
            .expect("annotation map");
        let keys: Vec<&str> = annotations.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["point0", "label0", "line0", "meanLine", "targetLine"]);
        assert_eq!(body["overlay"]["style"]["tension"], json!(0.1));
    }

    #[tokio::test]
    async fn stats_of_empty_series_are_absent() {
        let (_, body) = call(
            router(test_state()),
            "POST",
            "/stats",
            Some(json!({"dataPoints": []})),
        )
        .await;
        assert_eq!(body["stats"], Value::Null);
    }

    #[tokio::test]
    async fn views_render_cards_table_and_patients() {
        let document = json!([{
            "patientId": "P-1",
            "name": "Ada",
            "cmgTests": [{"dataPoints": [1, 2]}]
        }]);

        let (_, body) = call(
            router(test_state()),
            "POST",
            "/view/cards",
            Some(json!({ "document": document })),
        )
        .await;
        assert_eq!(body["cards"][0]["title"], json!("Item 0"));

        let (_, body) = call(
            router(test_state()),
            "POST",
            "/view/table",
            Some(json!({ "document": document })),
        )
        .await;
        assert_eq!(body["rows"][0]["key"], json!("[0].patientId"));

        let (_, body) = call(
            router(test_state()),
            "POST",
            "/view/patients",
            Some(json!({ "document": document })),
        )
        .await;
        assert_eq!(body["patients"][0]["testCount"], json!(1));

        let (status, _) = call(
            router(test_state()),
            "POST",
            "/view/patients",
            Some(json!({ "document": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn share_then_resolve_round_trip() {
        let state = test_state();
        let (status, body) = call(
            router(state.clone()),
            "POST",
            "/share",
            Some(json!({
                "kind": "qr",
                "baseUrl": "https://viz.example/",
                "record": {"patientId": "P-1", "name": "Ada"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let url = body["url"].as_str().expect("url").to_string();
        assert!(body["whatsapp"]
            .as_str()
            .is_some_and(|w| w.starts_with("https://wa.me/?text=")));

        let query = url.split('?').nth(1).expect("query");
        let (status, body) = call(router(state), "GET", &format!("/shared?{query}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"kind": "minimal", "patientId": "P-1", "name": "Ada"}));
    }

    #[tokio::test]
    async fn share_with_relative_base_is_bad_request() {
        let (status, _) = call(
            router(test_state()),
            "POST",
            "/share",
            Some(json!({"baseUrl": "/view", "record": {"patientId": "P-1"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn shared_data_link_returns_full_record() {
        let payload = encode_payload(&json!({"patientId": "P-9"})).expect("encode");
        let (status, body) = call(
            router(test_state()),
            "GET",
            &format!("/shared?data={payload}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], json!("full"));
        assert_eq!(body["truncated"], json!(false));

        let (status, _) = call(router(test_state()), "GET", "/shared?data=%21%21", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_login_checks_password_before_store() {
        let (status, _) = call(
            router(test_state()),
            "POST",
            "/admin/login",
            Some(json!({"password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            router(test_state()),
            "POST",
            "/admin/login",
            Some(json!({"password": "letmein"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = call(
            router(state_with(Vec::new())),
            "POST",
            "/admin/login",
            Some(json!({"password": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_login_lists_reports_from_backend() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let listing = json!({
            "data": [{"id": "r1", "files": {"r1.json": {"raw_url": format!("{base}/raw/r1")}}}]
        });
        let backend = Router::new()
            .route(
                "/api/v1/reports",
                get(move || {
                    let listing = listing.clone();
                    async move { Json(listing) }
                }),
            )
            .route("/raw/r1", get(|| async { "{\"patientId\": \"R-1\"}" }))
            .route(
                "/api/v1/reports/:id",
                get(|| async { StatusCode::NOT_FOUND }),
            );
        tokio::spawn(async move {
            axum::serve(listener, backend).await.expect("serve");
        });

        let state = state_with(vec![
            (ENV_ADMIN_PASSWORD, "letmein".into()),
            (ENV_BACKEND_URL, base),
        ]);
        let (status, body) = call(
            router(state.clone()),
            "POST",
            "/admin/login",
            Some(json!({"password": "letmein"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents"], json!([{"patientId": "R-1"}]));

        let (status, _) = call(router(state), "GET", "/reports/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
