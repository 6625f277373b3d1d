//! Request and response bodies for the REST API.
//!
//! Pipeline outputs from `jsonviz-core` are carried as-is; their OpenAPI schema is a
//! generic object.

use jsonviz_core::annotations::{ChartOverlay, ChartStyle, Highlight};
use jsonviz_core::format::FormatError;
use jsonviz_core::share::ShareKind;
use jsonviz_core::stats::StatsResult;
use jsonviz_core::validation::{ValidationError, ValidationOutcome};
use jsonviz_core::view::{Card, PatientSummary, TableRow};
use records::TestRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateReq {
    /// Raw document text.
    pub text: String,
    /// Schema to use instead of the configured one.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub schema: Option<Value>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRes {
    pub valid: bool,
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<ValidationError>,
    /// Each error prefixed with its line, for display.
    pub messages: Vec<String>,
}

impl From<ValidationOutcome> for ValidateRes {
    fn from(outcome: ValidationOutcome) -> Self {
        let messages = outcome.errors.iter().map(ValidationError::full_message).collect();
        Self {
            valid: outcome.valid,
            errors: outcome.errors,
            messages,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FormatReq {
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FormatRes {
    pub formatted: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct FormatFailureRes {
    #[schema(value_type = Object)]
    pub error: FormatError,
    /// Multi-line rendering with the offending line and a caret.
    pub rendered: String,
}

impl From<FormatError> for FormatFailureRes {
    fn from(error: FormatError) -> Self {
        let rendered = error.render();
        Self { error, rendered }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadReq {
    pub text: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRes {
    pub valid: bool,
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<ValidationError>,
    /// Whether the document replaced the last validated document.
    pub stored: bool,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedDocumentRes {
    #[schema(value_type = Object)]
    pub document: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsReq {
    pub data_points: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct StatsRes {
    /// Absent when there were no samples.
    #[schema(value_type = Option<Object>)]
    pub stats: Option<StatsResult>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationsReq {
    #[schema(value_type = Object)]
    pub test: TestRecord,
    #[serde(default)]
    #[schema(value_type = String)]
    pub highlight: Highlight,
    #[serde(default)]
    #[schema(value_type = String)]
    pub chart_type: ChartStyle,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub compare_with: Option<TestRecord>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct AnnotationsRes {
    #[schema(value_type = Object)]
    pub overlay: ChartOverlay,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ViewReq {
    #[schema(value_type = Object)]
    pub document: Value,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CardsRes {
    #[schema(value_type = Vec<Object>)]
    pub cards: Vec<Card>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TableRes {
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PatientsRes {
    #[schema(value_type = Vec<Object>)]
    pub patients: Vec<PatientSummary>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareReq {
    #[serde(default)]
    #[schema(value_type = String)]
    pub kind: ShareKind,
    pub base_url: String,
    #[schema(value_type = Object)]
    pub record: Value,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ShareRes {
    pub url: String,
    pub email: String,
    pub whatsapp: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminLoginReq {
    pub password: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ReportsRes {
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonviz_core::validation::validate;
    use serde_json::json;

    #[test]
    fn validate_res_carries_display_messages() {
        let res = ValidateRes::from(validate("[1,\n2,\n]", None));
        assert!(!res.valid);
        assert_eq!(res.messages.len(), 1);
        assert!(res.messages[0].starts_with("Error on line 3: "));
    }

    #[test]
    fn annotations_req_defaults_modes() {
        let req: AnnotationsReq =
            serde_json::from_value(json!({"test": {"dataPoints": [1, 2]}})).expect("parse");
        assert_eq!(req.highlight, Highlight::None);
        assert_eq!(req.chart_type, ChartStyle::Smooth);
        assert!(req.compare_with.is_none());

        let req: AnnotationsReq = serde_json::from_value(json!({
            "test": {"dataPoints": []},
            "highlight": "anomalies",
            "chartType": "stepped"
        }))
        .expect("parse");
        assert_eq!(req.highlight, Highlight::Anomalies);
        assert_eq!(req.chart_type, ChartStyle::Stepped);
    }

    #[test]
    fn share_req_defaults_to_data_links() {
        let req: ShareReq = serde_json::from_value(json!({
            "baseUrl": "https://viz.example/",
            "record": {"patientId": "P-1"}
        }))
        .expect("parse");
        assert_eq!(req.kind, ShareKind::Data);
    }
}
