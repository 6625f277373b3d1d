use crate::dto::HealthRes;

/// Health service behind `GET /health`.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Static health check; no instance needed.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "jsonviz is alive".into(),
        }
    }
}
