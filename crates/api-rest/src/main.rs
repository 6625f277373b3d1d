//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Development and debugging of the REST surface (with OpenAPI/Swagger UI). The
//! workspace's main `jsonviz-run` binary serves the same router.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_state, router};
use jsonviz_core::CoreConfig;

/// Main entry point for the jsonviz REST API server
///
/// # Environment Variables
/// - `JSONVIZ_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `JSONVIZ_SCHEMA_PATH`: Optional JSON Schema file
/// - `JSONVIZ_BACKEND_URL` / `JSONVIZ_GIST_API`: Report store
/// - `ADMIN_PASSWORD`: Admin gate secret
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration or the schema is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env()?;
    let addr = cfg.rest_addr().to_string();
    let state = build_state(cfg)?;

    tracing::info!("-- Starting jsonviz REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
