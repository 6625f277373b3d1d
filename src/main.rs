use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_state, router};
use jsonviz_core::CoreConfig;

/// Main entry point for the jsonviz application
///
/// Resolves configuration once, compiles the schema, builds the report store client and
/// serves the REST API with Swagger UI at `/swagger-ui`.
///
/// # Environment Variables
/// - `JSONVIZ_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `JSONVIZ_SCHEMA_PATH`: JSON Schema file (default: built-in object-or-array schema)
/// - `JSONVIZ_BACKEND_URL`: Report backend base URL
/// - `JSONVIZ_GIST_API`: Gist API base URL, used when no backend is set
/// - `GITHUB_TOKEN` / `ENCRYPTED_GITHUB_TOKEN` + `TOKEN_KEY`: Gist API credential
/// - `ADMIN_PASSWORD`: Admin gate secret
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jsonviz_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("report_store=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env()?;
    let rest_addr = cfg.rest_addr().to_string();
    if let Some(path) = cfg.schema_path() {
        tracing::info!("++ Using schema {}", path.display());
    }

    let state = build_state(cfg)?;

    tracing::info!("++ Starting jsonviz REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
