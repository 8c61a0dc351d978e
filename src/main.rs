//! Design Agent Team — Binary Entrypoint
//! Boots the Axum HTTP server with the model, scoring defaults and routes.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // Picks up GEMINI_API_KEY, AI_CONFIG_PATH, ANALYSIS_CONFIG_PATH, DEBUG_ROUTES.
    let _ = dotenvy::dotenv();

    design_agent_team::telemetry::init_tracing();

    let router = design_agent_team::app().await?;
    Ok(router.into())
}
