// src/lib.rs
// Public library surface for the binary, integration tests and reuse.

pub mod aggregate;
pub mod agent;
pub mod api;
pub mod category;
pub mod config;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, CompositeResult};
pub use crate::agent::{build_model, DesignModel, DynModel, ImageRef, MockModel};
pub use crate::api::{router, AppState};
pub use crate::category::{Category, Strictness};
pub use crate::error::{AnalysisError, ConfigError};
pub use crate::extract::{extract, parse_response, ExtractedResult, ParsedResponse, RawModelResponse};
pub use crate::normalize::{normalize, NormalizedResult};
pub use crate::pipeline::{run_analysis, AnalysisReport, AnalysisRequest, AnalysisRun};
pub use crate::prompt::build_prompt;

use tracing::info;

/// Env gate for `/metrics`.
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

/// Build the full application router from on-disk config and environment.
///
/// Loads `config/ai.json` + `config/analysis.toml`, builds the model and mounts
/// `/metrics` when `DEBUG_ROUTES=1`.
pub async fn app() -> anyhow::Result<axum::Router> {
    let ai_cfg = config::AiConfig::load_default()?;
    let defaults = config::AnalysisDefaults::load_default()?;
    let model = build_model(&ai_cfg)?;

    info!(
        provider = model.provider_name(),
        model = ai_cfg.model_id(),
        key_len = ai_cfg.api_key.len(),
        strictness = %defaults.strictness,
        stability = defaults.stability,
        "design agent team configured"
    );

    let mut router = api::router(AppState { model, defaults });

    if std::env::var(ENV_DEBUG_ROUTES).ok().as_deref() == Some("1") {
        let m = telemetry::Metrics::global()?;
        router = router.merge(m.router());
    }

    Ok(router)
}
