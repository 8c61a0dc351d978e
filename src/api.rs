//! HTTP surface for the browser front-end.
//!
//! - `GET  /health`
//! - `GET  /api/focus-areas`
//! - `POST /api/analyze`  (images inline as base64; server paths are not accepted)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tower_http::cors::CorsLayer;

use crate::agent::{DynModel, ImageRef};
use crate::category::{Category, Strictness, FOCUS_AREAS};
use crate::config::AnalysisDefaults;
use crate::error::{AnalysisError, ConfigError};
use crate::normalize::validate_stability;
use crate::pipeline::{run_analysis, AnalysisReport, AnalysisRun};

#[derive(Clone)]
pub struct AppState {
    pub model: DynModel,
    pub defaults: AnalysisDefaults,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/focus-areas", get(focus_areas))
        .route("/api/analyze", post(analyze))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct FocusAreaOut {
    key: &'static str,
    label: &'static str,
}

async fn focus_areas() -> Json<Vec<FocusAreaOut>> {
    Json(
        FOCUS_AREAS
            .iter()
            .map(|&(key, label)| FocusAreaOut { key, label })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeReq {
    pub categories: Vec<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub images: Vec<ImageIn>,
    #[serde(default)]
    pub competitor_images: Vec<ImageIn>,
    pub strictness: Option<String>,
    pub stability: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ImageIn {
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data_base64: String,
}

#[derive(Debug)]
pub enum ApiError {
    Analysis(AnalysisError),
    BadImage(String),
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError::Analysis(e)
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        ApiError::Analysis(e.into())
    }
}

#[derive(Serialize)]
struct ErrorOut {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::Analysis(e) => ErrorOut {
                error: e.kind(),
                message: e.to_string(),
            },
            ApiError::BadImage(message) => ErrorOut {
                error: "bad_image",
                message,
            },
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl AnalyzeReq {
    /// Resolve labels and defaults into a pipeline run. Unknown labels fail here.
    pub fn into_run(self, defaults: &AnalysisDefaults) -> Result<AnalysisRun, ApiError> {
        let categories: BTreeSet<Category> = self
            .categories
            .iter()
            .map(|c| c.parse::<Category>())
            .collect::<Result<_, ConfigError>>()?;

        let strictness = match self.strictness.as_deref() {
            Some(label) => label.parse::<Strictness>()?,
            None => defaults.strictness,
        };
        let stability = validate_stability(self.stability.unwrap_or(defaults.stability))?;

        let mut focus_areas: Vec<String> = Vec::new();
        for f in self.focus_areas {
            let t = f.trim();
            if !t.is_empty() && !focus_areas.iter().any(|x| x == t) {
                focus_areas.push(t.to_string());
            }
        }

        Ok(AnalysisRun {
            categories,
            focus_areas,
            context: self.context,
            design_images: decode_images(self.images)?,
            competitor_images: decode_images(self.competitor_images)?,
            strictness,
            stability,
        })
    }
}

fn decode_images(items: Vec<ImageIn>) -> Result<Vec<ImageRef>, ApiError> {
    items
        .into_iter()
        .map(|img| {
            let data = general_purpose::STANDARD
                .decode(img.data_base64.trim())
                .map_err(|e| ApiError::BadImage(format!("{}: {e}", img.name)))?;
            let mime_type = img.mime_type.unwrap_or_else(|| {
                crate::agent::mime_from_path(std::path::Path::new(&img.name)).to_string()
            });
            Ok(ImageRef::Bytes {
                name: img.name,
                mime_type,
                data,
            })
        })
        .collect()
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let run = body.into_run(&state.defaults)?;
    let report = run_analysis(state.model.clone(), run).await?;
    Ok(Json(report))
}
