//! Error taxonomy for an analysis run.
//!
//! Configuration errors abort the whole run before any model call.
//! Input validation failures are reported to the caller the same way but are
//! kept distinct so the front-end can show a friendly message.
//! Collaborator failures are NOT errors at this level: the pipeline folds them
//! into a degraded per-category entry (see `pipeline`).

use thiserror::Error;

/// Setup mistakes: bad knobs or labels supplied by the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Stability must lie in [0, 1] inclusive; never clamped silently.
    #[error("stability must be within [0, 1], got {0}")]
    StabilityOutOfRange(f32),

    #[error("unknown strictness level: {0:?}")]
    UnknownStrictness(String),

    #[error("unknown analysis category: {0:?}")]
    UnknownCategory(String),
}

/// Everything that can stop a run before the first model call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no analysis categories selected")]
    NoCategories,

    #[error("no design images provided")]
    NoImages,
}

impl AnalysisError {
    /// Short machine-readable kind used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Config(_) => "config",
            AnalysisError::NoCategories => "no_categories",
            AnalysisError::NoImages => "no_images",
        }
    }
}
