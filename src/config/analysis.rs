// src/config/analysis.rs
//! Scoring defaults from TOML:
//!
//! ```toml
//! [scoring]
//! strictness = "normal"   # lenient | normal | strict
//! stability = 0.7         # [0, 1]
//! ```
//!
//! Invalid values are load errors (never silently replaced).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::category::Strictness;
use crate::normalize::validate_stability;

pub const DEFAULT_ANALYSIS_CONFIG_PATH: &str = "config/analysis.toml";
pub const ENV_ANALYSIS_CONFIG_PATH: &str = "ANALYSIS_CONFIG_PATH";
pub const DEFAULT_STABILITY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisDefaults {
    pub strictness: Strictness,
    pub stability: f32,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            strictness: Strictness::Normal,
            stability: DEFAULT_STABILITY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileRoot {
    #[serde(default)]
    scoring: ScoringSection,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringSection {
    strictness: Option<String>,
    stability: Option<f32>,
}

impl AnalysisDefaults {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let root: FileRoot = toml::from_str(s).context("parsing analysis TOML")?;
        let mut out = Self::default();
        if let Some(label) = root.scoring.strictness {
            out.strictness = label.parse()?;
        }
        if let Some(v) = root.scoring.stability {
            out.stability = validate_stability(v)?;
        }
        Ok(out)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analysis config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// $ANALYSIS_CONFIG_PATH (must exist), then `config/analysis.toml`, then defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_ANALYSIS_CONFIG_PATH) {
            return Self::load_from_file(&PathBuf::from(p));
        }
        let p = PathBuf::from(DEFAULT_ANALYSIS_CONFIG_PATH);
        if p.exists() {
            return Self::load_from_file(&p);
        }
        Ok(Self::default())
    }
}
