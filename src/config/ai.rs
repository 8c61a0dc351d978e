// src/config/ai.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::warn;

pub const DEFAULT_AI_CONFIG_PATH: &str = "config/ai.json";
pub const ENV_AI_CONFIG_PATH: &str = "AI_CONFIG_PATH";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// Only "gemini" is wired (case-insensitive).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model id; `DEFAULT_GEMINI_MODEL` when absent.
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from GEMINI_API_KEY
    #[serde(default)]
    pub api_key: String,
    /// Whole-request timeout for one model call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    /// Used when no config file exists: enabled iff GEMINI_API_KEY is set.
    fn default() -> Self {
        let api_key = env::var(ENV_GEMINI_API_KEY).unwrap_or_default();
        Self {
            enabled: !api_key.trim().is_empty(),
            provider: default_provider(),
            model: None,
            api_key,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading AI config from {}", path.display()))?;
        let mut cfg: AiConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing AI config {}", path.display()))?;

        cfg.provider = cfg.provider.trim().to_lowercase();

        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "gemini" => env::var(ENV_GEMINI_API_KEY).unwrap_or_else(|_| {
                    warn!("{ENV_GEMINI_API_KEY} is not set; model calls will be disabled");
                    String::new()
                }),
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        if cfg.timeout_secs == 0 {
            cfg.timeout_secs = default_timeout_secs();
        }

        Ok(cfg)
    }

    /// $AI_CONFIG_PATH, then `config/ai.json`, then `AiConfig::default()`.
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_AI_CONFIG_PATH) {
            return Self::load_from_file(p);
        }
        let p = Path::new(DEFAULT_AI_CONFIG_PATH);
        if p.exists() {
            return Self::load_from_file(p);
        }
        Ok(Self::default())
    }

    pub fn model_id(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_GEMINI_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn write_cfg(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let p = dir.path().join("ai.json");
        fs::write(&p, body).unwrap();
        p
    }

    #[serial]
    #[test]
    fn resolves_env_key_and_normalizes_provider() {
        let tmp = tempfile::tempdir().unwrap();
        let p = write_cfg(
            &tmp,
            r#"{"enabled":true,"provider":" Gemini ","api_key":"ENV","timeout_secs":0}"#,
        );
        env::set_var(ENV_GEMINI_API_KEY, "k-123");
        let cfg = AiConfig::load_from_file(&p).unwrap();
        env::remove_var(ENV_GEMINI_API_KEY);

        assert_eq!(cfg.provider, "gemini");
        assert_eq!(cfg.api_key, "k-123");
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.model_id(), DEFAULT_GEMINI_MODEL);
    }

    #[serial]
    #[test]
    fn missing_env_key_loads_with_empty_key() {
        let tmp = tempfile::tempdir().unwrap();
        let p = write_cfg(&tmp, r#"{"enabled":true,"api_key":"env"}"#);
        env::remove_var(ENV_GEMINI_API_KEY);
        let cfg = AiConfig::load_from_file(&p).unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.api_key, "");
    }

    #[test]
    fn unknown_provider_with_env_key_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let p = write_cfg(&tmp, r#"{"enabled":true,"provider":"other","api_key":"ENV"}"#);
        assert!(AiConfig::load_from_file(&p).is_err());
    }

    #[test]
    fn explicit_model_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let p = write_cfg(
            &tmp,
            r#"{"enabled":false,"model":"gemini-1.5-pro","api_key":"literal"}"#,
        );
        let cfg = AiConfig::load_from_file(&p).unwrap();
        assert_eq!(cfg.model_id(), "gemini-1.5-pro");
        assert_eq!(cfg.api_key, "literal");
    }
}
