//! Model-invocation boundary: one call per category, prompt + ordered images in,
//! free text out. Providers know nothing about scoring.
//!
//! Timeouts live here (reqwest client), never in the pipeline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::config::AiConfig;
use crate::extract::RawModelResponse;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const ENV_AI_TEST_MODE: &str = "AI_TEST_MODE";

/// Reference to one uploaded image. Order matters: designs first, then competitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Path(PathBuf),
    Bytes {
        name: String,
        mime_type: String,
        data: Vec<u8>,
    },
}

impl ImageRef {
    pub fn name(&self) -> String {
        match self {
            ImageRef::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            ImageRef::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn mime_type(&self) -> String {
        match self {
            ImageRef::Path(p) => mime_from_path(p).to_string(),
            ImageRef::Bytes { mime_type, .. } => mime_type.clone(),
        }
    }

    /// Read the bytes (from disk for `Path`).
    pub async fn load(&self) -> anyhow::Result<Vec<u8>> {
        match self {
            ImageRef::Path(p) => tokio::fs::read(p)
                .await
                .with_context(|| format!("reading image {}", p.display())),
            ImageRef::Bytes { data, .. } => Ok(data.clone()),
        }
    }
}

pub fn mime_from_path(p: &Path) -> &'static str {
    let ext = p
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// The external collaborator. Invoked once per category per run.
#[async_trait]
pub trait DesignModel: Send + Sync {
    async fn run(
        &self,
        category: Category,
        prompt: &str,
        images: &[ImageRef],
    ) -> anyhow::Result<RawModelResponse>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynModel = Arc<dyn DesignModel>;

/// Factory: build a model according to config and environment.
///
/// * `AI_TEST_MODE=mock` → deterministic `MockModel`.
/// * `enabled == false` or empty key → `DisabledModel`.
/// * `provider == "gemini"` → `GeminiProvider`.
pub fn build_model(config: &AiConfig) -> anyhow::Result<DynModel> {
    if std::env::var(ENV_AI_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        info!("model: mock provider (AI_TEST_MODE=mock)");
        return Ok(Arc::new(MockModel::default()));
    }

    if !config.enabled || config.api_key.trim().is_empty() {
        warn!(enabled = config.enabled, "model: disabled (no API key or disabled in config)");
        return Ok(Arc::new(DisabledModel));
    }

    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config)?)),
        other => bail!("Unsupported provider in config: {other}"),
    }
}

/// Short stable id for logging text without logging the text itself.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

// ------------------------------------------------------------
// Gemini (generateContent REST)
// ------------------------------------------------------------

pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReq<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

/// Built-in Gemini tool. Search runs on Google's side; no local execution.
#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

/// Request for one category. Only the market agent gets web search.
fn generate_request(category: Category, parts: Vec<Part<'_>>) -> GenerateReq<'_> {
    let tools = match category {
        Category::Market => vec![Tool {
            google_search: GoogleSearch {},
        }],
        Category::Visual | Category::Ux => Vec::new(),
    };
    GenerateReq {
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: category.instructions().join("\n"),
            }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts,
        }],
        tools,
    }
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: std::borrow::Cow<'a, str>,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<RespContent>,
}

#[derive(Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}

#[derive(Deserialize)]
struct RespPart {
    text: Option<String>,
}

/// Text of the first candidate, parts concatenated.
fn response_text(body: GenerateResp) -> anyhow::Result<String> {
    let Some(candidate) = body.candidates.into_iter().next() else {
        bail!("gemini returned no candidates");
    };
    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        bail!("gemini returned no text");
    }
    Ok(text)
}

impl GeminiProvider {
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("design-agent-team/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model_id().to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point at a different endpoint (proxies, local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl DesignModel for GeminiProvider {
    async fn run(
        &self,
        category: Category,
        prompt: &str,
        images: &[ImageRef],
    ) -> anyhow::Result<RawModelResponse> {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        for img in images {
            let bytes = img.load().await?;
            parts.push(Part::InlineData {
                inline_data: Blob {
                    mime_type: img.mime_type().into(),
                    data: general_purpose::STANDARD.encode(bytes),
                },
            });
        }

        let req = generate_request(category, parts);

        debug!(
            provider = "gemini",
            model = %self.model,
            %category,
            prompt_id = %anon_hash(prompt),
            images = images.len(),
            web_search = !req.tools.is_empty(),
            "generateContent request"
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            bail!("gemini returned {status}: {snippet}");
        }

        let body: GenerateResp = resp.json().await.context("decoding gemini response")?;
        Ok(RawModelResponse::new(response_text(body)?))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// Disabled + mock
// ------------------------------------------------------------

/// Always fails; used when no model is configured.
pub struct DisabledModel;

#[async_trait]
impl DesignModel for DisabledModel {
    async fn run(
        &self,
        _category: Category,
        _prompt: &str,
        _images: &[ImageRef],
    ) -> anyhow::Result<RawModelResponse> {
        bail!("model disabled: set {} or enable config/ai.json", crate::config::ai::ENV_GEMINI_API_KEY)
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Scripted reply for one category.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail(String),
}

/// Deterministic provider for tests and local runs. Counts every call.
#[derive(Debug, Default)]
pub struct MockModel {
    replies: HashMap<Category, MockReply>,
    calls: AtomicUsize,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, category: Category, text: impl Into<String>) -> Self {
        self.replies.insert(category, MockReply::Text(text.into()));
        self
    }

    pub fn fail(mut self, category: Category, error: impl Into<String>) -> Self {
        self.replies.insert(category, MockReply::Fail(error.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn canned(category: Category) -> String {
        format!(
            "SCORE: 7.0\nSUMMARY: Mock summary for {category}.\nDETAILS: Mock details for {}.",
            category.title()
        )
    }
}

#[async_trait]
impl DesignModel for MockModel {
    async fn run(
        &self,
        category: Category,
        _prompt: &str,
        _images: &[ImageRef],
    ) -> anyhow::Result<RawModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(&category) {
            Some(MockReply::Text(t)) => Ok(RawModelResponse::new(t.clone())),
            Some(MockReply::Fail(e)) => bail!("{e}"),
            None => Ok(RawModelResponse::new(Self::canned(category))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
