//! Response extractor: turns free model text into `{raw_score, summary, details}`.
//!
//! Grammar the prompt asks for (three ordered sections):
//! ```text
//! SCORE: <number>
//! SUMMARY: <text>
//! DETAILS: <text>
//! ```
//! `parse_response` reports whether the model followed that grammar
//! (`Parsed`) or free-formed (`Unparsed`). Both paths collapse into an
//! `ExtractedResult` via `into_extracted`; the unparsed path fills defaults:
//! - score: first `SCORE:` number anywhere, else 5.0
//! - summary: text between `SUMMARY:` and the next `DETAILS:`, else ""
//! - details: text after the last `DETAILS:`, else the whole response
//!
//! Scores are NOT clamped here; the normalizer owns the range.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Score reported when the response carries no usable `SCORE:` marker.
pub const DEFAULT_RAW_SCORE: f32 = 5.0;

const DETAILS_MARKER: &str = "DETAILS:";

static SCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"SCORE:\s*(\d+(?:\.\d+)?)").expect("score regex"));
static SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)SUMMARY:(.*?)DETAILS:").expect("summary regex"));

/// Free text produced by the model collaborator. No structure guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModelResponse {
    pub text: String,
}

impl RawModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Structured result derived from one model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedResult {
    pub raw_score: f32,
    pub summary: String,
    pub details: String,
}

/// Outcome of parsing against the three-section grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// All three markers present, in order, with a numeric score.
    Parsed {
        score: f32,
        summary: String,
        details: String,
    },
    /// The model did not follow the grammar; defaults are filled on recovery.
    Unparsed { raw_text: String },
}

impl ParsedResponse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParsedResponse::Parsed { .. })
    }

    /// Collapse into an `ExtractedResult`, applying defaults on the unparsed path.
    pub fn into_extracted(self) -> ExtractedResult {
        match self {
            ParsedResponse::Parsed {
                score,
                summary,
                details,
            } => ExtractedResult {
                raw_score: score,
                summary,
                details,
            },
            ParsedResponse::Unparsed { raw_text } => recover(&raw_text),
        }
    }
}

/// Parse strictly: `Parsed` only when SCORE < SUMMARY < DETAILS in the text.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let score = find_score(raw);
    let summary = find_summary(raw);
    let details_at = raw.rfind(DETAILS_MARKER);

    if let (Some((score_at, score)), Some((summary_at, summary)), Some(details_at)) =
        (score, summary, details_at)
    {
        if score_at < summary_at && summary_at < details_at {
            return ParsedResponse::Parsed {
                score,
                summary,
                details: details_after(raw, details_at),
            };
        }
    }

    ParsedResponse::Unparsed {
        raw_text: raw.to_string(),
    }
}

/// Lenient extraction; never fails.
pub fn extract(raw: &str) -> ExtractedResult {
    parse_response(raw).into_extracted()
}

fn recover(raw: &str) -> ExtractedResult {
    let raw_score = find_score(raw)
        .map(|(_, s)| s)
        .unwrap_or(DEFAULT_RAW_SCORE);
    let summary = find_summary(raw).map(|(_, s)| s).unwrap_or_default();
    let details = match raw.rfind(DETAILS_MARKER) {
        Some(at) => details_after(raw, at),
        None => raw.trim().to_string(),
    };
    ExtractedResult {
        raw_score,
        summary,
        details,
    }
}

/// First `SCORE:` followed by a number. Returns (marker offset, value).
/// A number too large for `f32` counts as not found.
fn find_score(raw: &str) -> Option<(usize, f32)> {
    let caps = SCORE_RE.captures(raw)?;
    let whole = caps.get(0)?;
    let value = caps
        .get(1)?
        .as_str()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())?;
    Some((whole.start(), value))
}

/// Text between the first `SUMMARY:` and the following `DETAILS:`, trimmed.
fn find_summary(raw: &str) -> Option<(usize, String)> {
    let caps = SUMMARY_RE.captures(raw)?;
    let whole = caps.get(0)?;
    let body = caps.get(1)?.as_str().trim().to_string();
    Some((whole.start(), body))
}

fn details_after(raw: &str, marker_at: usize) -> String {
    raw[marker_at + DETAILS_MARKER.len()..].trim().to_string()
}
