//! # Analysis pipeline
//! Build → (model) → Extract → Normalize per category, then Aggregate.
//!
//! Categories run concurrently as independent tokio tasks and are joined before
//! aggregation. A failing model call degrades only its own category to a 5.0
//! fallback entry; configuration and input errors abort before any model call.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{info, warn};

use crate::agent::{anon_hash, DesignModel, DynModel, ImageRef};
use crate::aggregate::{aggregate, CompositeResult};
use crate::category::{Category, Strictness};
use crate::error::{AnalysisError, ConfigError};
use crate::extract::{parse_response, DEFAULT_RAW_SCORE};
use crate::normalize::{normalize_result, validate_stability, NormalizedResult};
use crate::prompt::build_prompt;

/// Everything one category's analysis needs. Built by `AnalysisRun::requests`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub category: Category,
    pub focus_areas: Vec<String>,
    pub context: String,
    pub images: Vec<ImageRef>,
    pub strictness: Strictness,
    pub stability: f32,
}

/// Caller input for one run across several categories.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRun {
    pub categories: BTreeSet<Category>,
    pub focus_areas: Vec<String>,
    pub context: String,
    pub design_images: Vec<ImageRef>,
    /// Optional; appended after the design images for every agent.
    pub competitor_images: Vec<ImageRef>,
    pub strictness: Strictness,
    pub stability: f32,
}

impl AnalysisRun {
    /// Config first (stability), then inputs (categories, images).
    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_stability(self.stability)?;
        if self.categories.is_empty() {
            return Err(AnalysisError::NoCategories);
        }
        if self.design_images.is_empty() {
            return Err(AnalysisError::NoImages);
        }
        Ok(())
    }

    /// One request per selected category, in report order.
    pub fn requests(&self) -> Vec<AnalysisRequest> {
        let images: Vec<ImageRef> = self
            .design_images
            .iter()
            .chain(self.competitor_images.iter())
            .cloned()
            .collect();
        self.categories
            .iter()
            .map(|&category| AnalysisRequest {
                category,
                focus_areas: self.focus_areas.clone(),
                context: self.context.clone(),
                images: images.clone(),
                strictness: self.strictness,
                stability: self.stability,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    /// UI label the category was picked by (e.g. "视觉设计").
    pub label: &'static str,
    pub title: &'static str,
    #[serde(flatten)]
    pub result: NormalizedResult,
    /// The model followed the SCORE/SUMMARY/DETAILS grammar.
    pub parsed: bool,
    /// The model call failed and `result` is the fallback entry.
    pub failed: bool,
}

impl CategoryReport {
    fn fallback(category: Category, reason: String) -> Self {
        Self {
            category,
            label: category.ui_label(),
            title: category.title(),
            result: NormalizedResult {
                final_score: DEFAULT_RAW_SCORE,
                raw_score: DEFAULT_RAW_SCORE,
                summary: String::new(),
                details: reason,
            },
            parsed: false,
            failed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub strictness: Strictness,
    pub stability: f32,
    pub categories: Vec<CategoryReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeResult>,
    /// Present only when more than one agent contributed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combined_insights: Vec<String>,
}

/// Single category: prompt → model → extract → normalize.
///
/// A model error becomes the fallback entry; only a config error is returned.
pub async fn run_category(
    model: &dyn DesignModel,
    req: &AnalysisRequest,
) -> Result<CategoryReport, ConfigError> {
    let prompt = build_prompt(req.category, &req.focus_areas, &req.context, req.strictness);
    let prompt_id = anon_hash(&prompt);

    match model.run(req.category, &prompt, &req.images).await {
        Ok(raw) => {
            let parsed = parse_response(&raw.text);
            let followed_grammar = parsed.is_parsed();
            let result = normalize_result(parsed.into_extracted(), req.stability, req.strictness)?;
            counter!("design_agent_calls_total", "category" => req.category.key(), "outcome" => "ok")
                .increment(1);
            info!(
                category = %req.category,
                %prompt_id,
                parsed = followed_grammar,
                raw_score = result.raw_score,
                final_score = result.final_score,
                "category analyzed"
            );
            Ok(CategoryReport {
                category: req.category,
                label: req.category.ui_label(),
                title: req.category.title(),
                result,
                parsed: followed_grammar,
                failed: false,
            })
        }
        Err(e) => {
            counter!("design_agent_calls_total", "category" => req.category.key(), "outcome" => "failed")
                .increment(1);
            warn!(
                category = %req.category,
                %prompt_id,
                provider = model.provider_name(),
                error = %format!("{e:#}"),
                "model call failed; using fallback score"
            );
            Ok(CategoryReport::fallback(
                req.category,
                format!("Analysis failed: {e:#}"),
            ))
        }
    }
}

/// Full run. Validates, fans out one task per category, joins, aggregates.
pub async fn run_analysis(model: DynModel, run: AnalysisRun) -> Result<AnalysisReport, AnalysisError> {
    run.validate()?;
    let started = Instant::now();
    counter!("design_analysis_runs_total").increment(1);

    let mut handles = Vec::with_capacity(run.categories.len());
    for req in run.requests() {
        let model = model.clone();
        let category = req.category;
        let handle = tokio::spawn(async move { run_category(model.as_ref(), &req).await });
        handles.push((category, handle));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (category, handle) in handles {
        let report = match handle.await {
            Ok(res) => res?,
            Err(join_err) => {
                warn!(%category, error = %join_err, "analysis task aborted");
                CategoryReport::fallback(category, format!("Analysis failed: {join_err}"))
            }
        };
        reports.push(report);
    }
    reports.sort_by_key(|r| r.category);

    let finals: BTreeMap<Category, f32> = reports
        .iter()
        .map(|r| (r.category, r.result.final_score))
        .collect();
    let composite = aggregate(&finals);

    let combined_insights = if reports.len() > 1 {
        reports.iter().map(|r| r.category.contribution().to_string()).collect()
    } else {
        Vec::new()
    };

    let elapsed_ms = started.elapsed().as_millis() as f64;
    histogram!("design_analysis_duration_ms").record(elapsed_ms);
    info!(
        categories = reports.len(),
        failed = reports.iter().filter(|r| r.failed).count(),
        composite = composite.as_ref().map(|c| c.composite_score),
        elapsed_ms,
        "analysis run finished"
    );

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        strictness: run.strictness,
        stability: run.stability,
        categories: reports,
        composite,
        combined_insights,
    })
}
