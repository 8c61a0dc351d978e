// tests/pipeline_scenario.rs
//
// End-to-end pipeline runs against a scripted MockModel:
// prompt -> model -> extract -> normalize -> aggregate.

use std::sync::Arc;

use design_agent_team::{
    run_analysis, AnalysisError, AnalysisRun, Category, ConfigError, ImageRef, MockModel,
    Strictness,
};

fn design() -> Vec<ImageRef> {
    vec![ImageRef::Bytes {
        name: "checkout.png".into(),
        mime_type: "image/png".into(),
        data: vec![1, 2, 3, 4],
    }]
}

fn three_way(strictness: Strictness, stability: f32) -> AnalysisRun {
    AnalysisRun {
        categories: Category::ALL.into_iter().collect(),
        focus_areas: vec!["配色方案".into(), "导航结构".into()],
        context: "e-commerce checkout".into(),
        design_images: design(),
        competitor_images: Vec::new(),
        strictness,
        stability,
    }
}

fn scripted() -> Arc<MockModel> {
    Arc::new(
        MockModel::new()
            .reply(Category::Visual, "SCORE: 9.0\nSUMMARY: Polished\nDETAILS: consistent palette")
            .reply(Category::Ux, "SCORE: 5.0\nSUMMARY: Friction\nDETAILS: too many steps")
            .reply(Category::Market, "SCORE: 3.0\nSUMMARY: Crowded\nDETAILS: undifferentiated"),
    )
}

#[tokio::test]
async fn three_categories_with_stability_dampening() {
    let report = run_analysis(scripted(), three_way(Strictness::Normal, 0.7))
        .await
        .expect("run");

    let finals: Vec<f32> = report
        .categories
        .iter()
        .map(|c| c.result.final_score)
        .collect();
    // 6 + (raw - 6) * 0.7, identity remap under Normal
    assert_eq!(finals, vec![8.1, 5.3, 3.9]);

    let composite = report.composite.expect("composite");
    assert_eq!(composite.composite_score, 5.8);
    assert_eq!(composite.per_category_scores.len(), 3);
    assert!(report.categories.iter().all(|c| c.parsed && !c.failed));
}

#[tokio::test]
async fn strictness_orders_final_scores() {
    let mut by_level = Vec::new();
    for level in [Strictness::Strict, Strictness::Normal, Strictness::Lenient] {
        let r = run_analysis(scripted(), three_way(level, 0.7)).await.unwrap();
        by_level.push(r.composite.unwrap().composite_score);
    }
    assert!(by_level[0] <= by_level[1] && by_level[1] <= by_level[2], "{by_level:?}");
}

#[tokio::test]
async fn zero_stability_collapses_to_baseline() {
    let r = run_analysis(scripted(), three_way(Strictness::Normal, 0.0))
        .await
        .unwrap();
    assert!(r.categories.iter().all(|c| c.result.final_score == 6.0));
    assert_eq!(r.composite.unwrap().composite_score, 6.0);
}

#[tokio::test]
async fn out_of_range_stability_aborts_the_run() {
    let mock = scripted();
    let err = run_analysis(mock.clone(), three_way(Strictness::Normal, 1.5))
        .await
        .unwrap_err();
    assert_eq!(err, AnalysisError::Config(ConfigError::StabilityOutOfRange(1.5)));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn free_form_answer_is_recovered_not_rejected() {
    let mock = Arc::new(MockModel::new().reply(Category::Ux, "## 用户体验\n整体流程清晰。"));
    let run = AnalysisRun {
        categories: [Category::Ux].into_iter().collect(),
        ..three_way(Strictness::Normal, 1.0)
    };
    let r = run_analysis(mock, run).await.unwrap();
    let ux = &r.categories[0];
    assert!(!ux.parsed);
    assert_eq!(ux.result.raw_score, 5.0);
    assert_eq!(ux.result.final_score, 5.0);
    assert_eq!(ux.result.summary, "");
    assert_eq!(ux.result.details, "## 用户体验\n整体流程清晰。");
    assert!(r.combined_insights.is_empty());
}
