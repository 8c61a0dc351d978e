//! Prompt builder: role-specific task text + scoring rubric + strictness guidance
//! + the response grammar the extractor parses (`SCORE:` / `SUMMARY:` / `DETAILS:`).
//!
//! Pure function of its inputs.

use crate::category::{Category, Strictness};

/// Baseline the rubric anchors every score to.
pub const RUBRIC_BASELINE: f32 = 6.0;

const RUBRIC: &str = "Scoring rubric (0-10 scale):
- Start from a baseline of 6.0.
- Add at most +2 for clear strengths.
- Subtract at most -2 for clear weaknesses.
- Reserve scores below 4 or above 8 for exceptional cases only.";

const RESPONSE_GRAMMAR: &str = "Respond using EXACTLY this format, with each marker at the start of a line:
SCORE: <number between 0 and 10 with one decimal>
SUMMARY: <one or two sentence summary>
DETAILS: <detailed analysis with clear headers and bullet points>";

/// Build the instruction string sent alongside the images for one category.
///
/// `focus_areas` may be empty (rendered as an empty list) and `context` may be empty.
pub fn build_prompt(
    category: Category,
    focus_areas: &[String],
    context: &str,
    strictness: Strictness,
) -> String {
    let areas = focus_areas.join(", ");

    let task = match category {
        Category::Visual => format!(
            "Analyze these designs focusing on: {areas}\n\
             Additional context: {context}\n\
             Provide specific insights about visual design elements."
        ),
        Category::Ux => format!(
            "Evaluate the user experience considering: {areas}\n\
             Additional context: {context}\n\
             Focus on user flows, interactions, and accessibility."
        ),
        Category::Market => format!(
            "Analyze market positioning and trends based on these designs.\n\
             Focus areas: {areas}\n\
             Context: {context}\n\
             Compare with competitor designs if provided.\n\
             Suggest market opportunities and positioning."
        ),
    };

    format!(
        "{task}\n\n{RUBRIC}\n\nGrading policy: {guidance}\n\n\
         Focus on concrete observations and actionable insights.\n\
         Please provide your analysis in Chinese (Simplified Chinese).\n\n\
         {RESPONSE_GRAMMAR}\n",
        guidance = strictness.guidance(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn areas(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn embeds_focus_areas_and_context_verbatim() {
        let p = build_prompt(
            Category::Visual,
            &areas(&["配色方案", "Typography"]),
            "Fintech app for seniors",
            Strictness::Normal,
        );
        assert!(p.contains("focusing on: 配色方案, Typography"));
        assert!(p.contains("Additional context: Fintech app for seniors"));
    }

    #[test]
    fn empty_inputs_still_render() {
        let p = build_prompt(Category::Ux, &[], "", Strictness::Normal);
        assert!(p.contains("considering: \n"));
        assert!(p.contains("Additional context: \n"));
    }

    #[test]
    fn carries_rubric_guidance_and_grammar() {
        let p = build_prompt(Category::Market, &[], "ctx", Strictness::Strict);
        assert!(p.contains("baseline of 6.0"));
        assert!(p.contains("at most +2"));
        assert!(p.contains("at most -2"));
        assert!(p.contains(Strictness::Strict.guidance()));
        assert!(!p.contains(Strictness::Lenient.guidance()));
        let s = p.find("SCORE:").unwrap();
        let m = p.find("SUMMARY:").unwrap();
        let d = p.find("DETAILS:").unwrap();
        assert!(s < m && m < d, "markers must be requested in order");
    }

    #[test]
    fn task_text_differs_per_role() {
        let v = build_prompt(Category::Visual, &[], "", Strictness::Normal);
        let m = build_prompt(Category::Market, &[], "", Strictness::Normal);
        assert!(v.contains("visual design elements"));
        assert!(m.contains("competitor designs"));
        assert_ne!(v, m);
    }
}
