//! Score normalizer: stability dampening toward the rubric baseline, then the
//! strictness remap against the score ceiling.
//!
//! stable   = 6.0 + (raw - 6.0) * stability          (stability in [0,1])
//! adjusted = 10 - (10 - stable) * strictness.factor()
//! final    = round1(clamp(adjusted, 0, 10))
//!
//! The remap only scales the distance from 10, never from 0. Arithmetic runs in
//! f64 and the rounded value is narrowed back to f32.

use serde::{Deserialize, Serialize};

use crate::category::Strictness;
use crate::error::ConfigError;
use crate::extract::{ExtractedResult, DEFAULT_RAW_SCORE};
use crate::prompt::RUBRIC_BASELINE;

pub const SCORE_MIN: f32 = 0.0;
pub const SCORE_MAX: f32 = 10.0;

/// Final per-category result as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub final_score: f32,
    pub raw_score: f32,
    pub summary: String,
    pub details: String,
}

/// Reject stability outside [0,1] (NaN included).
pub fn validate_stability(stability: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&stability) {
        Ok(stability)
    } else {
        Err(ConfigError::StabilityOutOfRange(stability))
    }
}

/// Round half away from zero to one decimal place.
pub fn round1(x: f32) -> f32 {
    round1_f64(x as f64) as f32
}

pub(crate) fn round1_f64(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Stage 1: pull the raw score toward the baseline.
///
/// A NaN raw score is read as the extractor default. Zero stability returns
/// the baseline for every input, infinities included.
pub fn stabilize(raw_score: f32, stability: f32) -> Result<f64, ConfigError> {
    let stability = validate_stability(stability)? as f64;
    let base = RUBRIC_BASELINE as f64;
    if stability == 0.0 {
        return Ok(base);
    }
    let raw = if raw_score.is_nan() {
        DEFAULT_RAW_SCORE
    } else {
        raw_score
    };
    Ok(base + (raw as f64 - base) * stability)
}

/// Stage 2: scale the deficit from 10, clamp, round.
/// Infinities clamp to the nearest bound; NaN is read as the baseline.
pub fn remap(stable: f64, strictness: Strictness) -> f32 {
    let max = SCORE_MAX as f64;
    let stable = if stable.is_nan() {
        RUBRIC_BASELINE as f64
    } else {
        stable
    };
    let adjusted = max - (max - stable) * strictness.factor() as f64;
    round1_f64(adjusted.clamp(SCORE_MIN as f64, max)) as f32
}

/// Full transform of a raw extracted score into a bounded final score.
pub fn normalize(raw_score: f32, stability: f32, strictness: Strictness) -> Result<f32, ConfigError> {
    let stable = stabilize(raw_score, stability)?;
    Ok(remap(stable, strictness))
}

/// Apply `normalize` to an extracted result, carrying text through untouched.
pub fn normalize_result(
    extracted: ExtractedResult,
    stability: f32,
    strictness: Strictness,
) -> Result<NormalizedResult, ConfigError> {
    let final_score = normalize(extracted.raw_score, stability, strictness)?;
    Ok(NormalizedResult {
        final_score,
        raw_score: extracted.raw_score,
        summary: extracted.summary,
        details: extracted.details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [Strictness; 3] = [Strictness::Lenient, Strictness::Normal, Strictness::Strict];

    #[test]
    fn output_is_bounded_over_a_grid() {
        for level in LEVELS {
            for si in 0..=10 {
                let stability = si as f32 / 10.0;
                for ri in 0..=100 {
                    let raw = ri as f32 / 10.0;
                    let s = normalize(raw, stability, level).unwrap();
                    assert!((0.0..=10.0).contains(&s), "{raw} {stability} {level} -> {s}");
                }
            }
        }
    }

    #[test]
    fn baseline_is_fixed_point_under_normal() {
        for si in 0..=10 {
            let stability = si as f32 / 10.0;
            assert_eq!(normalize(6.0, stability, Strictness::Normal).unwrap(), 6.0);
        }
    }

    #[test]
    fn zero_stability_ignores_raw_score() {
        for level in LEVELS {
            let expected = remap(6.0, level);
            for raw in [0.0, 3.3, 6.0, 9.9, 10.0] {
                assert_eq!(normalize(raw, 0.0, level).unwrap(), expected);
            }
        }
        assert_eq!(remap(6.0, Strictness::Lenient), 6.8);
        assert_eq!(remap(6.0, Strictness::Strict), 5.2);
    }

    #[test]
    fn full_stability_normal_is_rounding_only() {
        for raw in [0.0, 2.0, 4.44, 7.3, 8.96, 10.0] {
            assert_eq!(normalize(raw, 1.0, Strictness::Normal).unwrap(), round1(raw));
        }
    }

    #[test]
    fn strictness_is_monotone() {
        for stable in [0.0, 2.5, 6.0, 8.1, 9.9] {
            let s = remap(stable, Strictness::Strict);
            let n = remap(stable, Strictness::Normal);
            let l = remap(stable, Strictness::Lenient);
            assert!(s <= n && n <= l, "{stable}: {s} {n} {l}");
        }
    }

    #[test]
    fn strict_clamps_at_zero() {
        assert_eq!(normalize(0.0, 1.0, Strictness::Strict).unwrap(), 0.0);
    }

    #[test]
    fn out_of_range_raw_is_clamped() {
        assert_eq!(normalize(14.0, 1.0, Strictness::Normal).unwrap(), 10.0);
        assert_eq!(normalize(-3.0, 1.0, Strictness::Normal).unwrap(), 0.0);
    }

    #[test]
    fn non_finite_raw_stays_bounded() {
        for level in LEVELS {
            assert_eq!(normalize(f32::INFINITY, 0.0, level).unwrap(), remap(6.0, level));
            assert_eq!(normalize(f32::NEG_INFINITY, 0.0, level).unwrap(), remap(6.0, level));
        }
        assert_eq!(normalize(f32::INFINITY, 0.0, Strictness::Normal).unwrap(), 6.0);
        assert_eq!(normalize(f32::INFINITY, 0.7, Strictness::Normal).unwrap(), 10.0);
        assert_eq!(normalize(f32::NEG_INFINITY, 0.7, Strictness::Normal).unwrap(), 0.0);
        assert_eq!(normalize(f32::NAN, 1.0, Strictness::Normal).unwrap(), 5.0);
        assert_eq!(remap(f64::NAN, Strictness::Normal), 6.0);
    }

    #[test]
    fn ties_round_away_from_zero() {
        // stable 6.25 exactly
        assert_eq!(normalize(6.5, 0.5, Strictness::Normal).unwrap(), 6.3);
        assert_eq!(round1(0.25), 0.3);
    }

    #[test]
    fn stability_outside_unit_interval_is_rejected() {
        assert_eq!(
            normalize(7.0, 1.5, Strictness::Normal),
            Err(ConfigError::StabilityOutOfRange(1.5))
        );
        assert!(normalize(7.0, -0.1, Strictness::Normal).is_err());
        assert!(normalize(7.0, f32::NAN, Strictness::Normal).is_err());
    }

    #[test]
    fn scenario_scores_match_hand_computation() {
        let finals: Vec<f32> = [9.0, 5.0, 3.0]
            .into_iter()
            .map(|r| normalize(r, 0.7, Strictness::Normal).unwrap())
            .collect();
        assert_eq!(finals, vec![8.1, 5.3, 3.9]);
    }

    #[test]
    fn text_is_carried_through() {
        let r = normalize_result(
            ExtractedResult {
                raw_score: 8.0,
                summary: "s".into(),
                details: "d".into(),
            },
            0.5,
            Strictness::Normal,
        )
        .unwrap();
        assert_eq!(r.final_score, 7.0);
        assert_eq!(r.raw_score, 8.0);
        assert_eq!(r.summary, "s");
        assert_eq!(r.details, "d");
    }
}
