//! Composite score over the categories that actually ran.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;
use crate::normalize::round1_f64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub per_category_scores: BTreeMap<Category, f32>,
    pub composite_score: f32,
}

/// Unweighted mean rounded to one decimal. `None` when nothing ran; the caller
/// must not invent a composite for an empty run.
pub fn aggregate(per_category: &BTreeMap<Category, f32>) -> Option<CompositeResult> {
    if per_category.is_empty() {
        return None;
    }
    let sum: f64 = per_category.values().map(|&s| s as f64).sum();
    let mean = sum / per_category.len() as f64;
    Some(CompositeResult {
        per_category_scores: per_category.clone(),
        composite_score: round1_f64(mean) as f32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_two() {
        let m = BTreeMap::from([(Category::Visual, 8.0), (Category::Ux, 6.0)]);
        let c = aggregate(&m).unwrap();
        assert_eq!(c.composite_score, 7.0);
        assert_eq!(c.per_category_scores, m);
    }

    #[test]
    fn empty_produces_nothing() {
        assert!(aggregate(&BTreeMap::new()).is_none());
    }

    #[test]
    fn rounds_to_one_decimal() {
        let m = BTreeMap::from([
            (Category::Visual, 8.1),
            (Category::Ux, 5.0),
            (Category::Market, 3.9),
        ]);
        assert_eq!(aggregate(&m).unwrap().composite_score, 5.7);
    }

    #[test]
    fn single_category_is_its_own_composite() {
        let m = BTreeMap::from([(Category::Market, 4.4)]);
        assert_eq!(aggregate(&m).unwrap().composite_score, 4.4);
    }
}
