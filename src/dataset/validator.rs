//! Load-boundary dataset validation
//!
//! Checks every structural invariant the engine relies on:
//! - rule confidence order is a permutation of `[0, R)`, ascending by confidence
//! - confidences are finite
//! - labeled index map is a bijection from labeled tokens onto `[0, L)`
//! - winner, ground truth and prediction all have length `L`
//! - winners, siblings and feature keys reference existing rules and tokens
//!
//! Validation is read-only and stops at the first violation.

use std::collections::BTreeSet;

use super::errors::{DatasetError, DatasetResult};
use super::types::Dataset;

/// Validates dataset snapshots before they are handed to the engine.
pub struct DatasetValidator;

impl DatasetValidator {
    /// Validates all invariants of a dataset.
    pub fn validate(dataset: &Dataset) -> DatasetResult<()> {
        Self::validate_rules(dataset)?;
        Self::validate_confidence_order(dataset)?;
        Self::validate_labeled_index(dataset)?;
        Self::validate_labeled_arrays(dataset)?;
        Self::validate_winners(dataset)?;
        Self::validate_siblings(dataset)?;
        Self::validate_features(dataset)?;
        Ok(())
    }

    fn validate_rules(dataset: &Dataset) -> DatasetResult<()> {
        for (i, rule) in dataset.rules.iter().enumerate() {
            if !rule.confidence.is_finite() {
                return Err(DatasetError::integrity(
                    format!("rules[{}].confidence", i),
                    format!("expected a finite number, got {}", rule.confidence),
                ));
            }
        }
        Ok(())
    }

    fn validate_confidence_order(dataset: &Dataset) -> DatasetResult<()> {
        let r = dataset.rule_count();
        let order = &dataset.rule_confidence_order;

        if order.len() != r {
            return Err(DatasetError::integrity(
                "rule_confidence_order",
                format!("expected length {}, got {}", r, order.len()),
            ));
        }

        let mut seen = vec![false; r];
        for (pos, &rule) in order.iter().enumerate() {
            if rule >= r {
                return Err(DatasetError::integrity(
                    format!("rule_confidence_order[{}]", pos),
                    format!("rule {} out of range for {} rules", rule, r),
                ));
            }
            if seen[rule] {
                return Err(DatasetError::integrity(
                    format!("rule_confidence_order[{}]", pos),
                    format!("rule {} appears more than once", rule),
                ));
            }
            seen[rule] = true;
        }

        for (pos, pair) in order.windows(2).enumerate() {
            let (lo, hi) = (&dataset.rules[pair[0]], &dataset.rules[pair[1]]);
            if lo.confidence > hi.confidence {
                return Err(DatasetError::integrity(
                    format!("rule_confidence_order[{}]", pos + 1),
                    format!(
                        "not ascending: rule {} ({}) precedes rule {} ({})",
                        pair[0], lo.confidence, pair[1], hi.confidence
                    ),
                ));
            }
        }

        Ok(())
    }

    fn validate_labeled_index(dataset: &Dataset) -> DatasetResult<()> {
        let n = dataset.token_count();
        let l = dataset.labeled_count();
        let mut targets = BTreeSet::new();

        for (&token, &labeled) in &dataset.labeled_index {
            if token >= n {
                return Err(DatasetError::integrity(
                    "labeled_index",
                    format!("token {} out of range for {} tokens", token, n),
                ));
            }
            if !dataset.tokens[token].is_labeled() {
                return Err(DatasetError::integrity(
                    "labeled_index",
                    format!("token {} has no label but is mapped to {}", token, labeled),
                ));
            }
            if labeled >= l {
                return Err(DatasetError::integrity(
                    "labeled_index",
                    format!("labeled index {} out of range for {} labeled tokens", labeled, l),
                ));
            }
            if !targets.insert(labeled) {
                return Err(DatasetError::integrity(
                    "labeled_index",
                    format!("labeled index {} assigned to more than one token", labeled),
                ));
            }
        }

        // Every labeled token must be mapped
        for (token, t) in dataset.tokens.iter().enumerate() {
            if t.is_labeled() && !dataset.labeled_index.contains_key(&token) {
                return Err(DatasetError::integrity(
                    "labeled_index",
                    format!("labeled token {} has no labeled index", token),
                ));
            }
        }

        if targets.len() != l {
            return Err(DatasetError::integrity(
                "labeled_index",
                format!("maps {} tokens, expected {}", targets.len(), l),
            ));
        }

        Ok(())
    }

    fn validate_labeled_arrays(dataset: &Dataset) -> DatasetResult<()> {
        let l = dataset.labeled_count();
        if dataset.ground_truth.len() != l {
            return Err(DatasetError::integrity(
                "ground_truth",
                format!("expected length {}, got {}", l, dataset.ground_truth.len()),
            ));
        }
        if dataset.prediction.len() != l {
            return Err(DatasetError::integrity(
                "prediction",
                format!("expected length {}, got {}", l, dataset.prediction.len()),
            ));
        }
        Ok(())
    }

    fn validate_winners(dataset: &Dataset) -> DatasetResult<()> {
        let r = dataset.rule_count();
        for (labeled, &rule) in dataset.winner.iter().enumerate() {
            if rule >= r {
                return Err(DatasetError::integrity(
                    format!("winner[{}]", labeled),
                    format!("rule {} out of range for {} rules", rule, r),
                ));
            }
        }
        Ok(())
    }

    fn validate_siblings(dataset: &Dataset) -> DatasetResult<()> {
        let n = dataset.token_count();
        let l = dataset.labeled_count();
        for (&labeled, siblings) in &dataset.sibling_set {
            if labeled >= l {
                return Err(DatasetError::integrity(
                    "sibling_set",
                    format!("labeled index {} out of range for {} labeled tokens", labeled, l),
                ));
            }
            if let Some(&token) = siblings.iter().find(|&&t| t >= n) {
                return Err(DatasetError::integrity(
                    format!("sibling_set[{}]", labeled),
                    format!("token {} out of range for {} tokens", token, n),
                ));
            }
        }
        Ok(())
    }

    fn validate_features(dataset: &Dataset) -> DatasetResult<()> {
        let n = dataset.token_count();
        if let Some(&token) = dataset.features.keys().find(|&&t| t >= n) {
            return Err(DatasetError::integrity(
                "features",
                format!("token {} out of range for {} tokens", token, n),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::errors::DatasetErrorCode;
    use crate::dataset::types::{Rule, Token};
    use std::collections::BTreeMap;

    fn valid() -> Dataset {
        Dataset::from_parts(
            vec![Rule::new(10, 90.0), Rule::new(5, 60.0), Rule::new(1, 30.0)],
            vec![2, 1, 0],
            vec![
                Token::labeled("a", 0),
                Token::labeled("b", 1),
                Token::unlabeled(" "),
                Token::labeled("c", 0),
            ],
            vec![0, 2, 1],
            vec![0, 1, 0],
            vec![0, 1, 1],
        )
    }

    fn field_of(ds: &Dataset) -> String {
        let err = DatasetValidator::validate(ds).unwrap_err();
        assert_eq!(err.code(), DatasetErrorCode::RuleviewDataIntegrity);
        err.field().unwrap_or_default().to_string()
    }

    #[test]
    fn test_valid_dataset_passes() {
        assert!(DatasetValidator::validate(&valid()).is_ok());
    }

    #[test]
    fn test_empty_dataset_passes() {
        let ds = Dataset::from_parts(vec![], vec![], vec![], vec![], vec![], vec![]);
        assert!(DatasetValidator::validate(&ds).is_ok());
    }

    #[test]
    fn test_winner_out_of_range() {
        let mut ds = valid();
        ds.winner[1] = 3;
        assert_eq!(field_of(&ds), "winner[1]");
    }

    #[test]
    fn test_order_not_permutation() {
        let mut ds = valid();
        ds.rule_confidence_order = vec![2, 2, 0];
        assert_eq!(field_of(&ds), "rule_confidence_order[1]");
    }

    #[test]
    fn test_order_wrong_length() {
        let mut ds = valid();
        ds.rule_confidence_order = vec![2, 1];
        assert_eq!(field_of(&ds), "rule_confidence_order");
    }

    #[test]
    fn test_order_not_ascending() {
        let mut ds = valid();
        ds.rule_confidence_order = vec![0, 1, 2];
        assert_eq!(field_of(&ds), "rule_confidence_order[1]");
    }

    #[test]
    fn test_order_ties_allowed() {
        let mut ds = valid();
        ds.rules[1].confidence = 90.0;
        ds.rule_confidence_order = vec![2, 0, 1];
        assert!(DatasetValidator::validate(&ds).is_ok());
    }

    #[test]
    fn test_nan_confidence_rejected() {
        let mut ds = valid();
        ds.rules[0].confidence = f64::NAN;
        assert_eq!(field_of(&ds), "rules[0].confidence");
    }

    #[test]
    fn test_prediction_length_mismatch() {
        let mut ds = valid();
        ds.prediction.pop();
        assert_eq!(field_of(&ds), "prediction");
    }

    #[test]
    fn test_unlabeled_token_mapped() {
        let mut ds = valid();
        ds.labeled_index.insert(2, 1);
        assert_eq!(field_of(&ds), "labeled_index");
    }

    #[test]
    fn test_labeled_token_unmapped() {
        let mut ds = valid();
        ds.labeled_index.remove(&3);
        assert_eq!(field_of(&ds), "labeled_index");
    }

    #[test]
    fn test_sibling_out_of_range() {
        let mut siblings = BTreeMap::new();
        siblings.insert(0, vec![1, 9]);
        let ds = valid().with_siblings(siblings);
        assert_eq!(field_of(&ds), "sibling_set[0]");
    }

    #[test]
    fn test_feature_key_out_of_range() {
        let mut features = BTreeMap::new();
        features.insert(10, serde_json::json!({"x": 1}));
        let ds = valid().with_features(features);
        assert_eq!(field_of(&ds), "features");
    }
}
