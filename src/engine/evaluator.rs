//! Token coverage and correctness
//!
//! Both evaluators work in the labeled index space `[0, L)`; unlabeled
//! tokens never take part.

use crate::dataset::Dataset;

use super::errors::{EngineError, EngineResult};

/// Derives per-token enabled status from enabled rules
pub struct TokenEvaluator;

impl TokenEvaluator {
    /// `enabled[l] = enabled_rules[winner[l]]`
    ///
    /// A token is covered exactly when the rule that decided it is active.
    pub fn enabled(dataset: &Dataset, enabled_rules: &[bool]) -> EngineResult<Vec<bool>> {
        if enabled_rules.len() != dataset.rule_count() {
            return Err(EngineError::integrity(format!(
                "enabled_rules has {} entries, dataset has {} rules",
                enabled_rules.len(),
                dataset.rule_count()
            )));
        }

        dataset
            .winner
            .iter()
            .enumerate()
            .map(|(labeled, &rule)| {
                enabled_rules.get(rule).copied().ok_or_else(|| {
                    EngineError::integrity(format!(
                        "winner[{}] = {} out of range for {} rules",
                        labeled,
                        rule,
                        enabled_rules.len()
                    ))
                })
            })
            .collect()
    }
}

/// Derives per-token correctness from token coverage
pub struct CorrectnessEvaluator;

impl CorrectnessEvaluator {
    /// `correct[l] = enabled[l] && ground_truth[l] == prediction[l]`
    ///
    /// Disabled tokens are never correct.
    pub fn correct(dataset: &Dataset, enabled: &[bool]) -> EngineResult<Vec<bool>> {
        let l = enabled.len();
        if dataset.ground_truth.len() != l || dataset.prediction.len() != l {
            return Err(EngineError::integrity(format!(
                "labeled arrays disagree: enabled {}, ground_truth {}, prediction {}",
                l,
                dataset.ground_truth.len(),
                dataset.prediction.len()
            )));
        }

        Ok(enabled
            .iter()
            .zip(dataset.ground_truth.iter().zip(&dataset.prediction))
            .map(|(&on, (truth, predicted))| on && truth == predicted)
            .collect())
    }
}
