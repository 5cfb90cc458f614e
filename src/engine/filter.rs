//! Rule filtering
//!
//! A rule is enabled when it passes all three masks (AND semantics):
//! - support mask: `support >= support threshold`
//! - absolute confidence mask: `confidence >= absolute threshold`
//! - relative confidence mask: rule is among the `k` highest-confidence rules
//!
//! Pure functions of the dataset and the thresholds.

use crate::dataset::Dataset;

use super::errors::{EngineError, EngineResult};
use super::thresholds::Thresholds;

/// Derives per-rule enabled status
pub struct RuleFilter;

impl RuleFilter {
    /// Enabled status of every rule under the given thresholds
    pub fn enabled_rules(dataset: &Dataset, thresholds: &Thresholds) -> EngineResult<Vec<bool>> {
        let support = Self::support_mask(dataset, thresholds.support);
        let absolute = Self::absolute_confidence_mask(dataset, thresholds.absolute_confidence);
        let relative = Self::relative_confidence_mask(dataset, thresholds.relative_confidence)?;

        Ok(support
            .iter()
            .zip(&absolute)
            .zip(&relative)
            .map(|((&s, &a), &r)| s && a && r)
            .collect())
    }

    /// `support[i] >= threshold`
    pub fn support_mask(dataset: &Dataset, threshold: u64) -> Vec<bool> {
        dataset
            .rules
            .iter()
            .map(|rule| rule.support >= threshold)
            .collect()
    }

    /// `confidence[i] >= threshold`
    pub fn absolute_confidence_mask(dataset: &Dataset, threshold: f64) -> Vec<bool> {
        dataset
            .rules
            .iter()
            .map(|rule| rule.confidence >= threshold)
            .collect()
    }

    /// Keeps the `keep` highest-confidence rules.
    ///
    /// Walks the ascending confidence order: the first `R - keep` entries are
    /// disabled, the rest enabled. `keep` above `R` is treated as `R`.
    pub fn relative_confidence_mask(dataset: &Dataset, keep: usize) -> EngineResult<Vec<bool>> {
        let r = dataset.rule_count();
        let order = &dataset.rule_confidence_order;

        if order.len() != r {
            return Err(EngineError::integrity(format!(
                "rule_confidence_order has length {}, expected {}",
                order.len(),
                r
            )));
        }

        let disabled = r - keep.min(r);
        let mut mask = vec![false; r];
        let mut seen = vec![false; r];
        for (pos, &rule) in order.iter().enumerate() {
            if rule >= r {
                return Err(EngineError::integrity(format!(
                    "rule_confidence_order[{}] = {} out of range for {} rules",
                    pos, rule, r
                )));
            }
            if seen[rule] {
                return Err(EngineError::integrity(format!(
                    "rule_confidence_order[{}]: rule {} appears more than once",
                    pos, rule
                )));
            }
            seen[rule] = true;
            mask[rule] = pos >= disabled;
        }

        Ok(mask)
    }
}
