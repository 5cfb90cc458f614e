//! Aggregate quality metrics
//!
//! Precision is measured only over enabled tokens; no recall-like metric is
//! derived for disabled tokens. Ratios with an empty denominator are `0.0`,
//! so no NaN ever reaches a caller.

use serde::{Deserialize, Serialize};

use super::errors::{EngineError, EngineResult};

/// Scalar summary of one derivation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Rules passing all thresholds
    pub n_enabled_rules: usize,
    /// Labeled tokens backed by an enabled rule
    pub n_enabled: usize,
    /// Enabled tokens predicted correctly
    pub n_correct: usize,
    /// Labeled tokens (L)
    pub n_labeled: usize,
    /// `n_correct / n_enabled`, `0.0` when nothing is enabled
    pub precision: f64,
    /// `n_enabled / n_labeled`, `0.0` when nothing is labeled
    pub coverage_rate: f64,
}

impl Metrics {
    /// Enabled tokens predicted wrongly
    pub fn n_wrong(&self) -> usize {
        self.n_enabled - self.n_correct
    }

    /// Labeled tokens whose rule is filtered out
    pub fn n_disabled(&self) -> usize {
        self.n_labeled - self.n_enabled
    }
}

/// Computes `Metrics` from the derived masks
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Aggregate enabled rules, enabled tokens and correct tokens
    pub fn aggregate(
        enabled_rules: &[bool],
        enabled: &[bool],
        correct: &[bool],
    ) -> EngineResult<Metrics> {
        if enabled.len() != correct.len() {
            return Err(EngineError::integrity(format!(
                "enabled has {} entries, correct has {}",
                enabled.len(),
                correct.len()
            )));
        }

        let n_enabled_rules = count(enabled_rules);
        let n_enabled = count(enabled);
        let n_correct = enabled
            .iter()
            .zip(correct)
            .filter(|&(&on, &ok)| on && ok)
            .count();
        let n_labeled = enabled.len();

        Ok(Metrics {
            n_enabled_rules,
            n_enabled,
            n_correct,
            n_labeled,
            precision: ratio(n_correct, n_enabled),
            coverage_rate: ratio(n_enabled, n_labeled),
        })
    }
}

fn count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&b| b).count()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
