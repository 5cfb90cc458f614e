//! Threshold state
//!
//! Three independent filter parameters controlled by the analyst. Raw input
//! is unconstrained and is clamped into range, never rejected.
//!
//! The absolute confidence threshold is compared directly against
//! `Rule::confidence`, in the unit the dataset stores it (percentage points
//! for the datasets produced by the classifier). No conversion is applied.

use serde::Serialize;

/// Clamped threshold tuple. Value equality is the cache key of the rule filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// Minimum rule support
    pub support: u64,
    /// Minimum rule confidence, always `>= 0` and never NaN
    pub absolute_confidence: f64,
    /// Number of highest-confidence rules retained, in `[0, R]`
    pub relative_confidence: usize,
}

impl Thresholds {
    /// Thresholds that keep every rule enabled
    pub fn permissive(rule_count: usize) -> Self {
        Self {
            support: 0,
            absolute_confidence: 0.0,
            relative_confidence: rule_count,
        }
    }

    /// Build thresholds from raw analyst input
    pub fn clamped(support: i64, absolute_confidence: f64, relative: i64, rule_count: usize) -> Self {
        Self {
            support: clamp_support(support),
            absolute_confidence: clamp_confidence(absolute_confidence),
            relative_confidence: clamp_relative(relative, rule_count),
        }
    }

    /// Copy with a new support threshold
    pub fn with_support(self, support: i64) -> Self {
        Self {
            support: clamp_support(support),
            ..self
        }
    }

    /// Copy with a new absolute confidence threshold
    pub fn with_absolute_confidence(self, value: f64) -> Self {
        Self {
            absolute_confidence: clamp_confidence(value),
            ..self
        }
    }

    /// Copy with a new relative confidence threshold
    pub fn with_relative_confidence(self, value: i64, rule_count: usize) -> Self {
        Self {
            relative_confidence: clamp_relative(value, rule_count),
            ..self
        }
    }
}

fn clamp_support(value: i64) -> u64 {
    value.max(0) as u64
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

fn clamp_relative(value: i64, rule_count: usize) -> usize {
    if value <= 0 {
        0
    } else {
        (value as u64).min(rule_count as u64) as usize
    }
}
