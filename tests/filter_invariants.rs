//! Filter Invariant Tests
//!
//! Checks the stage functions directly, independent of any session:
//! - each mask is monotone in its threshold
//! - relative threshold bounds (R keeps everything, 0 keeps nothing)
//! - a covered token always has an enabled winner
//! - correctness implies coverage

use ruleview::engine::{
    CorrectnessEvaluator, MetricsAggregator, RuleFilter, Thresholds, TokenEvaluator,
};
use ruleview::{Dataset, Rule, Token};

// =============================================================================
// Helper Functions
// =============================================================================

/// Six rules with ties in support and confidence, eight labeled tokens.
fn dataset() -> Dataset {
    let rules = vec![
        Rule::new(12, 95.0),
        Rule::new(3, 40.0),
        Rule::new(7, 70.0),
        Rule::new(7, 55.5),
        Rule::new(1, 70.0),
        Rule::new(20, 10.0),
    ];
    // ascending confidence; ties keep rule index order
    let order = vec![5, 1, 3, 2, 4, 0];
    let tokens = (0..8).map(|i| Token::labeled(format!("t{}", i), (i % 3) as u32)).collect();
    let winner = vec![0, 1, 2, 3, 4, 5, 2, 0];
    let ground_truth = vec![0, 1, 2, 0, 1, 2, 0, 1];
    let prediction = vec![0, 1, 1, 0, 2, 2, 0, 0];

    Dataset::from_parts(rules, order, tokens, winner, ground_truth, prediction)
}

fn count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&b| b).count()
}

/// Every rule enabled in `tighter` is also enabled in `looser`
fn is_subset(tighter: &[bool], looser: &[bool]) -> bool {
    tighter.iter().zip(looser).all(|(&t, &l)| !t || l)
}

// =============================================================================
// Monotonicity
// =============================================================================

#[test]
fn test_support_mask_monotone() {
    let ds = dataset();
    let mut previous = RuleFilter::support_mask(&ds, 0);
    for threshold in 1..=25 {
        let mask = RuleFilter::support_mask(&ds, threshold);
        assert!(is_subset(&mask, &previous), "support {}", threshold);
        previous = mask;
    }
    assert_eq!(count(&previous), 0);
}

#[test]
fn test_absolute_confidence_mask_monotone() {
    let ds = dataset();
    let mut previous = RuleFilter::absolute_confidence_mask(&ds, 0.0);
    assert_eq!(count(&previous), 6);

    for step in 1..=20 {
        let threshold = step as f64 * 5.0;
        let mask = RuleFilter::absolute_confidence_mask(&ds, threshold);
        assert!(is_subset(&mask, &previous), "confidence {}", threshold);
        previous = mask;
    }
}

#[test]
fn test_relative_confidence_mask_counts() {
    let ds = dataset();
    for keep in 0..=6 {
        let mask = RuleFilter::relative_confidence_mask(&ds, keep).unwrap();
        assert_eq!(count(&mask), keep);
    }
}

/// Keeping k rules keeps the last k entries of the ascending order.
#[test]
fn test_relative_keeps_highest_confidence() {
    let ds = dataset();
    let mask = RuleFilter::relative_confidence_mask(&ds, 2).unwrap();
    assert_eq!(mask, vec![true, false, false, false, true, false]);
}

#[test]
fn test_relative_bounds() {
    let ds = dataset();
    assert!(RuleFilter::relative_confidence_mask(&ds, 6).unwrap().iter().all(|&b| b));
    assert!(RuleFilter::relative_confidence_mask(&ds, 60).unwrap().iter().all(|&b| b));
    assert!(RuleFilter::relative_confidence_mask(&ds, 0).unwrap().iter().all(|&b| !b));
}

/// The combined filter is the AND of the three masks.
#[test]
fn test_masks_combine_with_and() {
    let ds = dataset();
    let t = Thresholds::clamped(5, 50.0, 4, ds.rule_count());
    let combined = RuleFilter::enabled_rules(&ds, &t).unwrap();

    let s = RuleFilter::support_mask(&ds, 5);
    let a = RuleFilter::absolute_confidence_mask(&ds, 50.0);
    let r = RuleFilter::relative_confidence_mask(&ds, 4).unwrap();
    for i in 0..ds.rule_count() {
        assert_eq!(combined[i], s[i] && a[i] && r[i], "rule {}", i);
    }
    assert_eq!(combined, vec![true, false, true, true, false, false]);
}

// =============================================================================
// Consistency
// =============================================================================

#[test]
fn test_enabled_token_has_enabled_winner() {
    let ds = dataset();
    for support in [0, 2, 5, 8, 15] {
        let t = Thresholds::clamped(support, 50.0, 5, ds.rule_count());
        let rules = RuleFilter::enabled_rules(&ds, &t).unwrap();
        let enabled = TokenEvaluator::enabled(&ds, &rules).unwrap();

        for (l, &on) in enabled.iter().enumerate() {
            assert_eq!(on, rules[ds.winner[l]], "labeled {}", l);
        }
    }
}

#[test]
fn test_correct_implies_enabled() {
    let ds = dataset();
    let rules = RuleFilter::enabled_rules(&ds, &Thresholds::clamped(3, 0.0, 6, 6)).unwrap();
    let enabled = TokenEvaluator::enabled(&ds, &rules).unwrap();
    let correct = CorrectnessEvaluator::correct(&ds, &enabled).unwrap();

    for l in 0..ds.labeled_count() {
        assert!(!correct[l] || enabled[l]);
        assert_eq!(correct[l], enabled[l] && ds.ground_truth[l] == ds.prediction[l]);
    }
}

#[test]
fn test_metrics_from_stages() {
    let ds = dataset();
    let rules = RuleFilter::enabled_rules(&ds, &Thresholds::permissive(6)).unwrap();
    let enabled = TokenEvaluator::enabled(&ds, &rules).unwrap();
    let correct = CorrectnessEvaluator::correct(&ds, &enabled).unwrap();
    let m = MetricsAggregator::aggregate(&rules, &enabled, &correct).unwrap();

    assert_eq!(m.n_enabled_rules, 6);
    assert_eq!(m.n_enabled, 8);
    assert_eq!(m.n_correct, 5);
    assert_eq!(m.n_wrong(), 3);
    assert_eq!(m.n_disabled(), 0);
    assert_eq!(m.precision, 0.625);
    assert_eq!(m.coverage_rate, 1.0);
}

/// A winner pointing past the rule table is an integrity error, not a panic.
#[test]
fn test_bad_winner_is_integrity_error() {
    let mut ds = dataset();
    ds.winner[3] = 99;
    let rules = vec![true; 6];
    let err = TokenEvaluator::enabled(&ds, &rules).unwrap_err();
    assert_eq!(err.code(), "RULEVIEW_DATA_INTEGRITY");
}
