//! Dataset type definitions
//!
//! A dataset is an immutable snapshot of a trained classifier's rules,
//! the tokens it was evaluated on, and the labels for those tokens.
//! Index spaces:
//! - rule index in `[0, R)`
//! - token index in `[0, N)`
//! - labeled index in `[0, L)`, only for tokens carrying a label

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Class identifier used for labels, ground truth and predictions
pub type ClassId = u32;

/// A classification rule with its measured statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Number of training examples the rule applied to
    pub support: u64,
    /// Measured reliability, in the same unit as the absolute confidence threshold
    pub confidence: f64,
}

impl Rule {
    /// Create a rule
    pub fn new(support: u64, confidence: f64) -> Self {
        Self {
            support,
            confidence,
        }
    }
}

/// A token of the evaluated input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Display text, opaque to the engine
    pub value: String,
    /// Ground-truth class; `None` excludes the token from all metrics
    #[serde(default, alias = "y")]
    pub label: Option<ClassId>,
}

impl Token {
    /// Create a labeled token
    pub fn labeled(value: impl Into<String>, label: ClassId) -> Self {
        Self {
            value: value.into(),
            label: Some(label),
        }
    }

    /// Create an unlabeled token
    pub fn unlabeled(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }

    /// Returns true if the token carries a ground-truth label
    pub fn is_labeled(&self) -> bool {
        self.label.is_some()
    }
}

/// Immutable dataset snapshot consumed by the explainer engine.
///
/// Field aliases accept the camelCase names used by the visualizer payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Rules, indexed by rule index
    pub rules: Vec<Rule>,
    /// Rule indices sorted ascending by confidence
    #[serde(alias = "ruleConfidenceOrder", alias = "confidencesOrder")]
    pub rule_confidence_order: Vec<usize>,
    /// Tokens, indexed by token index
    pub tokens: Vec<Token>,
    /// Token index -> labeled index
    #[serde(alias = "labeledIndex")]
    pub labeled_index: BTreeMap<usize, usize>,
    /// Labeled index -> related token indices
    #[serde(default, alias = "siblingSet", alias = "sibling_indices")]
    pub sibling_set: BTreeMap<usize, Vec<usize>>,
    /// Labeled index -> rule index that decided the token
    #[serde(alias = "winners")]
    pub winner: Vec<usize>,
    /// Labeled index -> true class
    #[serde(alias = "groundTruth", alias = "y")]
    pub ground_truth: Vec<ClassId>,
    /// Labeled index -> predicted class
    #[serde(alias = "predictions", alias = "y_pred")]
    pub prediction: Vec<ClassId>,
    /// Display names of the classes
    #[serde(default, alias = "classNames")]
    pub class_names: Vec<String>,
    /// Printable representations of the classes
    #[serde(default, alias = "classRepresentations")]
    pub class_representations: Vec<String>,
    /// Token index -> feature data shown while the token is highlighted
    #[serde(default)]
    pub features: BTreeMap<usize, Value>,
}

impl Dataset {
    /// Build a dataset from its parts, deriving the labeled index map from
    /// token labels in token order. Siblings and features start empty.
    pub fn from_parts(
        rules: Vec<Rule>,
        rule_confidence_order: Vec<usize>,
        tokens: Vec<Token>,
        winner: Vec<usize>,
        ground_truth: Vec<ClassId>,
        prediction: Vec<ClassId>,
    ) -> Self {
        let labeled_index = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_labeled())
            .enumerate()
            .map(|(labeled, (token, _))| (token, labeled))
            .collect();

        Self {
            rules,
            rule_confidence_order,
            tokens,
            labeled_index,
            sibling_set: BTreeMap::new(),
            winner,
            ground_truth,
            prediction,
            class_names: Vec::new(),
            class_representations: Vec::new(),
            features: BTreeMap::new(),
        }
    }

    /// Attach sibling sets
    pub fn with_siblings(mut self, sibling_set: BTreeMap<usize, Vec<usize>>) -> Self {
        self.sibling_set = sibling_set;
        self
    }

    /// Attach per-token feature data
    pub fn with_features(mut self, features: BTreeMap<usize, Value>) -> Self {
        self.features = features;
        self
    }

    /// Number of rules (R)
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of tokens (N)
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Number of labeled tokens (L)
    pub fn labeled_count(&self) -> usize {
        self.winner.len()
    }

    /// Labeled index of a token, if it has one
    pub fn labeled_index_of(&self, token: usize) -> Option<usize> {
        self.labeled_index.get(&token).copied()
    }

    /// Sibling token indices for a labeled index; empty when none are recorded
    pub fn siblings_of(&self, labeled: usize) -> &[usize] {
        self.sibling_set
            .get(&labeled)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Feature data of a token, if any
    pub fn features_of(&self, token: usize) -> Option<&Value> {
        self.features.get(&token)
    }

    /// Display name of a class, falling back to its numeric id
    pub fn class_name(&self, class: ClassId) -> String {
        self.class_names
            .get(class as usize)
            .cloned()
            .unwrap_or_else(|| class.to_string())
    }
}
