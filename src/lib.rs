//! ruleview - an explainer engine for rule-based token classifiers
//!
//! Given an immutable dataset of rules, tokens and labels, derives which
//! rules survive the analyst's thresholds, which tokens they cover, which
//! predictions are correct, and the resulting precision and coverage.

pub mod cli;
pub mod dataset;
pub mod engine;
pub mod observability;

pub use dataset::{Dataset, DatasetError, DatasetLoader, DatasetValidator, Rule, Token};
pub use engine::{
    Command, DerivedView, EngineError, EngineResult, Explainer, HighlightState, Metrics,
    SessionListener, SessionOptions, Thresholds,
};
