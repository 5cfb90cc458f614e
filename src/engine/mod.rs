//! Explainer engine
//!
//! Derived-state computation for a rule-based token classifier:
//! - `RuleFilter`: enabled rules from thresholds and rule statistics
//! - `TokenEvaluator`: covered tokens from enabled rules and winners
//! - `CorrectnessEvaluator`: correct tokens from coverage and labels
//! - `MetricsAggregator`: precision, coverage and counts
//! - `HighlightState`: token selection and sibling lookup
//! - `Memo`: single-entry, value-keyed result cache
//!
//! The stages are pure functions over an immutable `Dataset`. `Explainer`
//! threads an immutable `ExplainerState` through the `Command` reducer and
//! caches each stage on its inputs.

mod cache;
mod errors;
mod evaluator;
mod filter;
mod highlight;
mod metrics;
mod session;
mod state;
mod thresholds;

pub use cache::{CacheStats, Memo};
pub use errors::{EngineError, EngineResult};
pub use evaluator::{CorrectnessEvaluator, TokenEvaluator};
pub use filter::RuleFilter;
pub use highlight::HighlightState;
pub use metrics::{Metrics, MetricsAggregator};
pub use session::{
    DerivedView, Dispatched, Explainer, SessionCacheStats, SessionListener, SessionOptions,
};
pub use state::{Command, ExplainerState, Transition};
pub use thresholds::Thresholds;
