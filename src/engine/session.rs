//! Explainer session
//!
//! Owns one dataset snapshot, the analyst state, the derivation caches and
//! the current derived view. Every command runs to completion before the
//! next one is accepted:
//!
//! ```text
//! Thresholds -> RuleFilter -> TokenEvaluator -> CorrectnessEvaluator -> MetricsAggregator
//! ```
//!
//! Token selection only moves the highlight state machine and never touches
//! the chain. The presentation layer subscribes through `SessionListener`.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dataset::{Dataset, DatasetValidator};
use crate::observability::{Event, Logger, ObservationScope};

use super::cache::{CacheStats, Memo};
use super::errors::EngineResult;
use super::evaluator::{CorrectnessEvaluator, TokenEvaluator};
use super::filter::RuleFilter;
use super::highlight::HighlightState;
use super::metrics::{Metrics, MetricsAggregator};
use super::state::{Command, ExplainerState};
use super::thresholds::Thresholds;

type Mask = Arc<Vec<bool>>;

/// Results of one run of the derivation chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    /// Thresholds the view was derived from
    pub thresholds: Thresholds,
    /// Per-rule enabled status, length R
    pub enabled_rules: Mask,
    /// Per-labeled-token enabled status, length L
    pub enabled: Mask,
    /// Per-labeled-token correctness, length L
    pub correct: Mask,
    /// Aggregate metrics
    pub metrics: Metrics,
}

/// Presentation-side subscriber. All hooks default to no-ops.
pub trait SessionListener {
    /// A new view was derived
    fn derived_changed(&mut self, _view: &DerivedView) {}

    /// Highlight moved; `features` is the highlighted token's feature data
    fn highlight_changed(&mut self, _highlight: &HighlightState, _features: Option<&Value>) {}

    /// The analyst asked for another input; replacing the session is the
    /// listener's responsibility
    fn switch_input_requested(&mut self) {}
}

/// Session construction options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Initial thresholds; permissive when `None`
    pub thresholds: Option<Thresholds>,
    /// Retain derivation results between commands
    pub cache_enabled: bool,
    /// Log destination
    pub logger: Logger,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            thresholds: None,
            cache_enabled: true,
            logger: Logger::default(),
        }
    }
}

/// What a dispatched command did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatched {
    /// Derived view changed
    pub rederived: bool,
    /// Highlight changed
    pub highlight_changed: bool,
    /// Input switch was requested
    pub switch_requested: bool,
}

/// Per-derivation cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionCacheStats {
    pub rules: CacheStats,
    pub tokens: CacheStats,
    pub correctness: CacheStats,
    pub metrics: CacheStats,
}

/// One memo per derivation, keyed on that derivation's inputs
struct DerivationCaches {
    rules: Memo<Thresholds, Mask>,
    tokens: Memo<Mask, Mask>,
    correctness: Memo<Mask, Mask>,
    metrics: Memo<(Mask, Mask, Mask), Metrics>,
}

impl DerivationCaches {
    fn new(enabled: bool) -> Self {
        Self {
            rules: Memo::with_enabled(enabled),
            tokens: Memo::with_enabled(enabled),
            correctness: Memo::with_enabled(enabled),
            metrics: Memo::with_enabled(enabled),
        }
    }

    fn derive(&mut self, dataset: &Dataset, thresholds: &Thresholds) -> EngineResult<DerivedView> {
        let enabled_rules = self.rules.get_or_try_compute(thresholds, || {
            RuleFilter::enabled_rules(dataset, thresholds).map(Arc::new)
        })?;
        let enabled = self.tokens.get_or_try_compute(&enabled_rules, || {
            TokenEvaluator::enabled(dataset, &enabled_rules).map(Arc::new)
        })?;
        let correct = self.correctness.get_or_try_compute(&enabled, || {
            CorrectnessEvaluator::correct(dataset, &enabled).map(Arc::new)
        })?;
        let key = (enabled_rules.clone(), enabled.clone(), correct.clone());
        let metrics = self.metrics.get_or_try_compute(&key, || {
            MetricsAggregator::aggregate(&enabled_rules, &enabled, &correct)
        })?;

        Ok(DerivedView {
            thresholds: *thresholds,
            enabled_rules,
            enabled,
            correct,
            metrics,
        })
    }

    fn clear(&mut self) {
        self.rules.clear();
        self.tokens.clear();
        self.correctness.clear();
        self.metrics.clear();
    }

    fn stats(&self) -> SessionCacheStats {
        SessionCacheStats {
            rules: self.rules.stats(),
            tokens: self.tokens.stats(),
            correctness: self.correctness.stats(),
            metrics: self.metrics.stats(),
        }
    }
}

/// An interactive explainer session over one dataset
pub struct Explainer {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    dataset: Arc<Dataset>,
    state: ExplainerState,
    view: DerivedView,
    caches: DerivationCaches,
    listeners: Vec<Box<dyn SessionListener>>,
    logger: Logger,
}

impl std::fmt::Debug for Explainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explainer")
            .field("session_id", &self.session_id)
            .field("started_at", &self.started_at)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Explainer {
    /// Start a session with default options
    pub fn new(dataset: Arc<Dataset>) -> EngineResult<Self> {
        Self::with_options(dataset, SessionOptions::default())
    }

    /// Start a session. The dataset is validated and the initial view derived.
    pub fn with_options(dataset: Arc<Dataset>, options: SessionOptions) -> EngineResult<Self> {
        DatasetValidator::validate(&dataset)?;

        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        let logger = options.logger.with_session(session_id.to_string());
        let r = dataset.rule_count();
        let thresholds = options
            .thresholds
            .map(|t| {
                Thresholds::permissive(r)
                    .with_support(t.support.min(i64::MAX as u64) as i64)
                    .with_absolute_confidence(t.absolute_confidence)
                    .with_relative_confidence(t.relative_confidence.min(i64::MAX as usize) as i64, r)
            })
            .unwrap_or_else(|| Thresholds::permissive(r));

        let mut caches = DerivationCaches::new(options.cache_enabled);
        let view = caches.derive(&dataset, &thresholds)?;

        logger.log_event(
            Event::SessionStart,
            &[
                ("rules", &r.to_string()),
                ("tokens", &dataset.token_count().to_string()),
                ("labeled", &dataset.labeled_count().to_string()),
                ("cache_enabled", &caches.rules.is_enabled().to_string()),
                ("started_at", &started_at.to_rfc3339()),
            ],
        );

        Ok(Self {
            session_id,
            started_at,
            dataset,
            state: ExplainerState::new(thresholds),
            view,
            caches,
            listeners: Vec::new(),
            logger,
        })
    }

    /// Register a presentation subscriber
    pub fn subscribe(&mut self, listener: Box<dyn SessionListener>) {
        self.listeners.push(listener);
    }

    /// Apply an analyst command and run whatever derivation it requires.
    ///
    /// On error the session is left exactly as it was.
    pub fn dispatch(&mut self, command: Command) -> EngineResult<Dispatched> {
        let transition = match self.state.apply(&self.dataset, &command) {
            Ok(t) => t,
            Err(e) => {
                self.reject(&command, e.code(), &e.to_string());
                return Err(e);
            }
        };

        let mut outcome = Dispatched {
            switch_requested: transition.switch_requested,
            highlight_changed: transition.highlight_changed,
            ..Dispatched::default()
        };

        let is_threshold_command = matches!(
            command,
            Command::SetSupportThreshold(_)
                | Command::SetAbsoluteConfidenceThreshold(_)
                | Command::SetRelativeConfidenceThreshold(_)
        );

        if is_threshold_command {
            // Repeated identical values are answered from the caches
            let view = match self.derive(&transition.state.thresholds) {
                Ok(v) => v,
                Err(e) => {
                    self.reject(&command, e.code(), &e.to_string());
                    return Err(e);
                }
            };
            outcome.rederived = view != self.view;
            self.view = view;
        }

        self.state = transition.state;

        if transition.thresholds_changed {
            self.log_thresholds();
        }
        if outcome.rederived {
            for listener in &mut self.listeners {
                listener.derived_changed(&self.view);
            }
        }
        if outcome.highlight_changed {
            self.notify_highlight();
        }
        if outcome.switch_requested {
            self.logger.log_event(Event::SwitchInputRequested, &[]);
            for listener in &mut self.listeners {
                listener.switch_input_requested();
            }
        }

        Ok(outcome)
    }

    /// Set the minimum rule support
    pub fn set_support_threshold(&mut self, value: i64) -> EngineResult<Dispatched> {
        self.dispatch(Command::SetSupportThreshold(value))
    }

    /// Set the minimum rule confidence
    pub fn set_absolute_confidence_threshold(&mut self, value: f64) -> EngineResult<Dispatched> {
        self.dispatch(Command::SetAbsoluteConfidenceThreshold(value))
    }

    /// Set how many top-confidence rules are retained
    pub fn set_relative_confidence_threshold(&mut self, value: i64) -> EngineResult<Dispatched> {
        self.dispatch(Command::SetRelativeConfidenceThreshold(value))
    }

    /// Toggle highlight on a token
    pub fn select_token(&mut self, token: usize) -> EngineResult<Dispatched> {
        self.dispatch(Command::SelectToken(token))
    }

    /// Ask the collaborator for another input
    pub fn switch_input(&mut self) -> EngineResult<Dispatched> {
        self.dispatch(Command::SwitchInput)
    }

    /// Swap in a new dataset handed over by the collaborator. Thresholds
    /// reset to permissive, highlight to `Idle`, caches are invalidated.
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>) -> EngineResult<()> {
        DatasetValidator::validate(&dataset)?;

        let state = ExplainerState::initial(&dataset);
        self.caches.clear();
        let view = self.caches.derive(&dataset, &state.thresholds)?;

        self.dataset = dataset;
        self.state = state;
        self.view = view;

        self.logger.log_event(
            Event::DatasetReplaced,
            &[("rules", &self.dataset.rule_count().to_string())],
        );
        for listener in &mut self.listeners {
            listener.derived_changed(&self.view);
        }
        self.notify_highlight();
        Ok(())
    }

    fn derive(&mut self, thresholds: &Thresholds) -> EngineResult<DerivedView> {
        let scope = ObservationScope::new(&self.logger, Event::Derive.as_str());
        match self.caches.derive(&self.dataset, thresholds) {
            Ok(view) => {
                scope.complete_with_fields(&[
                    ("n_enabled_rules", &view.metrics.n_enabled_rules.to_string()),
                    ("n_enabled", &view.metrics.n_enabled.to_string()),
                    ("precision", &format!("{:.4}", view.metrics.precision)),
                ]);
                Ok(view)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn reject(&self, command: &Command, code: &str, message: &str) {
        self.logger.log_event(
            Event::CommandRejected,
            &[("command", command.name()), ("code", code), ("reason", message)],
        );
    }

    fn log_thresholds(&self) {
        let t = &self.state.thresholds;
        self.logger.log_event(
            Event::ThresholdsChanged,
            &[
                ("support", &t.support.to_string()),
                ("absolute_confidence", &t.absolute_confidence.to_string()),
                ("relative_confidence", &t.relative_confidence.to_string()),
            ],
        );
    }

    fn notify_highlight(&mut self) {
        let token = self
            .state
            .highlight
            .token()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "none".to_string());
        self.logger
            .log_event(Event::HighlightChanged, &[("token", &token)]);

        let features = self
            .state
            .highlight
            .token()
            .and_then(|t| self.dataset.features_of(t));
        for listener in &mut self.listeners {
            listener.highlight_changed(&self.state.highlight, features);
        }
    }

    /// Session identifier carried in every log line
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Wall-clock time the session was opened
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Dataset snapshot of this session
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Current analyst state
    pub fn state(&self) -> &ExplainerState {
        &self.state
    }

    /// Current thresholds
    pub fn thresholds(&self) -> &Thresholds {
        &self.state.thresholds
    }

    /// Current derived view
    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    /// Per-rule enabled status
    pub fn enabled_rules(&self) -> &[bool] {
        &self.view.enabled_rules
    }

    /// Per-labeled-token enabled status
    pub fn enabled(&self) -> &[bool] {
        &self.view.enabled
    }

    /// Per-labeled-token correctness
    pub fn correct(&self) -> &[bool] {
        &self.view.correct
    }

    /// Aggregate metrics
    pub fn metrics(&self) -> &Metrics {
        &self.view.metrics
    }

    /// Precision over enabled tokens
    pub fn precision(&self) -> f64 {
        self.view.metrics.precision
    }

    /// Fraction of labeled tokens left enabled
    pub fn coverage_rate(&self) -> f64 {
        self.view.metrics.coverage_rate
    }

    /// Number of enabled rules
    pub fn n_enabled_rules(&self) -> usize {
        self.view.metrics.n_enabled_rules
    }

    /// Current highlight state
    pub fn highlight(&self) -> &HighlightState {
        &self.state.highlight
    }

    /// Current sibling set; empty while idle
    pub fn siblings(&self) -> BTreeSet<usize> {
        self.state.highlight.siblings()
    }

    /// Feature data of the highlighted token; `None` while idle
    pub fn highlighted_features(&self) -> Option<&Value> {
        self.state
            .highlight
            .token()
            .and_then(|t| self.dataset.features_of(t))
    }

    /// Cache statistics of the four derivations
    pub fn cache_stats(&self) -> SessionCacheStats {
        self.caches.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Rule, Token};
    use crate::engine::EngineError;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn dataset() -> Arc<Dataset> {
        let mut siblings = BTreeMap::new();
        siblings.insert(0, vec![2]);
        let mut features = BTreeMap::new();
        features.insert(0, serde_json::json!({"indent": 4}));
        Arc::new(
            Dataset::from_parts(
                vec![Rule::new(10, 90.0), Rule::new(5, 60.0), Rule::new(1, 30.0)],
                vec![2, 1, 0],
                vec![
                    Token::labeled("a", 0),
                    Token::labeled("b", 1),
                    Token::labeled("c", 0),
                ],
                vec![0, 2, 1],
                vec![0, 1, 0],
                vec![0, 1, 1],
            )
            .with_siblings(siblings)
            .with_features(features),
        )
    }

    fn quiet() -> SessionOptions {
        SessionOptions {
            logger: Logger::silent(),
            ..SessionOptions::default()
        }
    }

    #[derive(Default)]
    struct Recorded {
        derived: usize,
        highlights: Vec<Option<usize>>,
        features: Vec<Option<Value>>,
        switches: usize,
    }

    struct Recorder(Rc<RefCell<Recorded>>);

    impl SessionListener for Recorder {
        fn derived_changed(&mut self, _view: &DerivedView) {
            self.0.borrow_mut().derived += 1;
        }

        fn highlight_changed(&mut self, highlight: &HighlightState, features: Option<&Value>) {
            let mut r = self.0.borrow_mut();
            r.highlights.push(highlight.token());
            r.features.push(features.cloned());
        }

        fn switch_input_requested(&mut self) {
            self.0.borrow_mut().switches += 1;
        }
    }

    #[test]
    fn test_initial_view_enables_everything() {
        let ex = Explainer::with_options(dataset(), quiet()).unwrap();
        assert_eq!(ex.enabled_rules(), &[true, true, true]);
        assert_eq!(ex.enabled(), &[true, true, true]);
        assert_eq!(ex.correct(), &[true, true, false]);
        assert_eq!(ex.n_enabled_rules(), 3);
        assert!((ex.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(ex.coverage_rate(), 1.0);
        assert!(ex.highlight().is_idle());
    }

    #[test]
    fn test_initial_thresholds_from_options() {
        let options = SessionOptions {
            thresholds: Some(Thresholds {
                support: 2,
                absolute_confidence: 50.0,
                relative_confidence: 99,
            }),
            ..quiet()
        };
        let ex = Explainer::with_options(dataset(), options).unwrap();
        assert_eq!(ex.thresholds().relative_confidence, 3);
        assert_eq!(ex.enabled_rules(), &[true, true, false]);
    }

    #[test]
    fn test_threshold_chain() {
        let mut ex = Explainer::with_options(dataset(), quiet()).unwrap();
        ex.set_support_threshold(2).unwrap();
        ex.set_absolute_confidence_threshold(50.0).unwrap();
        let before = ex.cache_stats();
        let out = ex.set_relative_confidence_threshold(2).unwrap();
        assert!(out.rederived);
        // Rule 2 was already disabled, so the token evaluation is reused
        assert_eq!(ex.cache_stats().tokens.hits, before.tokens.hits + 1);

        assert_eq!(ex.enabled_rules(), &[true, true, false]);
        assert_eq!(ex.enabled(), &[true, false, true]);
        assert_eq!(ex.correct(), &[true, false, false]);
        assert_eq!(ex.metrics().n_enabled, 2);
        assert_eq!(ex.precision(), 0.5);
    }

    #[test]
    fn test_repeated_thresholds_hit_cache() {
        let mut ex = Explainer::with_options(dataset(), quiet()).unwrap();
        ex.set_support_threshold(6).unwrap();
        let before = ex.cache_stats();
        let out = ex.set_support_threshold(6).unwrap();
        let after = ex.cache_stats();

        assert!(!out.rederived);
        assert_eq!(after.rules.misses, before.rules.misses);
        assert_eq!(after.rules.hits, before.rules.hits + 1);
    }

    #[test]
    fn test_highlight_never_touches_caches() {
        let mut ex = Explainer::with_options(dataset(), quiet()).unwrap();
        let before = ex.cache_stats();
        ex.select_token(0).unwrap();
        ex.select_token(1).unwrap();
        ex.select_token(1).unwrap();
        assert_eq!(ex.cache_stats(), before);
    }

    #[test]
    fn test_selection_and_features() {
        let mut ex = Explainer::with_options(dataset(), quiet()).unwrap();
        ex.select_token(0).unwrap();
        assert_eq!(ex.highlight().token(), Some(0));
        assert_eq!(ex.siblings(), BTreeSet::from([2]));
        assert_eq!(ex.highlighted_features().unwrap()["indent"], 4);

        ex.select_token(0).unwrap();
        assert!(ex.highlight().is_idle());
        assert!(ex.siblings().is_empty());
        assert!(ex.highlighted_features().is_none());
    }

    #[test]
    fn test_listeners_notified() {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut ex = Explainer::with_options(dataset(), quiet()).unwrap();
        ex.subscribe(Box::new(Recorder(Rc::clone(&recorded))));

        ex.set_support_threshold(6).unwrap();
        ex.set_support_threshold(6).unwrap();
        ex.select_token(0).unwrap();
        ex.select_token(1).unwrap();
        ex.switch_input().unwrap();

        let r = recorded.borrow();
        assert_eq!(r.derived, 1);
        assert_eq!(r.highlights, vec![Some(0), Some(1)]);
        assert_eq!(r.features[0], Some(serde_json::json!({"indent": 4})));
        assert_eq!(r.features[1], None);
        assert_eq!(r.switches, 1);
    }

    #[test]
    fn test_rejected_command_leaves_state() {
        let mut ex = Explainer::with_options(dataset(), quiet()).unwrap();
        ex.select_token(1).unwrap();
        let err = ex.select_token(3).unwrap_err();
        assert!(matches!(err, EngineError::UnknownToken { .. }));
        assert_eq!(ex.highlight().token(), Some(1));
    }

    #[test]
    fn test_invalid_dataset_rejected() {
        let mut ds = (*dataset()).clone();
        ds.winner[0] = 3;
        let err = Explainer::with_options(Arc::new(ds), quiet()).err().unwrap();
        assert_eq!(err.code(), "RULEVIEW_DATA_INTEGRITY");
    }

    #[test]
    fn test_replace_dataset_resets() {
        let mut ex = Explainer::with_options(dataset(), quiet()).unwrap();
        ex.set_relative_confidence_threshold(0).unwrap();
        ex.select_token(0).unwrap();

        let next = Arc::new(Dataset::from_parts(
            vec![Rule::new(3, 40.0)],
            vec![0],
            vec![Token::labeled("z", 0)],
            vec![0],
            vec![0],
            vec![0],
        ));
        ex.replace_dataset(next).unwrap();

        assert_eq!(ex.thresholds(), &Thresholds::permissive(1));
        assert!(ex.highlight().is_idle());
        assert_eq!(ex.enabled_rules(), &[true]);
        assert_eq!(ex.precision(), 1.0);
    }

    #[test]
    fn test_disabled_cache_same_results() {
        let options = SessionOptions {
            cache_enabled: false,
            ..quiet()
        };
        let mut cached = Explainer::with_options(dataset(), quiet()).unwrap();
        let mut uncached = Explainer::with_options(dataset(), options).unwrap();

        for v in [0, 2, 6, 2, 11] {
            cached.set_support_threshold(v).unwrap();
            uncached.set_support_threshold(v).unwrap();
            assert_eq!(cached.view(), uncached.view());
        }
        assert_eq!(uncached.cache_stats().rules.hits, 0);
    }

    #[test]
    fn test_session_logs_carry_session_id() {
        let (logger, buffer) = Logger::memory();
        let options = SessionOptions {
            logger,
            ..SessionOptions::default()
        };
        let mut ex = Explainer::with_options(dataset(), options).unwrap();
        ex.set_support_threshold(3).unwrap();

        let id = ex.session_id().to_string();
        let lines = buffer.lock().unwrap();
        assert!(!lines.is_empty());
        for line in lines.iter() {
            let v: Value = serde_json::from_str(line).unwrap();
            assert_eq!(v["session_id"], id.as_str());
        }
        assert!(lines.iter().any(|l| l.contains("THRESHOLDS_CHANGED")));
        assert!(lines.iter().any(|l| l.contains("DERIVE_COMPLETE")));

        let start: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(start["event"], "SESSION_START");
        assert_eq!(start["started_at"], ex.started_at().to_rfc3339().as_str());
        assert_eq!(start["cache_enabled"], "true");
    }
}
