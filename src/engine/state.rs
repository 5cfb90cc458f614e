//! Explainer state and command reducer
//!
//! The analyst's inputs are an immutable `ExplainerState` value. Commands
//! produce a new state through a pure function; nothing is mutated in place.
//! Deriving results from the new state is the session's job.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

use super::errors::EngineResult;
use super::highlight::HighlightState;
use super::thresholds::Thresholds;

/// Analyst commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    /// Minimum rule support; negative values clamp to 0
    SetSupportThreshold(i64),
    /// Minimum rule confidence; negative or NaN values clamp to 0
    SetAbsoluteConfidenceThreshold(f64),
    /// Number of top-confidence rules retained; clamps to `[0, R]`
    SetRelativeConfidenceThreshold(i64),
    /// Toggle highlight on a token
    SelectToken(usize),
    /// Ask the collaborator for another input
    SwitchInput,
}

impl Command {
    /// Command name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetSupportThreshold(_) => "set_support_threshold",
            Command::SetAbsoluteConfidenceThreshold(_) => "set_absolute_confidence_threshold",
            Command::SetRelativeConfidenceThreshold(_) => "set_relative_confidence_threshold",
            Command::SelectToken(_) => "select_token",
            Command::SwitchInput => "switch_input",
        }
    }
}

/// Analyst-controlled state of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainerState {
    /// Current clamped thresholds
    pub thresholds: Thresholds,
    /// Current highlight
    pub highlight: HighlightState,
}

/// Outcome of applying one command
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State after the command
    pub state: ExplainerState,
    /// Threshold tuple changed value
    pub thresholds_changed: bool,
    /// Highlight changed value
    pub highlight_changed: bool,
    /// The command asked for another input
    pub switch_requested: bool,
}

impl ExplainerState {
    /// Initial state: the given thresholds, nothing highlighted
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            highlight: HighlightState::Idle,
        }
    }

    /// Initial state enabling every rule of the dataset
    pub fn initial(dataset: &Dataset) -> Self {
        Self::new(Thresholds::permissive(dataset.rule_count()))
    }

    /// Apply a command
    pub fn apply(&self, dataset: &Dataset, command: &Command) -> EngineResult<Transition> {
        let r = dataset.rule_count();
        let mut next = self.clone();
        let mut switch_requested = false;

        match *command {
            Command::SetSupportThreshold(v) => {
                next.thresholds = self.thresholds.with_support(v);
            }
            Command::SetAbsoluteConfidenceThreshold(v) => {
                next.thresholds = self.thresholds.with_absolute_confidence(v);
            }
            Command::SetRelativeConfidenceThreshold(v) => {
                next.thresholds = self.thresholds.with_relative_confidence(v, r);
            }
            Command::SelectToken(token) => {
                next.highlight = self.highlight.select(dataset, token)?;
            }
            Command::SwitchInput => {
                switch_requested = true;
            }
        }

        Ok(Transition {
            thresholds_changed: next.thresholds != self.thresholds,
            highlight_changed: next.highlight != self.highlight,
            switch_requested,
            state: next,
        })
    }
}
