//! Lifecycle events of an explainer session

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A session was created over a dataset
    SessionStart,
    /// One of the three thresholds changed value
    ThresholdsChanged,
    /// The derivation chain ran
    Derive,
    /// Highlight state moved
    HighlightChanged,
    /// The analyst asked for another input
    SwitchInputRequested,
    /// The collaborator handed the session a new dataset
    DatasetReplaced,
    /// A dataset was loaded from disk
    DatasetLoad,
    /// A command was rejected
    CommandRejected,
}

impl Event {
    /// Returns the event name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SessionStart => "SESSION_START",
            Event::ThresholdsChanged => "THRESHOLDS_CHANGED",
            Event::Derive => "DERIVE",
            Event::HighlightChanged => "HIGHLIGHT_CHANGED",
            Event::SwitchInputRequested => "SWITCH_INPUT_REQUESTED",
            Event::DatasetReplaced => "DATASET_REPLACED",
            Event::DatasetLoad => "DATASET_LOAD",
            Event::CommandRejected => "COMMAND_REJECTED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
