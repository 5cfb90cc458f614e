//! Highlight state machine and sibling lookup
//!
//! States:
//! - `Idle`
//! - `Highlighted { token, siblings }`
//!
//! Selecting the highlighted token toggles back to `Idle`. Selecting any
//! other token moves straight to `Highlighted` for that token, with no
//! intermediate `Idle`. There is no terminal state.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::dataset::Dataset;

use super::errors::{EngineError, EngineResult};

/// Token emphasis state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HighlightState {
    /// Nothing selected
    #[default]
    Idle,
    /// A token is selected together with its related tokens
    Highlighted {
        /// Selected token index
        token: usize,
        /// Related token indices; empty for unlabeled tokens
        siblings: BTreeSet<usize>,
    },
}

impl HighlightState {
    /// Transition on a token selection
    pub fn select(&self, dataset: &Dataset, token: usize) -> EngineResult<HighlightState> {
        let token_count = dataset.token_count();
        if token >= token_count {
            return Err(EngineError::UnknownToken { token, token_count });
        }

        if self.token() == Some(token) {
            return Ok(HighlightState::Idle);
        }

        Ok(HighlightState::Highlighted {
            token,
            siblings: Self::locate_siblings(dataset, token),
        })
    }

    /// Related tokens of `token`; empty if it carries no label
    pub fn locate_siblings(dataset: &Dataset, token: usize) -> BTreeSet<usize> {
        match dataset.labeled_index_of(token) {
            Some(labeled) => dataset.siblings_of(labeled).iter().copied().collect(),
            None => BTreeSet::new(),
        }
    }

    /// Highlighted token, if any
    pub fn token(&self) -> Option<usize> {
        match self {
            HighlightState::Idle => None,
            HighlightState::Highlighted { token, .. } => Some(*token),
        }
    }

    /// Sibling set; empty while idle
    pub fn siblings(&self) -> BTreeSet<usize> {
        match self {
            HighlightState::Idle => BTreeSet::new(),
            HighlightState::Highlighted { siblings, .. } => siblings.clone(),
        }
    }

    /// Whether no token is highlighted
    pub fn is_idle(&self) -> bool {
        matches!(self, HighlightState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Rule, Token};
    use std::collections::BTreeMap;

    fn dataset() -> Dataset {
        let mut siblings = BTreeMap::new();
        siblings.insert(0, vec![2, 3]);
        siblings.insert(1, vec![0]);
        Dataset::from_parts(
            vec![Rule::new(1, 50.0)],
            vec![0],
            vec![
                Token::labeled("a", 0),
                Token::unlabeled(" "),
                Token::labeled("b", 0),
                Token::labeled("c", 0),
            ],
            vec![0, 0, 0],
            vec![0, 0, 0],
            vec![0, 0, 0],
        )
        .with_siblings(siblings)
    }

    #[test]
    fn test_initial_idle() {
        let state = HighlightState::default();
        assert!(state.is_idle());
        assert!(state.siblings().is_empty());
    }

    #[test]
    fn test_select_labeled() {
        let ds = dataset();
        let state = HighlightState::Idle.select(&ds, 0).unwrap();
        assert_eq!(state.token(), Some(0));
        assert_eq!(state.siblings(), BTreeSet::from([2, 3]));
    }

    #[test]
    fn test_toggle_off() {
        let ds = dataset();
        let state = HighlightState::Idle
            .select(&ds, 0)
            .unwrap()
            .select(&ds, 0)
            .unwrap();
        assert_eq!(state, HighlightState::Idle);
        assert!(state.siblings().is_empty());
    }

    #[test]
    fn test_direct_switch() {
        let ds = dataset();
        let state = HighlightState::Idle.select(&ds, 2).unwrap();
        let next = state.select(&ds, 3).unwrap();
        assert_eq!(next.token(), Some(3));
        // Token 3 has labeled index 2, which has no recorded siblings
        assert!(next.siblings().is_empty());
    }

    #[test]
    fn test_unlabeled_selection_empty_siblings() {
        let ds = dataset();
        let state = HighlightState::Idle.select(&ds, 1).unwrap();
        assert_eq!(state.token(), Some(1));
        assert!(state.siblings().is_empty());
    }

    #[test]
    fn test_unknown_token() {
        let ds = dataset();
        let err = HighlightState::Idle.select(&ds, 4).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnknownToken {
                token: 4,
                token_count: 4
            }
        ));
    }

    #[test]
    fn test_serialize_tagged() {
        let ds = dataset();
        let state = HighlightState::Idle.select(&ds, 0).unwrap();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "highlighted");
        assert_eq!(json["token"], 0);
        assert_eq!(json["siblings"], serde_json::json!([2, 3]));
    }
}
