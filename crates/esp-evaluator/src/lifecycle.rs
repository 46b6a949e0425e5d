// SPDX-License-Identifier: MIT OR Apache-2.0
//! Evaluator lifecycle state machine — tracks and enforces valid state
//! transitions for a single evaluator (`spec.md` §3 "Entity lifecycles",
//! §4.3).

use std::fmt;

/// Lifecycle state of one evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorState {
    /// Configuration accepted but no `EvaluateRequest` has run yet.
    Uninitialized,
    /// Idle between evaluations.
    Ready,
    /// Currently processing an `EvaluateRequest`.
    Evaluating,
    /// `CloseEvaluator` was received; the id is no longer valid.
    Closed,
    /// The evaluator hit an unrecoverable fault.
    Failed,
}

impl fmt::Display for EvaluatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Evaluating => "evaluating",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Record of a single lifecycle state transition.
#[derive(Debug, Clone)]
pub struct LifecycleTransition {
    /// State before the transition.
    pub from: EvaluatorState,
    /// State after the transition.
    pub to: EvaluatorState,
    /// ISO-8601 timestamp of when the transition occurred.
    pub timestamp: String,
}

/// Errors produced by [`EvaluatorLifecycle`] when a transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The requested transition is not allowed by the state machine.
    #[error("invalid evaluator lifecycle transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: EvaluatorState,
        /// Requested target state.
        to: EvaluatorState,
    },
}

/// Tracks one evaluator's state plus its transition history.
#[derive(Debug)]
pub struct EvaluatorLifecycle {
    state: EvaluatorState,
    history: Vec<LifecycleTransition>,
}

impl EvaluatorLifecycle {
    /// Create a manager in the [`EvaluatorState::Uninitialized`] state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: EvaluatorState::Uninitialized,
            history: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    /// Attempt to transition to a new state.
    pub fn transition(&mut self, to: EvaluatorState) -> Result<(), LifecycleError> {
        if !self.can_transition(to) {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        let from = self.state;
        self.state = to;
        self.history.push(LifecycleTransition {
            from,
            to,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    /// Returns `true` if transitioning from the current state to `to` is
    /// valid.
    #[must_use]
    pub fn can_transition(&self, to: EvaluatorState) -> bool {
        // Any state may fail; a failed evaluator never recovers.
        if matches!(to, EvaluatorState::Failed) {
            return !matches!(self.state, EvaluatorState::Closed);
        }
        matches!(
            (self.state, to),
            (EvaluatorState::Uninitialized, EvaluatorState::Ready)
                | (EvaluatorState::Ready, EvaluatorState::Evaluating)
                | (EvaluatorState::Evaluating, EvaluatorState::Ready)
                | (EvaluatorState::Ready, EvaluatorState::Closed)
                | (EvaluatorState::Evaluating, EvaluatorState::Closed)
        )
    }

    /// Full history of state transitions.
    #[must_use]
    pub fn history(&self) -> &[LifecycleTransition] {
        &self.history
    }
}

impl Default for EvaluatorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_full_create_evaluate_close_path() {
        let mut lifecycle = EvaluatorLifecycle::new();
        lifecycle.transition(EvaluatorState::Ready).unwrap();
        lifecycle.transition(EvaluatorState::Evaluating).unwrap();
        lifecycle.transition(EvaluatorState::Ready).unwrap();
        lifecycle.transition(EvaluatorState::Closed).unwrap();
        assert_eq!(lifecycle.state(), EvaluatorState::Closed);
        assert_eq!(lifecycle.history().len(), 4);
    }

    #[test]
    fn rejects_evaluating_before_ready() {
        let mut lifecycle = EvaluatorLifecycle::new();
        let err = lifecycle.transition(EvaluatorState::Evaluating).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn closed_is_terminal_even_for_failure() {
        let mut lifecycle = EvaluatorLifecycle::new();
        lifecycle.transition(EvaluatorState::Ready).unwrap();
        lifecycle.transition(EvaluatorState::Closed).unwrap();
        assert!(lifecycle.transition(EvaluatorState::Failed).is_err());
    }

    #[test]
    fn any_non_closed_state_may_fail() {
        let mut lifecycle = EvaluatorLifecycle::new();
        lifecycle.transition(EvaluatorState::Ready).unwrap();
        lifecycle.transition(EvaluatorState::Evaluating).unwrap();
        lifecycle.transition(EvaluatorState::Failed).unwrap();
        assert_eq!(lifecycle.state(), EvaluatorState::Failed);
    }
}
