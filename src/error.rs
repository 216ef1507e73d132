//! Error types used by the state-machine engine and the runtime.
//!
//! Three error families:
//!
//! - [`TransitionError`] — an event was applied that the transition table
//!   does not model, or a multi-arc hook returned an undeclared state.
//! - [`TableError`] — a transition table failed install-time validation.
//! - [`RuntimeError`] — errors raised by the runtime itself (shutdown).
//!
//! Domain failures (`*StartFailure`, `*StopFailure` events) are **not**
//! errors: they are modeled transitions into `Fail`/`UncleanStop`.

use std::time::Duration;

use thiserror::Error;

/// # Errors produced by applying an event to a state machine.
///
/// Both variants indicate a protocol or configuration defect, not a
/// transient operational failure; neither is retried, and neither mutates
/// the machine's current state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// No rule exists for the `(current state, event)` pair.
    ///
    /// The event is undefined input for the entity's current state. State
    /// is left unchanged; the caller decides whether to log or surface it.
    #[error("no transition from state `{state}` on event `{event}`")]
    InvalidTransition {
        /// Current state at the time the event arrived.
        state: &'static str,
        /// Event kind that had no matching rule.
        event: &'static str,
    },

    /// A multi-arc hook returned a state outside its declared target set.
    ///
    /// Indicates a misconfigured table or a buggy hook; fatal to the
    /// operation, never silently coerced.
    #[error(
        "hook for state `{state}` on event `{event}` returned `{returned}`, \
         not in declared set {allowed:?}"
    )]
    IllegalResult {
        /// State the rule fired from.
        state: &'static str,
        /// Event kind that fired the rule.
        event: &'static str,
        /// The state the hook actually returned.
        returned: &'static str,
        /// The set of states the rule declared legal.
        allowed: Vec<&'static str>,
    },
}

impl TransitionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransitionError::InvalidTransition { .. } => "invalid_transition",
            TransitionError::IllegalResult { .. } => "illegal_transition_result",
        }
    }
}

/// # Errors detected while installing a transition table.
///
/// All variants are configuration defects caught before any entity exists;
/// a controller that fails to install its tables never starts.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Two rules were registered for the same `(state, event)` pair.
    #[error("duplicate rule for state `{state}` on event `{event}`")]
    DuplicateRule {
        state: &'static str,
        event: &'static str,
    },

    /// A multi-arc rule declared an empty target set.
    #[error("empty target set for state `{state}` on event `{event}`")]
    EmptyTargetSet {
        state: &'static str,
        event: &'static str,
    },

    /// A reachable state has no outgoing rules and was not marked terminal.
    #[error("state `{state}` is reachable but has no outgoing transitions")]
    DeadEndState { state: &'static str },
}

impl TableError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TableError::DuplicateRule { .. } => "table_duplicate_rule",
            TableError::EmptyTargetSet { .. } => "table_empty_target_set",
            TableError::DeadEndState { .. } => "table_dead_end_state",
        }
    }
}

/// # Errors produced by the runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period elapsed before the event queue went quiet.
    #[error("shutdown grace {grace:?} exceeded with events still in flight")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}
