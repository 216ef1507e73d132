//! # Per-entity state-machine runtime.
//!
//! A [`StateMachine`] binds a shared [`TransitionTable`] to one operand and
//! tracks that operand's current state behind a read/write lock: queries
//! (status snapshots) take the read side, [`StateMachine::apply`] takes the
//! write side for the duration of one transition.
//!
//! `apply` never blocks on I/O — hooks are synchronous and communicate with
//! other entities only by posting events into the dispatcher.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::TransitionError;

use super::table::{Label, Rule, TransitionTable};

/// Outcome of a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied<S> {
    /// State before the event.
    pub from: S,
    /// State after the event.
    pub to: S,
}

/// Runtime state machine bound to one operand.
///
/// The table is shared (one per entity kind); the current state is
/// per-instance. A failed `apply` — unmodeled event or an illegal multi-arc
/// result — leaves the current state untouched.
pub struct StateMachine<S, K, O, E> {
    table: Arc<TransitionTable<S, K, O, E>>,
    current: RwLock<S>,
}

impl<S: Label, K: Label, O, E> StateMachine<S, K, O, E> {
    /// Creates an instance starting in the table's initial state.
    pub fn new(table: Arc<TransitionTable<S, K, O, E>>) -> Self {
        let initial = table.initial();
        Self {
            table,
            current: RwLock::new(initial),
        }
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> S {
        *self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies one event to the operand.
    ///
    /// 1. Looks up the rule for `(current, kind)`; absent →
    ///    [`TransitionError::InvalidTransition`], state unchanged.
    /// 2. Single-arc: runs the hook (if any), then moves to the fixed
    ///    target.
    /// 3. Multi-arc: runs the hook, verifies the returned state is in the
    ///    declared set ([`TransitionError::IllegalResult`] otherwise), then
    ///    moves to it.
    ///
    /// The write lock is held across the hook so that a concurrent status
    /// read never observes a half-applied transition. Hooks must not touch
    /// this machine again (single entry point per entity).
    pub fn apply(&self, operand: &O, kind: K, event: &E) -> Result<Applied<S>, TransitionError> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let from = *current;

        let rule = self
            .table
            .rule(from, kind)
            .ok_or(TransitionError::InvalidTransition {
                state: from.as_str(),
                event: kind.as_str(),
            })?;

        let to = match rule {
            Rule::Single { to, hook } => {
                if let Some(hook) = hook {
                    hook(operand, event);
                }
                *to
            }
            Rule::Choice { allowed, hook } => {
                let chosen = hook(operand, event);
                if !allowed.contains(&chosen) {
                    return Err(TransitionError::IllegalResult {
                        state: from.as_str(),
                        event: kind.as_str(),
                        returned: chosen.as_str(),
                        allowed: allowed.iter().map(|s| s.as_str()).collect(),
                    });
                }
                chosen
            }
        };

        *current = to;
        Ok(Applied { from, to })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::table::TableBuilder;
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Phase {
        Idle,
        Busy,
        Done,
        Stuck,
    }

    impl Label for Phase {
        fn as_str(self) -> &'static str {
            match self {
                Phase::Idle => "IDLE",
                Phase::Busy => "BUSY",
                Phase::Done => "DONE",
                Phase::Stuck => "STUCK",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tick {
        Go,
        Step,
        Break,
    }

    impl Label for Tick {
        fn as_str(self) -> &'static str {
            match self {
                Tick::Go => "GO",
                Tick::Step => "STEP",
                Tick::Break => "BREAK",
            }
        }
    }

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
    }

    fn fixture() -> (StateMachine<Phase, Tick, Counter, u32>, Counter) {
        // Step counts hits; after two steps the choice hook reports Done.
        let table = TableBuilder::new(Phase::Idle)
            .on_with(Phase::Idle, Tick::Go, Phase::Busy, |c: &Counter, _| {
                c.hits.store(0, Ordering::SeqCst);
            })
            .on_choice(
                Phase::Busy,
                Tick::Step,
                vec![Phase::Busy, Phase::Done],
                |c: &Counter, _| {
                    if c.hits.fetch_add(1, Ordering::SeqCst) + 1 >= 2 {
                        Phase::Done
                    } else {
                        Phase::Busy
                    }
                },
            )
            .on_choice(
                Phase::Busy,
                Tick::Break,
                vec![Phase::Busy],
                // Deliberately returns a state outside the declared set.
                |_, _| Phase::Stuck,
            )
            .terminal(Phase::Done)
            .terminal(Phase::Stuck)
            .install()
            .unwrap();
        (StateMachine::new(table), Counter::default())
    }

    #[test]
    fn test_starts_in_initial_state() {
        let (machine, _op) = fixture();
        assert_eq!(machine.current(), Phase::Idle);
    }

    #[test]
    fn test_single_arc_runs_hook_and_moves() {
        let (machine, op) = fixture();
        let applied = machine.apply(&op, Tick::Go, &0).unwrap();
        assert_eq!(applied, Applied { from: Phase::Idle, to: Phase::Busy });
        assert_eq!(machine.current(), Phase::Busy);
    }

    #[test]
    fn test_multi_arc_follows_hook_choice() {
        let (machine, op) = fixture();
        machine.apply(&op, Tick::Go, &0).unwrap();

        let first = machine.apply(&op, Tick::Step, &0).unwrap();
        assert_eq!(first.to, Phase::Busy);

        let second = machine.apply(&op, Tick::Step, &0).unwrap();
        assert_eq!(second.to, Phase::Done);
        assert_eq!(op.hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unmodeled_event_fails_and_preserves_state() {
        let (machine, op) = fixture();
        let err = machine.apply(&op, Tick::Step, &0).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                state: "IDLE",
                event: "STEP",
            }
        );
        assert_eq!(machine.current(), Phase::Idle);
    }

    #[test]
    fn test_illegal_choice_fails_and_preserves_state() {
        let (machine, op) = fixture();
        machine.apply(&op, Tick::Go, &0).unwrap();

        let err = machine.apply(&op, Tick::Break, &0).unwrap_err();
        assert_eq!(err.as_label(), "illegal_transition_result");
        assert_eq!(machine.current(), Phase::Busy);
    }
}
