//! # Transition tables and their fluent builder.
//!
//! A [`TransitionTable`] is immutable after [`TableBuilder::install`] and is
//! shared by all state machines of one entity kind. Building happens once,
//! at controller startup — never per instance, never lazily at first use —
//! so configuration defects surface before any entity exists.
//!
//! ## Validation
//! `install()` rejects:
//! - duplicate `(state, kind)` registrations;
//! - multi-arc rules with an empty target set;
//! - states that are reachable (initial, or the target of some rule) but
//!   have no outgoing rule and were not explicitly marked
//!   [`TableBuilder::terminal`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::TableError;

/// Compact contract for the enums a table is keyed by: states and event
/// kinds. The `&'static str` label feeds error messages and observer
/// notices without dragging generic formatting through the engine.
pub trait Label: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Short stable name of this value.
    fn as_str(self) -> &'static str;
}

/// Side-effect hook for single-arc rules.
pub(crate) type Hook<O, E> = Box<dyn Fn(&O, &E) + Send + Sync>;

/// Computing hook for multi-arc rules; returns the chosen target state.
pub(crate) type ChoiceHook<S, O, E> = Box<dyn Fn(&O, &E) -> S + Send + Sync>;

/// One transition rule.
pub(crate) enum Rule<S, O, E> {
    /// Deterministic target, optional side effect.
    Single { to: S, hook: Option<Hook<O, E>> },
    /// Hook-computed target, bounded by the declared set.
    Choice {
        allowed: Vec<S>,
        hook: ChoiceHook<S, O, E>,
    },
}

/// Immutable `(state, kind) -> rule` map for one entity kind.
///
/// Type parameters: `S` state enum, `K` event-kind enum, `O` operand (the
/// entity type the hooks receive), `E` the concrete event struct.
pub struct TransitionTable<S, K, O, E> {
    initial: S,
    rules: HashMap<(S, K), Rule<S, O, E>>,
}

impl<S: fmt::Debug, K: fmt::Debug, O, E> fmt::Debug for TransitionTable<S, K, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("initial", &self.initial)
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S: Label, K: Label, O, E> TransitionTable<S, K, O, E> {
    /// The state every new machine instance starts in.
    pub fn initial(&self) -> S {
        self.initial
    }

    /// Looks up the rule for `(state, kind)`, if modeled.
    pub(crate) fn rule(&self, state: S, kind: K) -> Option<&Rule<S, O, E>> {
        self.rules.get(&(state, kind))
    }
}

/// Fluent builder for a [`TransitionTable`].
///
/// Registration errors are remembered and surfaced by [`install`], keeping
/// the chain free of per-call `Result` plumbing.
///
/// [`install`]: TableBuilder::install
pub struct TableBuilder<S, K, O, E> {
    initial: S,
    rules: HashMap<(S, K), Rule<S, O, E>>,
    terminal: HashSet<S>,
    defect: Option<TableError>,
}

impl<S: Label, K: Label, O, E> TableBuilder<S, K, O, E> {
    /// Starts a table whose machines begin in `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            rules: HashMap::new(),
            terminal: HashSet::new(),
            defect: None,
        }
    }

    /// Registers a single-arc rule with no side effect.
    pub fn on(self, from: S, kind: K, to: S) -> Self {
        self.register(from, kind, Rule::Single { to, hook: None })
    }

    /// Registers a single-arc rule with a side-effecting hook.
    ///
    /// The hook runs before the state is updated and must not block; any
    /// cross-entity effect goes through the dispatcher as an event.
    pub fn on_with(
        self,
        from: S,
        kind: K,
        to: S,
        hook: impl Fn(&O, &E) + Send + Sync + 'static,
    ) -> Self {
        self.register(
            from,
            kind,
            Rule::Single {
                to,
                hook: Some(Box::new(hook)),
            },
        )
    }

    /// Registers a multi-arc rule.
    ///
    /// The hook computes the target state; only members of `allowed` are
    /// legal return values, enforced at apply time.
    pub fn on_choice(
        self,
        from: S,
        kind: K,
        allowed: impl Into<Vec<S>>,
        hook: impl Fn(&O, &E) -> S + Send + Sync + 'static,
    ) -> Self {
        let allowed = allowed.into();
        if allowed.is_empty() {
            return self.reject(TableError::EmptyTargetSet {
                state: from.as_str(),
                event: kind.as_str(),
            });
        }
        self.register(
            from,
            kind,
            Rule::Choice {
                allowed,
                hook: Box::new(hook),
            },
        )
    }

    /// Marks a state as intentionally terminal, exempting it from the
    /// dead-end check.
    pub fn terminal(mut self, state: S) -> Self {
        self.terminal.insert(state);
        self
    }

    /// Finalizes the table.
    ///
    /// Returns the first registration defect, or a dead-end error if some
    /// reachable, non-terminal state has no outgoing rule.
    pub fn install(self) -> Result<Arc<TransitionTable<S, K, O, E>>, TableError> {
        if let Some(defect) = self.defect {
            return Err(defect);
        }

        let mut reachable: HashSet<S> = HashSet::new();
        reachable.insert(self.initial);
        for rule in self.rules.values() {
            match rule {
                Rule::Single { to, .. } => {
                    reachable.insert(*to);
                }
                Rule::Choice { allowed, .. } => {
                    reachable.extend(allowed.iter().copied());
                }
            }
        }
        for state in &reachable {
            let has_exit = self.rules.keys().any(|(from, _)| from == state);
            if !has_exit && !self.terminal.contains(state) {
                return Err(TableError::DeadEndState {
                    state: state.as_str(),
                });
            }
        }

        Ok(Arc::new(TransitionTable {
            initial: self.initial,
            rules: self.rules,
        }))
    }

    fn register(mut self, from: S, kind: K, rule: Rule<S, O, E>) -> Self {
        if self.defect.is_some() {
            return self;
        }
        if self.rules.contains_key(&(from, kind)) {
            return self.reject(TableError::DuplicateRule {
                state: from.as_str(),
                event: kind.as_str(),
            });
        }
        self.rules.insert((from, kind), rule);
        self
    }

    fn reject(mut self, defect: TableError) -> Self {
        if self.defect.is_none() {
            self.defect = Some(defect);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Phase {
        Idle,
        Busy,
        Done,
    }

    impl Label for Phase {
        fn as_str(self) -> &'static str {
            match self {
                Phase::Idle => "IDLE",
                Phase::Busy => "BUSY",
                Phase::Done => "DONE",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tick {
        Go,
        Finish,
    }

    impl Label for Tick {
        fn as_str(self) -> &'static str {
            match self {
                Tick::Go => "GO",
                Tick::Finish => "FINISH",
            }
        }
    }

    type Builder = TableBuilder<Phase, Tick, (), ()>;

    #[test]
    fn test_install_validates_clean_table() {
        let table = Builder::new(Phase::Idle)
            .on(Phase::Idle, Tick::Go, Phase::Busy)
            .on(Phase::Busy, Tick::Finish, Phase::Done)
            .terminal(Phase::Done)
            .install()
            .unwrap();
        assert_eq!(table.initial(), Phase::Idle);
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let err = Builder::new(Phase::Idle)
            .on(Phase::Idle, Tick::Go, Phase::Busy)
            .on(Phase::Idle, Tick::Go, Phase::Done)
            .install()
            .unwrap_err();
        assert_eq!(
            err,
            TableError::DuplicateRule {
                state: "IDLE",
                event: "GO",
            }
        );
    }

    #[test]
    fn test_empty_target_set_rejected() {
        let err = Builder::new(Phase::Idle)
            .on_choice(Phase::Idle, Tick::Go, Vec::<Phase>::new(), |_, _| Phase::Busy)
            .install()
            .unwrap_err();
        assert_eq!(err.as_label(), "table_empty_target_set");
    }

    #[test]
    fn test_dead_end_state_rejected() {
        // Busy is reachable but has no exit and is not marked terminal.
        let err = Builder::new(Phase::Idle)
            .on(Phase::Idle, Tick::Go, Phase::Busy)
            .install()
            .unwrap_err();
        assert_eq!(err, TableError::DeadEndState { state: "BUSY" });
    }

    #[test]
    fn test_first_defect_wins() {
        let err = Builder::new(Phase::Idle)
            .on(Phase::Idle, Tick::Go, Phase::Busy)
            .on(Phase::Idle, Tick::Go, Phase::Busy)
            .on_choice(Phase::Busy, Tick::Finish, Vec::<Phase>::new(), |_, _| Phase::Done)
            .install()
            .unwrap_err();
        assert_eq!(err.as_label(), "table_duplicate_rule");
    }
}
