//! # Table-driven state-machine engine.
//!
//! The engine is split in two, mirroring the build-once / run-many split:
//!
//! - [`TransitionTable`] — an immutable `(state, event kind) -> rule` map,
//!   built once per entity *kind* through [`TableBuilder`] and shared (via
//!   `Arc`) by every instance of that kind.
//! - [`StateMachine`] — the per-entity runtime: holds the current state and
//!   a reference to the shared table, and exposes a single operation,
//!   [`StateMachine::apply`].
//!
//! Rules come in two shapes:
//!
//! - **single-arc**: a deterministic target state plus an optional
//!   side-effecting hook;
//! - **multi-arc**: the hook runs first, inspects the operand's runtime
//!   counters, and returns one of a declared set of legal target states.
//!
//! Hooks communicate with other entities only by posting events; they never
//! drive another entity's machine directly, so each entity keeps a single
//! entry point.

mod instance;
mod table;

pub use instance::{Applied, StateMachine};
pub use table::{Label, TableBuilder, TransitionTable};
