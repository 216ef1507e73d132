//! # Typed events and the asynchronous dispatcher.
//!
//! [`Event`] is a tagged union over the three entity categories; the
//! [`Dispatcher`] owns a single FIFO queue and routes each event to its
//! target entity's `handle`, which applies it to that entity's state
//! machine. Posting is fire-and-forget; producers never block.

mod dispatcher;
mod event;

pub use dispatcher::Dispatcher;
pub use event::{
    ClusterEvent, ClusterEventKind, Event, RoleEvent, RoleEventKind, ServiceEvent,
    ServiceEventKind,
};
