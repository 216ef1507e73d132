//! # The cluster/service/role entity hierarchy.
//!
//! Three levels, each driven by its own state machine over a shared
//! per-kind transition table:
//!
//! - [`Cluster`] owns an ordered list of [`Service`]s;
//! - [`Service`] owns an ordered list of [`Role`]s and a back-reference to
//!   its cluster;
//! - [`Role`] is the leaf, bound to a set of hosts.
//!
//! Back-references are non-owning (`Weak`) and used only to route events
//! upward — a child never mutates its parent directly. Entities are
//! assembled once from a [`ClusterSpec`] and then driven purely by events.

mod cluster;
mod progress;
mod role;
mod service;
mod spec;
mod state;
mod tables;

pub use cluster::Cluster;
pub use role::Role;
pub use service::Service;
pub use spec::{ClusterSpec, RoleSpec, ServiceSpec};
pub use state::{ClusterState, RoleState, ServiceState};

pub(crate) use tables::Tables;
