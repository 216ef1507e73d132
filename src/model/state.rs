//! # Lifecycle states for the three entity kinds.
//!
//! All three kinds share the same core shape — `Inactive` (initial),
//! `Starting`, `Active`, `Stopping`, `Fail`, `UncleanStop` — and the
//! cluster adds `Attic` (nodes released). `Fail` and `UncleanStop` are
//! absorbing with respect to startup: the only modeled exit from `Fail` is
//! a `Stop`, and `UncleanStop` has no modeled exit at all.

use std::fmt;

use crate::machine::Label;

/// Lifecycle state of a [`Cluster`](crate::Cluster).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterState {
    /// Constructed, nothing running. Initial state.
    Inactive,
    /// Services are being started one at a time, in list order.
    Starting,
    /// Every enabled service reported a successful start.
    Active,
    /// A stop was requested; waiting for services to report back.
    Stopping,
    /// A service failed to start. Exit via `Stop` only.
    Fail,
    /// A service failed to stop cleanly. No modeled exit.
    UncleanStop,
    /// Nodes released back to the pool. Reachable from `Inactive` only.
    Attic,
}

impl ClusterState {
    /// Short stable name, matching the wire/state vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            ClusterState::Inactive => "INACTIVE",
            ClusterState::Starting => "STARTING",
            ClusterState::Active => "ACTIVE",
            ClusterState::Stopping => "STOPPING",
            ClusterState::Fail => "FAIL",
            ClusterState::UncleanStop => "UNCLEAN_STOP",
            ClusterState::Attic => "ATTIC",
        }
    }
}

impl Label for ClusterState {
    fn as_str(self) -> &'static str {
        ClusterState::as_str(self)
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a [`Service`](crate::Service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Constructed, nothing running. Initial state.
    Inactive,
    /// Roles are being started one at a time, in list order.
    Starting,
    /// Every enabled role reported a successful start.
    Active,
    /// A stop was requested; waiting for roles to report back.
    Stopping,
    /// A role failed to start. Exit via `Stop` only.
    Fail,
    /// A role failed to stop cleanly. No modeled exit.
    UncleanStop,
}

impl ServiceState {
    /// Short stable name, matching the wire/state vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceState::Inactive => "INACTIVE",
            ServiceState::Starting => "STARTING",
            ServiceState::Active => "ACTIVE",
            ServiceState::Stopping => "STOPPING",
            ServiceState::Fail => "FAIL",
            ServiceState::UncleanStop => "UNCLEAN_STOP",
        }
    }
}

impl Label for ServiceState {
    fn as_str(self) -> &'static str {
        ServiceState::as_str(self)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a [`Role`](crate::Role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleState {
    /// Constructed, no agent process expected. Initial state.
    Inactive,
    /// A start action was emitted; waiting for the agent to report.
    Starting,
    /// The agent reported a successful start.
    Active,
    /// A stop action was emitted; waiting for the agent to report.
    Stopping,
    /// The agent reported a start failure. Exit via `Stop` only.
    Fail,
    /// The agent reported a stop failure. No modeled exit.
    UncleanStop,
}

impl RoleState {
    /// Short stable name, matching the wire/state vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            RoleState::Inactive => "INACTIVE",
            RoleState::Starting => "STARTING",
            RoleState::Active => "ACTIVE",
            RoleState::Stopping => "STOPPING",
            RoleState::Fail => "FAIL",
            RoleState::UncleanStop => "UNCLEAN_STOP",
        }
    }
}

impl Label for RoleState {
    fn as_str(self) -> &'static str {
        RoleState::as_str(self)
    }
}

impl fmt::Display for RoleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
