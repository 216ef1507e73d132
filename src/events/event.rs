//! # Event model.
//!
//! Every event carries an immutable kind, an `Arc` to its target entity,
//! a globally monotonic sequence number, and a wall-clock timestamp.
//! Upward-reporting cluster/service events additionally name the child
//! whose completion triggered them.
//!
//! The top-level [`Event`] enum replaces reflective double dispatch with a
//! pattern match: the dispatcher destructures the category and calls the
//! target's `handle` directly, so no casts exist anywhere on the path.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::machine::Label;
use crate::model::{Cluster, Role, Service};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Process-wide event sum type routed by the dispatcher.
#[derive(Clone)]
pub enum Event {
    Cluster(ClusterEvent),
    Service(ServiceEvent),
    Role(RoleEvent),
}

impl Event {
    /// Short stable label of the inner event kind (for logs/notices).
    pub fn kind_label(&self) -> &'static str {
        match self {
            Event::Cluster(e) => e.kind.as_str(),
            Event::Service(e) => e.kind.as_str(),
            Event::Role(e) => e.kind.as_str(),
        }
    }

    /// Slash-separated path of the target entity.
    pub fn target_path(&self) -> String {
        match self {
            Event::Cluster(e) => e.target.path(),
            Event::Service(e) => e.target.path(),
            Event::Role(e) => e.target.path(),
        }
    }

    /// Sequence number of the inner event.
    pub fn seq(&self) -> u64 {
        match self {
            Event::Cluster(e) => e.seq,
            Event::Service(e) => e.seq,
            Event::Role(e) => e.seq,
        }
    }

    /// Timestamp of the inner event.
    pub fn at(&self) -> SystemTime {
        match self {
            Event::Cluster(e) => e.at,
            Event::Service(e) => e.at,
            Event::Role(e) => e.at,
        }
    }
}

/// Kinds of events a cluster's machine understands.
///
/// `Service*` kinds are upward reports posted by a service's hooks; the
/// rest are client control requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterEventKind {
    /// Begin sequential startup of the owned services.
    Start,
    /// Begin shutdown of the owned services.
    Stop,
    /// Release the cluster's nodes back to the pool.
    ReleaseNodes,
    /// Reclaim nodes for a cluster parked in the attic.
    AddNodes,
    /// A service finished starting.
    ServiceStartSuccess,
    /// A service failed to start.
    ServiceStartFailure,
    /// A service finished stopping.
    ServiceStopSuccess,
    /// A service failed to stop cleanly.
    ServiceStopFailure,
}

impl Label for ClusterEventKind {
    fn as_str(self) -> &'static str {
        match self {
            ClusterEventKind::Start => "S_START",
            ClusterEventKind::Stop => "S_STOP",
            ClusterEventKind::ReleaseNodes => "S_RELEASE_NODES",
            ClusterEventKind::AddNodes => "S_ADD_NODES",
            ClusterEventKind::ServiceStartSuccess => "S_SERVICE_START_SUCCESS",
            ClusterEventKind::ServiceStartFailure => "S_SERVICE_START_FAILURE",
            ClusterEventKind::ServiceStopSuccess => "S_SERVICE_STOP_SUCCESS",
            ClusterEventKind::ServiceStopFailure => "S_SERVICE_STOP_FAILURE",
        }
    }
}

/// Event targeting a [`Cluster`].
#[derive(Clone)]
pub struct ClusterEvent {
    /// Event classification.
    pub kind: ClusterEventKind,
    /// The cluster this event is applied to.
    pub target: Arc<Cluster>,
    /// Name of the reporting service, for `Service*` kinds.
    pub child: Option<Arc<str>>,
    /// Globally monotonic sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
}

impl ClusterEvent {
    /// Creates a new event with the next sequence number.
    pub fn new(kind: ClusterEventKind, target: Arc<Cluster>) -> Self {
        Self {
            kind,
            target,
            child: None,
            seq: next_seq(),
            at: SystemTime::now(),
        }
    }

    /// Names the child entity whose completion triggered this event.
    #[inline]
    pub fn with_child(mut self, child: impl Into<Arc<str>>) -> Self {
        self.child = Some(child.into());
        self
    }
}

/// Kinds of events a service's machine understands.
///
/// `Role*` kinds are upward reports posted by a role's hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceEventKind {
    /// Begin sequential startup of the owned roles.
    Start,
    /// Begin shutdown of the owned roles.
    Stop,
    /// A role finished starting.
    RoleStartSuccess,
    /// A role failed to start.
    RoleStartFailure,
    /// A role finished stopping.
    RoleStopSuccess,
    /// A role failed to stop cleanly.
    RoleStopFailure,
}

impl Label for ServiceEventKind {
    fn as_str(self) -> &'static str {
        match self {
            ServiceEventKind::Start => "S_START",
            ServiceEventKind::Stop => "S_STOP",
            ServiceEventKind::RoleStartSuccess => "S_ROLE_START_SUCCESS",
            ServiceEventKind::RoleStartFailure => "S_ROLE_START_FAILURE",
            ServiceEventKind::RoleStopSuccess => "S_ROLE_STOP_SUCCESS",
            ServiceEventKind::RoleStopFailure => "S_ROLE_STOP_FAILURE",
        }
    }
}

/// Event targeting a [`Service`].
#[derive(Clone)]
pub struct ServiceEvent {
    /// Event classification.
    pub kind: ServiceEventKind,
    /// The service this event is applied to.
    pub target: Arc<Service>,
    /// Name of the reporting role, for `Role*` kinds.
    pub child: Option<Arc<str>>,
    /// Globally monotonic sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
}

impl ServiceEvent {
    /// Creates a new event with the next sequence number.
    pub fn new(kind: ServiceEventKind, target: Arc<Service>) -> Self {
        Self {
            kind,
            target,
            child: None,
            seq: next_seq(),
            at: SystemTime::now(),
        }
    }

    /// Names the child entity whose completion triggered this event.
    #[inline]
    pub fn with_child(mut self, child: impl Into<Arc<str>>) -> Self {
        self.child = Some(child.into());
        self
    }
}

/// Kinds of events a role's machine understands.
///
/// Success/failure kinds originate from agent heartbeats; `Start`/`Stop`
/// are posted by the owning service's hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleEventKind {
    /// Emit a start action for the agent and await its report.
    Start,
    /// Emit a stop action for the agent and await its report.
    Stop,
    /// The agent reported the role process up.
    StartSuccess,
    /// The agent reported the role failed to come up.
    StartFailure,
    /// The agent reported the role stopped cleanly.
    StopSuccess,
    /// The agent reported the role failed to stop.
    StopFailure,
}

impl Label for RoleEventKind {
    fn as_str(self) -> &'static str {
        match self {
            RoleEventKind::Start => "S_START",
            RoleEventKind::Stop => "S_STOP",
            RoleEventKind::StartSuccess => "S_START_SUCCESS",
            RoleEventKind::StartFailure => "S_START_FAILURE",
            RoleEventKind::StopSuccess => "S_STOP_SUCCESS",
            RoleEventKind::StopFailure => "S_STOP_FAILURE",
        }
    }
}

/// Event targeting a [`Role`].
#[derive(Clone)]
pub struct RoleEvent {
    /// Event classification.
    pub kind: RoleEventKind,
    /// The role this event is applied to.
    pub target: Arc<Role>,
    /// Globally monotonic sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
}

impl RoleEvent {
    /// Creates a new event with the next sequence number.
    pub fn new(kind: RoleEventKind, target: Arc<Role>) -> Self {
        Self {
            kind,
            target,
            seq: next_seq(),
            at: SystemTime::now(),
        }
    }
}
