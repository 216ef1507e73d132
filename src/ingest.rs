//! # Heartbeat ingestion.
//!
//! The heartbeat transport itself (REST endpoint, JSON schema) lives
//! outside the core; what arrives here is its distilled content: a host
//! said something about some roles. [`HeartbeatIngest`] resolves each
//! observation against the cluster topology and posts the matching role
//! event — the core's only ingress besides the client control surface.
//!
//! Stray reports never crash ingestion: unknown services, unknown roles,
//! and reports from hosts a role is not bound to are skipped with a
//! warning and counted in the summary.

use std::sync::Arc;

use crate::events::{Event, RoleEvent, RoleEventKind};
use crate::model::Cluster;

/// Outcome a heartbeat attributes to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOutcome {
    StartSucceeded,
    StartFailed,
    StopSucceeded,
    StopFailed,
}

impl RoleOutcome {
    fn kind(self) -> RoleEventKind {
        match self {
            RoleOutcome::StartSucceeded => RoleEventKind::StartSuccess,
            RoleOutcome::StartFailed => RoleEventKind::StartFailure,
            RoleOutcome::StopSucceeded => RoleEventKind::StopSuccess,
            RoleOutcome::StopFailed => RoleEventKind::StopFailure,
        }
    }
}

/// One role-level statement inside a heartbeat.
#[derive(Debug, Clone)]
pub struct RoleObservation {
    /// Name of the owning service.
    pub service: String,
    /// Role name within that service.
    pub role: String,
    /// What the agent observed.
    pub outcome: RoleOutcome,
}

/// Distilled content of one agent heartbeat.
#[derive(Debug, Clone)]
pub struct HeartbeatReport {
    /// Host the report came from.
    pub hostname: String,
    /// Role outcomes carried by this heartbeat.
    pub observations: Vec<RoleObservation>,
}

/// Counts returned by [`HeartbeatIngest::ingest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Observations translated into posted role events.
    pub posted: usize,
    /// Observations skipped (unknown service/role or foreign host).
    pub skipped: usize,
}

/// Translates agent heartbeats into role events for one cluster.
pub struct HeartbeatIngest {
    cluster: Arc<Cluster>,
}

impl HeartbeatIngest {
    pub fn new(cluster: Arc<Cluster>) -> Self {
        Self { cluster }
    }

    /// Posts a role event per resolvable observation.
    ///
    /// A role with a non-empty host set only accepts reports from those
    /// hosts; an empty host set accepts any host.
    pub fn ingest(&self, report: &HeartbeatReport) -> IngestSummary {
        let mut summary = IngestSummary::default();

        for observation in &report.observations {
            let Some(service) = self.cluster.find_service(&observation.service) else {
                eprintln!(
                    "[clustervisor] heartbeat from '{}' names unknown service '{}'; skipped",
                    report.hostname, observation.service
                );
                summary.skipped += 1;
                continue;
            };
            let Some(role) = service.find_role(&observation.role) else {
                eprintln!(
                    "[clustervisor] heartbeat from '{}' names unknown role '{}/{}'; skipped",
                    report.hostname, observation.service, observation.role
                );
                summary.skipped += 1;
                continue;
            };
            let host_bound = !role.hosts().is_empty();
            if host_bound && !role.hosts().iter().any(|h| **h == *report.hostname) {
                eprintln!(
                    "[clustervisor] heartbeat from '{}' not in host set of '{}'; skipped",
                    report.hostname,
                    role.path()
                );
                summary.skipped += 1;
                continue;
            }

            self.cluster.dispatcher().post(Event::Role(RoleEvent::new(
                observation.outcome.kind(),
                role,
            )));
            summary.posted += 1;
        }

        summary
    }
}
