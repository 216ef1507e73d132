//! # Service: a named, ordered grouping of roles.
//!
//! A service starts its roles strictly sequentially (list order) and fans
//! their reports back in through its [`Progress`] counters; stop is an
//! aggregate fan-out to every stoppable role. Completion and failure are
//! reported upward to the owning cluster by posting cluster events.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use crate::error::TransitionError;
use crate::events::{
    ClusterEvent, ClusterEventKind, Dispatcher, Event, RoleEvent, RoleEventKind, ServiceEvent,
    ServiceEventKind,
};
use crate::machine::{Applied, StateMachine};

use super::progress::{Advance, Progress};
use super::spec::ServiceSpec;
use super::state::{RoleState, ServiceState};
use super::tables::Tables;
use super::{Cluster, Role};

/// Mid-tier entity: owns an ordered list of roles, reports to a cluster.
pub struct Service {
    name: Arc<str>,
    cluster: Weak<Cluster>,
    roles: Vec<Arc<Role>>,
    machine: StateMachine<ServiceState, ServiceEventKind, Service, ServiceEvent>,
    progress: Progress,
    dispatcher: Arc<Dispatcher>,
}

impl Service {
    pub(crate) fn assemble(
        spec: &ServiceSpec,
        cluster: Weak<Cluster>,
        tables: &Tables,
        dispatcher: &Arc<Dispatcher>,
        sink: &Arc<dyn crate::actions::ActionSink>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_service: &Weak<Service>| {
            let roles = spec
                .roles
                .iter()
                .map(|role_spec| {
                    Role::assemble(
                        role_spec,
                        Weak::clone(weak_service),
                        Arc::clone(&tables.role),
                        Arc::clone(dispatcher),
                        Arc::clone(sink),
                    )
                })
                .collect();
            Self {
                name: spec.name.as_str().into(),
                cluster,
                roles,
                machine: StateMachine::new(Arc::clone(&tables.service)),
                progress: Progress::new(),
                dispatcher: Arc::clone(dispatcher),
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub(crate) fn cluster_ref(&self) -> &Weak<Cluster> {
        &self.cluster
    }

    /// Owned roles, in startup order.
    pub fn roles(&self) -> &[Arc<Role>] {
        &self.roles
    }

    /// Looks up an owned role by name.
    pub fn find_role(&self, name: &str) -> Option<Arc<Role>> {
        self.roles
            .iter()
            .find(|role| role.name() == name)
            .map(Arc::clone)
    }

    /// Snapshot of the current lifecycle state.
    pub fn state(&self) -> ServiceState {
        self.machine.current()
    }

    /// Read-only snapshot of role states, keyed by role name.
    ///
    /// Eventually consistent relative to in-flight events.
    pub fn role_states(&self) -> BTreeMap<String, RoleState> {
        self.roles
            .iter()
            .map(|role| (role.name().to_string(), role.state()))
            .collect()
    }

    /// `cluster/service` path for logs and notices.
    pub fn path(&self) -> String {
        match self.cluster.upgrade() {
            Some(cluster) => format!("{}/{}", cluster.name(), self.name),
            None => self.name.to_string(),
        }
    }

    /// Single entry point: applies one event to this service's machine.
    pub(crate) fn handle(
        &self,
        event: &ServiceEvent,
    ) -> Result<Applied<ServiceState>, TransitionError> {
        self.machine.apply(self, event.kind, event)
    }

    // ---- transition hooks -------------------------------------------------

    /// Hook for `(Inactive, Start)`: begin a startup round.
    ///
    /// Starts only the first role; the rest follow one at a time as
    /// successes come in. A service with no roles is trivially active.
    pub(crate) fn launch_roles(&self) -> ServiceState {
        let total = self.roles.len();
        self.progress.begin(total);
        if total == 0 {
            self.report(ClusterEventKind::ServiceStartSuccess);
            return ServiceState::Active;
        }
        self.start_role(0);
        ServiceState::Starting
    }

    /// Hook for `(Starting, RoleStartSuccess)`: advance or complete.
    pub(crate) fn record_role_started(&self) -> ServiceState {
        match self.progress.record_child_outcome() {
            Advance::Pending { next } => {
                self.start_role(next);
                ServiceState::Starting
            }
            Advance::Complete => {
                self.report(ClusterEventKind::ServiceStartSuccess);
                ServiceState::Active
            }
        }
    }

    /// Hook for `(Starting, RoleStartFailure)`: fail fast, report upward.
    ///
    /// Already-started roles are not rolled back.
    pub(crate) fn report_start_failed(&self) {
        self.report(ClusterEventKind::ServiceStartFailure);
    }

    /// Hook for `(Active | Fail, Stop)`: begin a stop round.
    ///
    /// Stop fans out to every role that currently has a stop rule
    /// (`Active` or `Fail`); roles never started stay `Inactive` and are
    /// excluded from the tally.
    pub(crate) fn halt_roles(&self) -> ServiceState {
        let stoppable: Vec<Arc<Role>> = self
            .roles
            .iter()
            .filter(|role| matches!(role.state(), RoleState::Active | RoleState::Fail))
            .map(Arc::clone)
            .collect();
        self.progress.begin(stoppable.len());
        if stoppable.is_empty() {
            self.report(ClusterEventKind::ServiceStopSuccess);
            return ServiceState::Inactive;
        }
        for role in stoppable {
            self.dispatcher
                .post(Event::Role(RoleEvent::new(RoleEventKind::Stop, role)));
        }
        ServiceState::Stopping
    }

    /// Hook for `(Stopping, RoleStopSuccess)`: tally or complete.
    pub(crate) fn record_role_stopped(&self) -> ServiceState {
        match self.progress.record_child_outcome() {
            Advance::Pending { .. } => ServiceState::Stopping,
            Advance::Complete => {
                self.report(ClusterEventKind::ServiceStopSuccess);
                ServiceState::Inactive
            }
        }
    }

    /// Hook for `(Stopping, RoleStopFailure)`: report the unclean stop.
    pub(crate) fn report_stop_failed(&self) {
        self.report(ClusterEventKind::ServiceStopFailure);
    }

    fn start_role(&self, index: usize) {
        if let Some(role) = self.roles.get(index) {
            self.dispatcher.post(Event::Role(RoleEvent::new(
                RoleEventKind::Start,
                Arc::clone(role),
            )));
        }
    }

    fn report(&self, kind: ClusterEventKind) {
        if let Some(cluster) = self.cluster.upgrade() {
            self.dispatcher.post(Event::Cluster(
                ClusterEvent::new(kind, cluster).with_child(Arc::clone(&self.name)),
            ));
        }
    }
}
