//! # Cluster: the root of the entity hierarchy.
//!
//! A cluster owns an ordered list of services, starts them strictly
//! sequentially, and fans their reports back in through its [`Progress`]
//! counters. The client control surface (`activate`, `deactivate`,
//! `terminate`, `restore`) posts events into the dispatcher and returns
//! immediately; state is only ever changed by the dispatch loop applying
//! those events.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use crate::actions::ActionSink;
use crate::error::TransitionError;
use crate::events::{ClusterEvent, ClusterEventKind, Dispatcher, Event, ServiceEvent, ServiceEventKind};
use crate::machine::{Applied, StateMachine};

use super::progress::{Advance, Progress};
use super::spec::ClusterSpec;
use super::state::{ClusterState, ServiceState};
use super::tables::Tables;
use super::Service;

/// Root entity: the whole managed cluster.
pub struct Cluster {
    name: Arc<str>,
    services: Vec<Arc<Service>>,
    machine: StateMachine<ClusterState, ClusterEventKind, Cluster, ClusterEvent>,
    progress: Progress,
    dispatcher: Arc<Dispatcher>,
}

impl Cluster {
    /// Builds the whole entity tree from a topology spec.
    ///
    /// Entities are wired once here — services and roles are attached
    /// before any event can reach them and are never re-parented.
    pub(crate) fn assemble(
        spec: &ClusterSpec,
        tables: &Tables,
        dispatcher: Arc<Dispatcher>,
        sink: Arc<dyn ActionSink>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_cluster: &Weak<Cluster>| {
            let services = spec
                .services
                .iter()
                .map(|service_spec| {
                    Service::assemble(
                        service_spec,
                        Weak::clone(weak_cluster),
                        tables,
                        &dispatcher,
                        &sink,
                    )
                })
                .collect();
            Self {
                name: spec.name.as_str().into(),
                services,
                machine: StateMachine::new(Arc::clone(&tables.cluster)),
                progress: Progress::new(),
                dispatcher,
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub(crate) fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Owned services, in startup order.
    pub fn services(&self) -> &[Arc<Service>] {
        &self.services
    }

    /// Looks up an owned service by name.
    pub fn find_service(&self, name: &str) -> Option<Arc<Service>> {
        self.services
            .iter()
            .find(|service| service.name() == name)
            .map(Arc::clone)
    }

    /// Snapshot of the current lifecycle state.
    ///
    /// Idempotent: two reads with no intervening events agree.
    pub fn state(&self) -> ClusterState {
        self.machine.current()
    }

    /// Read-only snapshot of service states, keyed by service name.
    ///
    /// Taken under the read locks; eventually consistent relative to
    /// in-flight events.
    pub fn service_states(&self) -> BTreeMap<String, ServiceState> {
        self.services
            .iter()
            .map(|service| (service.name().to_string(), service.state()))
            .collect()
    }

    /// Path of this entity for logs and notices (just the name).
    pub fn path(&self) -> String {
        self.name.to_string()
    }

    // ---- client control surface -------------------------------------------

    /// Requests startup: posts `Start` and returns immediately.
    pub fn activate(self: &Arc<Self>) {
        self.post_control(ClusterEventKind::Start);
    }

    /// Requests shutdown: posts `Stop` and returns immediately.
    pub fn deactivate(self: &Arc<Self>) {
        self.post_control(ClusterEventKind::Stop);
    }

    /// Releases the cluster's nodes: posts `ReleaseNodes`.
    pub fn terminate(self: &Arc<Self>) {
        self.post_control(ClusterEventKind::ReleaseNodes);
    }

    /// Reclaims nodes for an attic'd cluster: posts `AddNodes`.
    pub fn restore(self: &Arc<Self>) {
        self.post_control(ClusterEventKind::AddNodes);
    }

    fn post_control(self: &Arc<Self>, kind: ClusterEventKind) {
        self.dispatcher
            .post(Event::Cluster(ClusterEvent::new(kind, Arc::clone(self))));
    }

    /// Single entry point: applies one event to this cluster's machine.
    pub(crate) fn handle(
        &self,
        event: &ClusterEvent,
    ) -> Result<Applied<ClusterState>, TransitionError> {
        self.machine.apply(self, event.kind, event)
    }

    // ---- transition hooks -------------------------------------------------

    /// Hook for `(Inactive, Start)`: begin a startup round.
    ///
    /// Starts only the first service; the rest follow one at a time as
    /// successes come in. A cluster with no services is trivially active.
    pub(crate) fn launch_services(&self) -> ClusterState {
        let total = self.services.len();
        self.progress.begin(total);
        if total == 0 {
            return ClusterState::Active;
        }
        self.start_service(0);
        ClusterState::Starting
    }

    /// Hook for `(Starting, ServiceStartSuccess)`: advance or complete.
    pub(crate) fn record_service_started(&self) -> ClusterState {
        match self.progress.record_child_outcome() {
            Advance::Pending { next } => {
                self.start_service(next);
                ClusterState::Starting
            }
            Advance::Complete => ClusterState::Active,
        }
    }

    /// Hook for `(Active | Fail, Stop)`: begin a stop round.
    ///
    /// Stop fans out to every service that currently has a stop rule
    /// (`Active` or `Fail`); services never started are excluded.
    pub(crate) fn halt_services(&self) -> ClusterState {
        let stoppable: Vec<Arc<Service>> = self
            .services
            .iter()
            .filter(|service| {
                matches!(service.state(), ServiceState::Active | ServiceState::Fail)
            })
            .map(Arc::clone)
            .collect();
        self.progress.begin(stoppable.len());
        if stoppable.is_empty() {
            return ClusterState::Inactive;
        }
        for service in stoppable {
            self.dispatcher.post(Event::Service(ServiceEvent::new(
                ServiceEventKind::Stop,
                service,
            )));
        }
        ClusterState::Stopping
    }

    /// Hook for `(Stopping, ServiceStopSuccess)`: tally or complete.
    pub(crate) fn record_service_stopped(&self) -> ClusterState {
        match self.progress.record_child_outcome() {
            Advance::Pending { .. } => ClusterState::Stopping,
            Advance::Complete => ClusterState::Inactive,
        }
    }

    fn start_service(&self, index: usize) {
        if let Some(service) = self.services.get(index) {
            self.dispatcher.post(Event::Service(ServiceEvent::new(
                ServiceEventKind::Start,
                Arc::clone(service),
            )));
        }
    }
}
