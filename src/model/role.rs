//! # Role: the leaf of the entity hierarchy.
//!
//! A role is a deployable unit bound to a set of hosts. Its hooks do two
//! things only: emit a [`RoleAction`] toward the agent plane on
//! `Start`/`Stop`, and report agent-heartbeat outcomes upward to the owning
//! service — always by posting events, never by touching the parent.

use std::sync::{Arc, Weak};

use crate::actions::{ActionSink, RoleAction, RoleCommand};
use crate::error::TransitionError;
use crate::events::{Dispatcher, Event, RoleEvent, RoleEventKind, ServiceEvent, ServiceEventKind};
use crate::machine::{Applied, StateMachine};

use super::spec::RoleSpec;
use super::state::RoleState;
use super::tables::RoleTable;
use super::Service;

/// Leaf entity: one named role bound to a set of hosts.
pub struct Role {
    name: Arc<str>,
    hosts: Vec<Arc<str>>,
    service: Weak<Service>,
    machine: StateMachine<RoleState, RoleEventKind, Role, RoleEvent>,
    dispatcher: Arc<Dispatcher>,
    sink: Arc<dyn ActionSink>,
}

impl Role {
    pub(crate) fn assemble(
        spec: &RoleSpec,
        service: Weak<Service>,
        table: Arc<RoleTable>,
        dispatcher: Arc<Dispatcher>,
        sink: Arc<dyn ActionSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: spec.name.as_str().into(),
            hosts: spec.hosts.iter().map(|h| Arc::from(h.as_str())).collect(),
            service,
            machine: StateMachine::new(table),
            dispatcher,
            sink,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hosts this role is bound to (empty = not host-bound).
    pub fn hosts(&self) -> &[Arc<str>] {
        &self.hosts
    }

    /// Snapshot of the current lifecycle state.
    pub fn state(&self) -> RoleState {
        self.machine.current()
    }

    /// `cluster/service/role` path for logs and notices.
    pub fn path(&self) -> String {
        match self.service.upgrade() {
            Some(service) => format!("{}/{}", service.path(), self.name),
            None => self.name.to_string(),
        }
    }

    /// Single entry point: applies one event to this role's machine.
    pub(crate) fn handle(&self, event: &RoleEvent) -> Result<Applied<RoleState>, TransitionError> {
        self.machine.apply(self, event.kind, event)
    }

    /// Hook: hands a deployment order to the action sink.
    ///
    /// Skipped when the owning service is already gone (teardown).
    pub(crate) fn emit_action(&self, command: RoleCommand) {
        let Some(service) = self.service.upgrade() else {
            return;
        };
        let Some(cluster) = service.cluster_ref().upgrade() else {
            return;
        };
        self.sink.deploy(RoleAction {
            cluster: cluster.name_arc(),
            service: service.name_arc(),
            role: Arc::clone(&self.name),
            hosts: self.hosts.clone(),
            command,
        });
    }

    /// Hook: reports an outcome upward to the owning service.
    pub(crate) fn report(&self, kind: ServiceEventKind) {
        if let Some(service) = self.service.upgrade() {
            self.dispatcher.post(Event::Service(
                ServiceEvent::new(kind, service).with_child(Arc::clone(&self.name)),
            ));
        }
    }
}
