//! # The three transition tables.
//!
//! Built once by the [`Controller`](crate::Controller) at startup,
//! validated by [`TableBuilder::install`], and passed into every entity the
//! controller assembles — there is no lazily-built or class-level shared
//! mutable table.
//!
//! Late/duplicate child reports are modeled as explicit self-loop rules
//! rather than omissions: a re-sent heartbeat after fan-in completes is
//! legal agent behavior and must not surface as a protocol error. Every
//! `(state, event)` pair absent from these tables *is* a protocol error
//! and is rejected loudly at apply time.

use std::sync::Arc;

use crate::actions::RoleCommand;
use crate::error::TableError;
use crate::events::{
    ClusterEvent, ClusterEventKind, RoleEvent, RoleEventKind, ServiceEvent, ServiceEventKind,
};
use crate::machine::{TableBuilder, TransitionTable};

use super::state::{ClusterState, RoleState, ServiceState};
use super::{Cluster, Role, Service};

pub(crate) type ClusterTable =
    TransitionTable<ClusterState, ClusterEventKind, Cluster, ClusterEvent>;
pub(crate) type ServiceTable =
    TransitionTable<ServiceState, ServiceEventKind, Service, ServiceEvent>;
pub(crate) type RoleTable = TransitionTable<RoleState, RoleEventKind, Role, RoleEvent>;

/// The shared, immutable tables for all three entity kinds.
pub(crate) struct Tables {
    pub cluster: Arc<ClusterTable>,
    pub service: Arc<ServiceTable>,
    pub role: Arc<RoleTable>,
}

impl Tables {
    /// Builds and validates all three tables.
    pub(crate) fn install() -> Result<Self, TableError> {
        Ok(Self {
            cluster: cluster_table()?,
            service: service_table()?,
            role: role_table()?,
        })
    }
}

fn cluster_table() -> Result<Arc<ClusterTable>, TableError> {
    use ClusterEventKind as Ev;
    use ClusterState as St;

    TableBuilder::<St, Ev, Cluster, ClusterEvent>::new(St::Inactive)
        // Startup: sequential fan-out, count-driven fan-in.
        .on_choice(St::Inactive, Ev::Start, vec![St::Starting, St::Active], |c, _| {
            c.launch_services()
        })
        .on_choice(
            St::Starting,
            Ev::ServiceStartSuccess,
            vec![St::Starting, St::Active],
            |c, _| c.record_service_started(),
        )
        .on(St::Starting, Ev::ServiceStartFailure, St::Fail)
        // Shutdown: aggregate fan-out, count-driven fan-in.
        .on_choice(St::Active, Ev::Stop, vec![St::Stopping, St::Inactive], |c, _| {
            c.halt_services()
        })
        .on_choice(St::Fail, Ev::Stop, vec![St::Stopping, St::Inactive], |c, _| {
            c.halt_services()
        })
        .on_choice(
            St::Stopping,
            Ev::ServiceStopSuccess,
            vec![St::Stopping, St::Inactive],
            |c, _| c.record_service_stopped(),
        )
        .on(St::Stopping, Ev::ServiceStopFailure, St::UncleanStop)
        // Node lifecycle.
        .on(St::Inactive, Ev::ReleaseNodes, St::Attic)
        .on(St::Attic, Ev::AddNodes, St::Inactive)
        // Late/duplicate reports, tolerated as no-ops.
        .on(St::Active, Ev::ServiceStartSuccess, St::Active)
        .on(St::Fail, Ev::ServiceStartSuccess, St::Fail)
        .on(St::Fail, Ev::ServiceStartFailure, St::Fail)
        .on(St::UncleanStop, Ev::ServiceStopSuccess, St::UncleanStop)
        .on(St::UncleanStop, Ev::ServiceStopFailure, St::UncleanStop)
        .install()
}

fn service_table() -> Result<Arc<ServiceTable>, TableError> {
    use ServiceEventKind as Ev;
    use ServiceState as St;

    TableBuilder::<St, Ev, Service, ServiceEvent>::new(St::Inactive)
        // Startup.
        .on_choice(St::Inactive, Ev::Start, vec![St::Starting, St::Active], |s, _| {
            s.launch_roles()
        })
        .on_choice(
            St::Starting,
            Ev::RoleStartSuccess,
            vec![St::Starting, St::Active],
            |s, _| s.record_role_started(),
        )
        .on_with(St::Starting, Ev::RoleStartFailure, St::Fail, |s, _| {
            s.report_start_failed()
        })
        // Shutdown.
        .on_choice(St::Active, Ev::Stop, vec![St::Stopping, St::Inactive], |s, _| {
            s.halt_roles()
        })
        .on_choice(St::Fail, Ev::Stop, vec![St::Stopping, St::Inactive], |s, _| {
            s.halt_roles()
        })
        .on_choice(
            St::Stopping,
            Ev::RoleStopSuccess,
            vec![St::Stopping, St::Inactive],
            |s, _| s.record_role_stopped(),
        )
        .on_with(St::Stopping, Ev::RoleStopFailure, St::UncleanStop, |s, _| {
            s.report_stop_failed()
        })
        // Late/duplicate reports, tolerated as no-ops.
        .on(St::Active, Ev::RoleStartSuccess, St::Active)
        .on(St::Fail, Ev::RoleStartSuccess, St::Fail)
        .on(St::Fail, Ev::RoleStartFailure, St::Fail)
        .on(St::UncleanStop, Ev::RoleStopSuccess, St::UncleanStop)
        .on(St::UncleanStop, Ev::RoleStopFailure, St::UncleanStop)
        .install()
}

fn role_table() -> Result<Arc<RoleTable>, TableError> {
    use RoleEventKind as Ev;
    use RoleState as St;

    TableBuilder::<St, Ev, Role, RoleEvent>::new(St::Inactive)
        // Startup: the start action goes to the agent plane; the outcome
        // comes back later as a heartbeat-driven event.
        .on_with(St::Inactive, Ev::Start, St::Starting, |r, _| {
            r.emit_action(RoleCommand::Start)
        })
        .on_with(St::Starting, Ev::StartSuccess, St::Active, |r, _| {
            r.report(ServiceEventKind::RoleStartSuccess)
        })
        .on_with(St::Starting, Ev::StartFailure, St::Fail, |r, _| {
            r.report(ServiceEventKind::RoleStartFailure)
        })
        // Shutdown.
        .on_with(St::Active, Ev::Stop, St::Stopping, |r, _| {
            r.emit_action(RoleCommand::Stop)
        })
        .on_with(St::Fail, Ev::Stop, St::Stopping, |r, _| {
            r.emit_action(RoleCommand::Stop)
        })
        .on_with(St::Stopping, Ev::StopSuccess, St::Inactive, |r, _| {
            r.report(ServiceEventKind::RoleStopSuccess)
        })
        .on_with(St::Stopping, Ev::StopFailure, St::UncleanStop, |r, _| {
            r.report(ServiceEventKind::RoleStopFailure)
        })
        // Re-sent heartbeats, tolerated without re-reporting upward.
        .on(St::Active, Ev::StartSuccess, St::Active)
        .on(St::Inactive, Ev::StopSuccess, St::Inactive)
        .terminal(St::UncleanStop)
        .install()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_install() {
        let tables = Tables::install().unwrap();
        assert_eq!(tables.cluster.initial(), ClusterState::Inactive);
        assert_eq!(tables.service.initial(), ServiceState::Inactive);
        assert_eq!(tables.role.initial(), RoleState::Inactive);
    }
}
