//! End-to-end lifecycle scenarios: activation fan-out/fan-in, fail-fast,
//! shutdown, node release, and heartbeat ingestion — all driven through
//! the public surface (controller, control calls, posted role events).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clustervisor::{
    ActionSink, Cluster, ClusterSpec, ClusterState, Config, Controller, Event, HeartbeatIngest,
    HeartbeatReport, Notice, NoticeOutcome, Observe, Role, RoleAction, RoleCommand, RoleEvent,
    RoleEventKind, RoleObservation, RoleOutcome, RoleSpec, RoleState, ServiceSpec, ServiceState,
};

/// Sink that records every deployment order.
#[derive(Default)]
struct RecordingSink {
    actions: Mutex<Vec<RoleAction>>,
}

impl RecordingSink {
    fn snapshot(&self) -> Vec<(String, String, RoleCommand)> {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .map(|a| (a.service.to_string(), a.role.to_string(), a.command))
            .collect()
    }
}

impl ActionSink for RecordingSink {
    fn deploy(&self, action: RoleAction) {
        self.actions.lock().unwrap().push(action);
    }
}

fn new_controller() -> (Controller, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let controller = Controller::new(Config::default(), sink.clone(), Vec::new())
        .expect("tables must install");
    controller.start();
    (controller, sink)
}

fn two_service_spec() -> ClusterSpec {
    ClusterSpec::new("acme")
        .service(
            ServiceSpec::new("svcA")
                .role(RoleSpec::new("r1"))
                .role(RoleSpec::new("r2")),
        )
        .service(ServiceSpec::new("svcB").role(RoleSpec::new("r1")))
}

fn role(cluster: &Arc<Cluster>, service: &str, role: &str) -> Arc<Role> {
    cluster
        .find_service(service)
        .expect("service exists")
        .find_role(role)
        .expect("role exists")
}

fn report(controller: &Controller, target: Arc<Role>, kind: RoleEventKind) {
    controller
        .dispatcher()
        .post(Event::Role(RoleEvent::new(kind, target)));
}

#[tokio::test]
async fn test_activation_starts_first_role_only() {
    let (controller, sink) = new_controller();
    let cluster = controller.install_cluster(&two_service_spec());

    cluster.activate();
    controller.dispatcher().settle().await;

    assert_eq!(cluster.state(), ClusterState::Starting);
    assert_eq!(
        cluster.find_service("svcA").unwrap().state(),
        ServiceState::Starting
    );
    assert_eq!(role(&cluster, "svcA", "r1").state(), RoleState::Starting);
    // Nothing touched beyond the first role of the first service.
    assert_eq!(role(&cluster, "svcA", "r2").state(), RoleState::Inactive);
    assert_eq!(
        cluster.find_service("svcB").unwrap().state(),
        ServiceState::Inactive
    );
    assert_eq!(
        sink.snapshot(),
        vec![("svcA".into(), "r1".into(), RoleCommand::Start)]
    );
}

#[tokio::test]
async fn test_full_activation_chain() {
    let (controller, sink) = new_controller();
    let cluster = controller.install_cluster(&two_service_spec());

    cluster.activate();
    controller.dispatcher().settle().await;

    // svcA.r1 up: service stays Starting and r2 is asked to start.
    report(&controller, role(&cluster, "svcA", "r1"), RoleEventKind::StartSuccess);
    controller.dispatcher().settle().await;
    assert_eq!(
        cluster.find_service("svcA").unwrap().state(),
        ServiceState::Starting
    );
    assert_eq!(role(&cluster, "svcA", "r2").state(), RoleState::Starting);

    // svcA.r2 up: svcA goes Active, the cluster moves on to svcB.
    report(&controller, role(&cluster, "svcA", "r2"), RoleEventKind::StartSuccess);
    controller.dispatcher().settle().await;
    assert_eq!(
        cluster.find_service("svcA").unwrap().state(),
        ServiceState::Active
    );
    assert_eq!(cluster.state(), ClusterState::Starting);
    assert_eq!(role(&cluster, "svcB", "r1").state(), RoleState::Starting);

    // svcB.r1 up: everything Active.
    report(&controller, role(&cluster, "svcB", "r1"), RoleEventKind::StartSuccess);
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Active);

    let states = cluster.service_states();
    assert_eq!(states["svcA"], ServiceState::Active);
    assert_eq!(states["svcB"], ServiceState::Active);

    assert_eq!(
        sink.snapshot(),
        vec![
            ("svcA".into(), "r1".into(), RoleCommand::Start),
            ("svcA".into(), "r2".into(), RoleCommand::Start),
            ("svcB".into(), "r1".into(), RoleCommand::Start),
        ]
    );
}

#[tokio::test]
async fn test_fail_fast_without_rollback() {
    let (controller, _sink) = new_controller();
    let cluster = controller.install_cluster(&two_service_spec());

    cluster.activate();
    controller.dispatcher().settle().await;

    report(&controller, role(&cluster, "svcA", "r1"), RoleEventKind::StartSuccess);
    controller.dispatcher().settle().await;

    report(&controller, role(&cluster, "svcA", "r2"), RoleEventKind::StartFailure);
    controller.dispatcher().settle().await;

    assert_eq!(role(&cluster, "svcA", "r2").state(), RoleState::Fail);
    assert_eq!(
        cluster.find_service("svcA").unwrap().state(),
        ServiceState::Fail
    );
    assert_eq!(cluster.state(), ClusterState::Fail);
    // The sibling that already started is left alone.
    assert_eq!(role(&cluster, "svcA", "r1").state(), RoleState::Active);
    // svcB was never reached.
    assert_eq!(
        cluster.find_service("svcB").unwrap().state(),
        ServiceState::Inactive
    );
}

#[tokio::test]
async fn test_duplicate_success_is_a_noop() {
    let (controller, sink) = new_controller();
    let cluster = controller.install_cluster(
        &ClusterSpec::new("acme")
            .service(ServiceSpec::new("svcA").role(RoleSpec::new("r1"))),
    );

    cluster.activate();
    controller.dispatcher().settle().await;
    report(&controller, role(&cluster, "svcA", "r1"), RoleEventKind::StartSuccess);
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Active);
    let actions_before = sink.snapshot().len();

    // Agent re-sends the same report: tolerated, nothing re-fires.
    report(&controller, role(&cluster, "svcA", "r1"), RoleEventKind::StartSuccess);
    controller.dispatcher().settle().await;

    assert_eq!(cluster.state(), ClusterState::Active);
    assert_eq!(
        cluster.find_service("svcA").unwrap().state(),
        ServiceState::Active
    );
    assert_eq!(sink.snapshot().len(), actions_before);
}

#[tokio::test]
async fn test_stop_cycle_returns_to_inactive() {
    let (controller, sink) = new_controller();
    let cluster = controller.install_cluster(&two_service_spec());

    cluster.activate();
    controller.dispatcher().settle().await;
    for (svc, r) in [("svcA", "r1"), ("svcA", "r2"), ("svcB", "r1")] {
        report(&controller, role(&cluster, svc, r), RoleEventKind::StartSuccess);
        controller.dispatcher().settle().await;
    }
    assert_eq!(cluster.state(), ClusterState::Active);

    cluster.deactivate();
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Stopping);
    assert_eq!(role(&cluster, "svcA", "r1").state(), RoleState::Stopping);

    for (svc, r) in [("svcA", "r1"), ("svcA", "r2"), ("svcB", "r1")] {
        report(&controller, role(&cluster, svc, r), RoleEventKind::StopSuccess);
    }
    controller.dispatcher().settle().await;

    assert_eq!(cluster.state(), ClusterState::Inactive);
    assert_eq!(
        cluster.find_service("svcA").unwrap().state(),
        ServiceState::Inactive
    );
    assert_eq!(role(&cluster, "svcB", "r1").state(), RoleState::Inactive);

    let stops: Vec<_> = sink
        .snapshot()
        .into_iter()
        .filter(|(_, _, cmd)| *cmd == RoleCommand::Stop)
        .collect();
    assert_eq!(stops.len(), 3);
}

#[tokio::test]
async fn test_stop_failure_is_unclean() {
    let (controller, _sink) = new_controller();
    let cluster = controller.install_cluster(
        &ClusterSpec::new("acme")
            .service(ServiceSpec::new("svcA").role(RoleSpec::new("r1"))),
    );

    cluster.activate();
    controller.dispatcher().settle().await;
    report(&controller, role(&cluster, "svcA", "r1"), RoleEventKind::StartSuccess);
    controller.dispatcher().settle().await;

    cluster.deactivate();
    controller.dispatcher().settle().await;
    report(&controller, role(&cluster, "svcA", "r1"), RoleEventKind::StopFailure);
    controller.dispatcher().settle().await;

    assert_eq!(role(&cluster, "svcA", "r1").state(), RoleState::UncleanStop);
    assert_eq!(
        cluster.find_service("svcA").unwrap().state(),
        ServiceState::UncleanStop
    );
    assert_eq!(cluster.state(), ClusterState::UncleanStop);
}

#[tokio::test]
async fn test_stop_after_failed_start() {
    let (controller, _sink) = new_controller();
    let cluster = controller.install_cluster(
        &ClusterSpec::new("acme").service(
            ServiceSpec::new("svcA")
                .role(RoleSpec::new("r1"))
                .role(RoleSpec::new("r2")),
        ),
    );

    cluster.activate();
    controller.dispatcher().settle().await;
    report(&controller, role(&cluster, "svcA", "r1"), RoleEventKind::StartSuccess);
    controller.dispatcher().settle().await;
    report(&controller, role(&cluster, "svcA", "r2"), RoleEventKind::StartFailure);
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Fail);

    // Stop out of Fail: both the active and the failed role get stopped.
    cluster.deactivate();
    controller.dispatcher().settle().await;
    assert_eq!(role(&cluster, "svcA", "r1").state(), RoleState::Stopping);
    assert_eq!(role(&cluster, "svcA", "r2").state(), RoleState::Stopping);

    report(&controller, role(&cluster, "svcA", "r1"), RoleEventKind::StopSuccess);
    report(&controller, role(&cluster, "svcA", "r2"), RoleEventKind::StopSuccess);
    controller.dispatcher().settle().await;

    assert_eq!(cluster.state(), ClusterState::Inactive);
    assert_eq!(
        cluster.find_service("svcA").unwrap().state(),
        ServiceState::Inactive
    );
}

#[tokio::test]
async fn test_attic_round_trip() {
    let (controller, _sink) = new_controller();
    let cluster = controller.install_cluster(&two_service_spec());

    cluster.terminate();
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Attic);

    cluster.restore();
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Inactive);
}

#[tokio::test]
async fn test_undefined_input_is_rejected_and_isolated() {
    let (controller, _sink) = new_controller();
    let cluster = controller.install_cluster(&two_service_spec());

    // Stop before any start is undefined input: rejected, state unchanged.
    cluster.deactivate();
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Inactive);

    // The dispatch loop keeps working afterwards.
    cluster.activate();
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Starting);
}

#[tokio::test]
async fn test_cluster_without_services_is_trivially_active() {
    let (controller, sink) = new_controller();
    let cluster = controller.install_cluster(&ClusterSpec::new("empty"));

    cluster.activate();
    controller.dispatcher().settle().await;

    assert_eq!(cluster.state(), ClusterState::Active);
    assert!(sink.snapshot().is_empty());
}

#[tokio::test]
async fn test_state_read_is_idempotent() {
    let (controller, _sink) = new_controller();
    let cluster = controller.install_cluster(&two_service_spec());

    cluster.activate();
    controller.dispatcher().settle().await;

    assert_eq!(cluster.state(), cluster.state());
    assert_eq!(cluster.service_states(), cluster.service_states());
}

#[tokio::test]
async fn test_heartbeat_ingestion_checks_topology_and_hosts() {
    let (controller, _sink) = new_controller();
    let cluster = controller.install_cluster(
        &ClusterSpec::new("acme").service(
            ServiceSpec::new("svcA").role(RoleSpec::new("r1").host("node-1")),
        ),
    );

    cluster.activate();
    controller.dispatcher().settle().await;

    let ingest = HeartbeatIngest::new(cluster.clone());

    // Foreign host and unknown role are skipped; nothing moves.
    let summary = ingest.ingest(&HeartbeatReport {
        hostname: "node-9".into(),
        observations: vec![
            RoleObservation {
                service: "svcA".into(),
                role: "r1".into(),
                outcome: RoleOutcome::StartSucceeded,
            },
            RoleObservation {
                service: "svcA".into(),
                role: "ghost".into(),
                outcome: RoleOutcome::StartSucceeded,
            },
            RoleObservation {
                service: "nosvc".into(),
                role: "r1".into(),
                outcome: RoleOutcome::StartSucceeded,
            },
        ],
    });
    assert_eq!(summary.posted, 0);
    assert_eq!(summary.skipped, 3);
    controller.dispatcher().settle().await;
    assert_eq!(role(&cluster, "svcA", "r1").state(), RoleState::Starting);

    // The bound host's report goes through.
    let summary = ingest.ingest(&HeartbeatReport {
        hostname: "node-1".into(),
        observations: vec![RoleObservation {
            service: "svcA".into(),
            role: "r1".into(),
            outcome: RoleOutcome::StartSucceeded,
        }],
    });
    assert_eq!(summary.posted, 1);
    controller.dispatcher().settle().await;
    assert_eq!(cluster.state(), ClusterState::Active);
}

/// Observer that collects every notice it sees.
#[derive(Default)]
struct CollectingObserver {
    notices: Mutex<Vec<Notice>>,
}

#[async_trait]
impl Observe for CollectingObserver {
    async fn on_notice(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[tokio::test]
async fn test_observers_see_transitions_and_rejections() {
    let observer = Arc::new(CollectingObserver::default());
    let sink = Arc::new(RecordingSink::default());
    let controller = Controller::new(
        Config::default(),
        sink,
        vec![observer.clone() as Arc<dyn Observe>],
    )
    .unwrap();
    controller.start();

    let cluster = controller.install_cluster(
        &ClusterSpec::new("acme")
            .service(ServiceSpec::new("svcA").role(RoleSpec::new("r1"))),
    );

    cluster.deactivate(); // rejected: Stop while Inactive
    cluster.activate();
    controller.dispatcher().settle().await;

    // Shutdown drains the observer queues before returning.
    controller.shutdown().await.unwrap();

    let notices = observer.notices.lock().unwrap();
    assert!(notices.iter().any(|n| matches!(
        &n.outcome,
        NoticeOutcome::Rejected { .. }
    )));
    assert!(notices.iter().any(|n| n.entity.as_ref() == "acme"
        && matches!(
            n.outcome,
            NoticeOutcome::Transition { from: "INACTIVE", to: "STARTING" }
        )));
    assert!(notices
        .iter()
        .any(|n| n.entity.as_ref() == "acme/svcA/r1"));
}
