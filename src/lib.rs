//! # clustervisor
//!
//! **Clustervisor** is the control-plane core of a cluster-management
//! controller: a generic, table-driven state-machine engine plus a typed,
//! asynchronous event dispatcher that together drive a three-level
//! cluster / service / role startup and shutdown protocol.
//!
//! It decides *what transition happens next* given an event. Everything
//! operational — executing commands on agents, serializing heartbeats,
//! persisting state — belongs to collaborators outside this crate.
//!
//! ## Architecture
//! ```text
//!  clients                       agents (external)
//!  ───────                      ───────────────────
//!  cluster.activate()            heartbeat transport
//!  cluster.deactivate()                │ HeartbeatReport
//!        │ ClusterEvent                ▼
//!        │                      HeartbeatIngest ──► RoleEvent
//!        ▼                                              │
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Dispatcher (one FIFO queue, one consumer)                    │
//! │    post() never blocks; delivery order is global FIFO         │
//! └───────┬───────────────────────────────────────────┬───────────┘
//!         │ Event::{Cluster,Service,Role}              │ Notice
//!         ▼                                            ▼
//!   entity.handle(event)                         ObserverSet
//!         │                                  (per-observer queues)
//!         ▼
//!   StateMachine::apply ──► rule hook ──► posts further events
//!         │                         └──► RoleAction ──► ActionSink
//!         ▼
//!   current state updated (or InvalidTransition / IllegalResult)
//! ```
//!
//! ## Startup protocol
//! Startup is strictly sequential: on `Start`, a parent activates only its
//! *first* child and waits. Each child success advances a lock-guarded
//! counter and either starts the next child in list order or, once every
//! enabled child has reported, moves the parent to `ACTIVE` — so the chain
//! `cluster → service → role` fans out one edge at a time and fans back in
//! by count. Any child start failure fails the parent immediately; nothing
//! is rolled back. Shutdown stops children in aggregate and tallies their
//! reports the same way.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use clustervisor::{
//!     ClusterSpec, Config, Controller, DiscardSink, RoleSpec, ServiceSpec,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = Controller::new(
//!         Config::default(),
//!         Arc::new(DiscardSink),
//!         Vec::new(),
//!     )?;
//!     controller.start();
//!
//!     let cluster = controller.install_cluster(
//!         &ClusterSpec::new("acme").service(
//!             ServiceSpec::new("hdfs")
//!                 .role(RoleSpec::new("namenode").host("nn-1")),
//!         ),
//!     );
//!
//!     cluster.activate();
//!     controller.dispatcher().settle().await;
//!     println!("cluster is {}", cluster.state());
//!
//!     controller.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod actions;
mod config;
mod controller;
mod error;
mod events;
mod ingest;
mod machine;
mod model;
mod observers;

// ---- Public re-exports ----

pub use actions::{ActionSink, DiscardSink, RoleAction, RoleCommand};
pub use config::Config;
pub use controller::Controller;
pub use error::{RuntimeError, TableError, TransitionError};
pub use events::{
    ClusterEvent, ClusterEventKind, Dispatcher, Event, RoleEvent, RoleEventKind, ServiceEvent,
    ServiceEventKind,
};
pub use ingest::{HeartbeatIngest, HeartbeatReport, IngestSummary, RoleObservation, RoleOutcome};
pub use machine::{Applied, Label, StateMachine, TableBuilder, TransitionTable};
pub use model::{
    Cluster, ClusterSpec, ClusterState, Role, RoleSpec, RoleState, Service, ServiceSpec,
    ServiceState,
};
pub use observers::{Notice, NoticeOutcome, Observe, ObserverSet};

// Optional: expose a simple built-in stdout observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
