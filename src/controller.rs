//! # Controller: the root context that owns everything shared.
//!
//! The controller replaces any notion of a global singleton: it builds and
//! validates the three transition tables, constructs the observer fan-out
//! and the dispatcher, and hands each assembled cluster references to all
//! of them. Tests get isolated buses by simply constructing more
//! controllers.
//!
//! ## Lifecycle
//! ```text
//! Controller::new(cfg, sink, observers)   — tables validated here
//!     └─► start()                          — spawns the dispatch loop
//!     └─► install_cluster(spec)            — assembles an entity tree
//!     └─► ... events flow ...
//!     └─► shutdown().await                 — settle within grace, cancel,
//!                                            close observers
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::actions::ActionSink;
use crate::config::Config;
use crate::error::{RuntimeError, TableError};
use crate::events::Dispatcher;
use crate::model::{Cluster, ClusterSpec, Tables};
use crate::observers::{Observe, ObserverSet};

/// Root context for one controller instance.
pub struct Controller {
    cfg: Config,
    tables: Tables,
    dispatcher: Arc<Dispatcher>,
    observers: Arc<ObserverSet>,
    sink: Arc<dyn ActionSink>,
    token: CancellationToken,
}

impl Controller {
    /// Builds a controller: validates the transition tables and wires the
    /// observer set and dispatcher.
    ///
    /// Table defects surface here, before any entity exists.
    pub fn new(
        cfg: Config,
        sink: Arc<dyn ActionSink>,
        observers: Vec<Arc<dyn Observe>>,
    ) -> Result<Self, TableError> {
        let tables = Tables::install()?;
        let observers = Arc::new(ObserverSet::new(observers, cfg.observer_queue));
        let dispatcher = Dispatcher::new(Arc::clone(&observers));
        Ok(Self {
            cfg,
            tables,
            dispatcher,
            observers,
            sink,
            token: CancellationToken::new(),
        })
    }

    /// Starts the dispatch loop (spawns in background).
    pub fn start(&self) {
        self.dispatcher.run(self.token.child_token());
    }

    /// Assembles a cluster from its topology spec, bound to this
    /// controller's tables, dispatcher, and action sink.
    pub fn install_cluster(&self, spec: &ClusterSpec) -> Arc<Cluster> {
        Cluster::assemble(
            spec,
            &self.tables,
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.sink),
        )
    }

    /// Handle to the event bus, for heartbeat producers and tests.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Graceful shutdown.
    ///
    /// Waits up to [`Config::grace`] for the queue to settle, then cancels
    /// the dispatch loop and closes the observer queues. A queue that does
    /// not settle in time is cancelled anyway and
    /// [`RuntimeError::GraceExceeded`] is returned.
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let settled = if grace.is_zero() {
            true
        } else {
            tokio::time::timeout(grace, self.dispatcher.settle())
                .await
                .is_ok()
        };

        self.token.cancel();
        self.observers.shutdown().await;

        if settled {
            Ok(())
        } else {
            Err(RuntimeError::GraceExceeded { grace })
        }
    }
}
