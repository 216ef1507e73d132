//! # Process-wide asynchronous event dispatcher.
//!
//! One logical queue, one consumer: producers (client control calls,
//! heartbeat ingestion, transition hooks) call [`Dispatcher::post`], which
//! enqueues and returns immediately; a single worker task drains the queue
//! and routes each event to its target entity's `handle`. A single
//! consumer gives global FIFO delivery, which subsumes the required
//! FIFO-per-target ordering.
//!
//! ## Isolation
//! A rejected event ([`TransitionError`]) is logged, surfaced to observers
//! as a `Rejected` notice, and dropped; the loop keeps going. Errors never
//! cross entity boundaries — only modeled success/failure events do.
//!
//! ## Quiescence
//! [`Dispatcher::settle`] awaits the point where a full flush round
//! delivers nothing, which covers multi-hop propagation chains (a hook
//! posting events during delivery re-arms the next round).

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::TransitionError;
use crate::observers::{Notice, NoticeOutcome, ObserverSet};

use super::event::Event;

enum Envelope {
    /// Deliver one event to its target.
    Deliver(Box<Event>),
    /// Flush sentinel: acknowledged once everything before it is done.
    Flush(oneshot::Sender<()>),
}

/// Asynchronous FIFO event bus owned by the controller.
///
/// Explicitly constructed and injected — there is no global dispatcher.
/// Cheap to share: entities hold an `Arc<Dispatcher>` and only ever call
/// [`post`](Dispatcher::post).
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Envelope>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Envelope>>>,
    observers: Arc<ObserverSet>,
    delivered: AtomicU64,
}

impl Dispatcher {
    /// Creates a dispatcher (must call [`run`](Dispatcher::run) to start).
    pub fn new(observers: Arc<ObserverSet>) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            tx,
            rx: Mutex::new(Some(rx)),
            observers,
            delivered: AtomicU64::new(0),
        })
    }

    /// Enqueues an event and returns immediately (fire-and-forget).
    ///
    /// Events posted before the loop starts are delivered once it does.
    /// After shutdown the event is dropped with a warning.
    pub fn post(&self, event: Event) {
        if self
            .tx
            .send(Envelope::Deliver(Box::new(event)))
            .is_err()
        {
            eprintln!("[clustervisor] dispatcher closed; event dropped");
        }
    }

    /// Starts the dispatch loop (spawns in background).
    pub fn run(self: &Arc<Self>, token: CancellationToken) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = this.run_inner(token).await {
                eprintln!("[clustervisor] dispatcher error: {e:?}");
            }
        });
    }

    /// Waits until the queue is quiescent: a flush round in which nothing
    /// was delivered. Returns immediately if the loop has stopped.
    pub async fn settle(&self) {
        loop {
            let before = self.delivered.load(AtomicOrdering::SeqCst);
            let (ack_tx, ack_rx) = oneshot::channel();
            if self.tx.send(Envelope::Flush(ack_tx)).is_err() {
                return;
            }
            if ack_rx.await.is_err() {
                return;
            }
            if self.delivered.load(AtomicOrdering::SeqCst) == before {
                return;
            }
        }
    }

    /// Number of events delivered so far (applied or rejected).
    pub fn delivered(&self) -> u64 {
        self.delivered.load(AtomicOrdering::SeqCst)
    }

    async fn run_inner(&self, token: CancellationToken) -> anyhow::Result<()> {
        let mut rx = self
            .rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| anyhow::anyhow!("dispatcher already running"))?;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,

                envelope = rx.recv() => match envelope {
                    None => break,
                    Some(Envelope::Flush(ack)) => {
                        let _ = ack.send(());
                    }
                    Some(Envelope::Deliver(event)) => {
                        self.deliver(&event);
                        self.delivered.fetch_add(1, AtomicOrdering::SeqCst);
                    }
                },
            }
        }

        Ok(())
    }

    /// Routes one event to its target entity and reports the outcome to
    /// observers. Double dispatch is a pattern match — no casts.
    fn deliver(&self, event: &Event) {
        let entity = event.target_path();
        let label = event.kind_label();

        let result: Result<(&'static str, &'static str), TransitionError> = match event {
            Event::Cluster(e) => e
                .target
                .handle(e)
                .map(|a| (a.from.as_str(), a.to.as_str())),
            Event::Service(e) => e
                .target
                .handle(e)
                .map(|a| (a.from.as_str(), a.to.as_str())),
            Event::Role(e) => e
                .target
                .handle(e)
                .map(|a| (a.from.as_str(), a.to.as_str())),
        };

        let outcome = match result {
            Ok((from, to)) => NoticeOutcome::Transition { from, to },
            Err(err) => {
                eprintln!(
                    "[clustervisor] event {label} rejected for '{entity}': {err}"
                );
                NoticeOutcome::Rejected {
                    reason: err.to_string().into(),
                }
            }
        };

        self.observers.emit(Notice {
            seq: event.seq(),
            at: event.at(),
            entity: entity.into(),
            event: label,
            outcome,
        });
    }
}
