//! # ObserverSet: non-blocking fan-out over multiple observers.
//!
//! Distributes each [`Notice`] to every observer **without awaiting** its
//! processing.
//!
//! ## Guarantees
//! - `emit(&Notice)` returns immediately.
//! - Per-observer FIFO (queue order).
//! - Panics inside observers are caught and logged (isolation).
//!
//! ## Non-guarantees
//! - No global ordering across different observers.
//! - No retries on queue overflow: the notice is dropped for that observer.

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use super::observer::{Notice, Observe};

/// Per-observer channel with metadata.
struct ObserverChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Notice>>,
}

/// Composite fan-out with per-observer bounded queues and worker tasks.
pub struct ObserverSet {
    channels: Mutex<Vec<ObserverChannel>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ObserverSet {
    /// Creates a new set and spawns one worker per observer.
    ///
    /// `fallback_capacity` applies when an observer declares a zero queue
    /// capacity.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observe>>, fallback_capacity: usize) -> Self {
        let mut channels = Vec::with_capacity(observers.len());
        let mut workers = Vec::with_capacity(observers.len());

        for observer in observers {
            let cap = match observer.queue_capacity() {
                0 => fallback_capacity.max(1),
                n => n,
            };
            let name = observer.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Notice>>(cap);
            let target = Arc::clone(&observer);

            let handle = tokio::spawn(async move {
                while let Some(notice) = rx.recv().await {
                    let fut = target.on_notice(notice.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await
                    {
                        eprintln!(
                            "[clustervisor] observer '{}' panicked: {:?}",
                            target.name(),
                            panic_err
                        );
                    }
                }
            });

            channels.push(ObserverChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels: Mutex::new(channels),
            workers: Mutex::new(workers),
        }
    }

    /// Fan-out one notice to all observers (non-blocking).
    ///
    /// If an observer's queue is full or closed, the notice is dropped for
    /// it and a warning is logged with the observer's name.
    pub fn emit(&self, notice: Notice) {
        let shared = Arc::new(notice);
        let channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for channel in channels.iter() {
            match channel.sender.try_send(Arc::clone(&shared)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[clustervisor] observer '{}' dropped notice: queue full",
                        channel.name
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    eprintln!(
                        "[clustervisor] observer '{}' dropped notice: worker closed",
                        channel.name
                    );
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(&self) {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        let workers = std::mem::take(
            &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for handle in workers {
            let _ = handle.await;
        }
    }

    /// True if there are no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
