//! # Observer contract and the notice record.
//!
//! [`Observe`] is the extension point for plugging audit/logging/metrics
//! sinks into the dispatcher. Each observer is driven by a dedicated worker
//! loop fed from a bounded queue owned by the
//! [`ObserverSet`](crate::observers::ObserverSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) — they never block the
//!   dispatch loop nor other observers.
//! - Each observer declares its preferred queue capacity via
//!   [`Observe::queue_capacity`]. On overflow, notices for that observer
//!   are dropped (warn).

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

/// What happened when the dispatcher delivered one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeOutcome {
    /// The event was applied; the entity moved `from` → `to`.
    ///
    /// Self-loops (explicit no-op rules for late/duplicate reports) show
    /// up here with `from == to`.
    Transition {
        from: &'static str,
        to: &'static str,
    },
    /// The event was rejected and dropped; the entity's state is
    /// unchanged.
    Rejected { reason: Arc<str> },
}

/// Audit record for one dispatched event.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Sequence number of the event that produced this notice.
    pub seq: u64,
    /// Wall-clock timestamp of the event.
    pub at: SystemTime,
    /// Slash-separated path of the target entity (`cluster/service/role`).
    pub entity: Arc<str>,
    /// Label of the event kind.
    pub event: &'static str,
    /// Applied transition or rejection reason.
    pub outcome: NoticeOutcome,
}

/// Contract for transition-notice observers.
///
/// Called from an observer-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative
/// waits).
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Handle a single notice.
    async fn on_notice(&self, notice: &Notice);

    /// Human-readable name (for drop/panic warnings).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this observer's queue.
    ///
    /// On overflow, notices for this observer are dropped (warn).
    fn queue_capacity(&self) -> usize {
        256
    }
}
