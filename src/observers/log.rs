//! # Simple logging observer for debugging and demos.
//!
//! [`LogWriter`] prints notices to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [transition] entity=acme/hdfs/namenode event=S_START_SUCCESS STARTING->ACTIVE
//! [rejected] entity=acme event=S_STOP reason="no transition from state `INACTIVE` on event `S_STOP`"
//! ```

use async_trait::async_trait;

use super::observer::{Notice, NoticeOutcome, Observe};

/// Simple stdout logging observer.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Observe`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Observe for LogWriter {
    async fn on_notice(&self, notice: &Notice) {
        match &notice.outcome {
            NoticeOutcome::Transition { from, to } => {
                println!(
                    "[transition] entity={} event={} {from}->{to}",
                    notice.entity, notice.event
                );
            }
            NoticeOutcome::Rejected { reason } => {
                println!(
                    "[rejected] entity={} event={} reason={reason:?}",
                    notice.entity, notice.event
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
