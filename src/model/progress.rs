//! # Child-outcome accounting for fan-out/fan-in.
//!
//! Each parent entity owns one [`Progress`]: the total number of enabled
//! children in the current start/stop round, how many have reported, and a
//! cursor into the child list for sequential advancement. All mutation
//! funnels through [`Progress::record_child_outcome`] under the write lock,
//! making the atomicity contract a single obvious point; status queries
//! take the read lock.

use std::sync::{PoisonError, RwLock};

/// What the parent should do after one child reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Advance {
    /// More children outstanding; `next` is the list index to start next
    /// (meaningful for sequential startup, ignored by aggregate stop).
    Pending { next: usize },
    /// Every enabled child has reported; the round is complete.
    Complete,
}

#[derive(Debug, Default)]
struct Counters {
    total: usize,
    done: usize,
    cursor: usize,
}

/// Lock-guarded per-entity counters for one start/stop round.
#[derive(Debug, Default)]
pub(crate) struct Progress {
    inner: RwLock<Counters>,
}

impl Progress {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resets the counters for a new round over `total` enabled children.
    pub(crate) fn begin(&self, total: usize) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.total = total;
        inner.done = 0;
        inner.cursor = 0;
    }

    /// Records one child outcome and advances the cursor.
    ///
    /// The decision is driven by count, not child identity: which child is
    /// recorded "next" depends on arrival order, but the child started next
    /// is always the next one in list order.
    pub(crate) fn record_child_outcome(&self) -> Advance {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.done += 1;
        if inner.done >= inner.total {
            Advance::Complete
        } else {
            inner.cursor += 1;
            Advance::Pending { next: inner.cursor }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_advancement() {
        let progress = Progress::new();
        progress.begin(3);

        assert_eq!(progress.record_child_outcome(), Advance::Pending { next: 1 });
        assert_eq!(progress.record_child_outcome(), Advance::Pending { next: 2 });
        assert_eq!(progress.record_child_outcome(), Advance::Complete);
    }

    #[test]
    fn test_single_child_completes_immediately() {
        let progress = Progress::new();
        progress.begin(1);
        assert_eq!(progress.record_child_outcome(), Advance::Complete);
    }

    #[test]
    fn test_begin_resets_previous_round() {
        let progress = Progress::new();
        progress.begin(3);
        progress.record_child_outcome();

        // A new round starts counting and advancing from scratch.
        progress.begin(2);
        assert_eq!(progress.record_child_outcome(), Advance::Pending { next: 1 });
        assert_eq!(progress.record_child_outcome(), Advance::Complete);
    }
}
