//! # Observer fan-out for transition notices.
//!
//! Every delivery the dispatcher makes — applied or rejected — produces a
//! [`Notice`] that is fanned out to registered observers without awaiting
//! them. Observers are the ambient logging/metrics seam: the core never
//! writes logs of its own beyond drop/panic warnings.

mod observer;
mod set;

#[cfg(feature = "logging")]
mod log;

pub use observer::{Notice, NoticeOutcome, Observe};
pub use set::ObserverSet;

#[cfg(feature = "logging")]
pub use log::LogWriter;
