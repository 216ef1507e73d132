//! # Runtime configuration.
//!
//! [`Config`] centralizes the controller's knobs. It is consumed once at
//! [`Controller::new`](crate::Controller::new); nothing re-reads it at
//! runtime.
//!
//! ## Sentinel values
//! - `grace = 0s` → shutdown does not wait for the queue to settle.
//! - `observer_queue = 0` → observers that do not declare their own
//!   capacity fall back to the built-in minimum of 1.

use std::time::Duration;

/// Global configuration for the controller runtime.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time [`Controller::shutdown`](crate::Controller::shutdown)
    /// waits for in-flight events to settle before cancelling the
    /// dispatch loop.
    ///
    /// Exceeding it returns
    /// [`RuntimeError::GraceExceeded`](crate::RuntimeError::GraceExceeded).
    pub grace: Duration,

    /// Fallback queue capacity for observers that declare a zero
    /// capacity of their own.
    pub observer_queue: usize,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 30s` (reasonable shutdown window)
    /// - `observer_queue = 256`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            observer_queue: 256,
        }
    }
}
