//! # Action emission seam.
//!
//! Starting or stopping a role is a side effect the core does not perform
//! itself: a role's transition hook builds a [`RoleAction`] and hands it to
//! the injected [`ActionSink`]. What the sink does with it — scripts,
//! signals, file writes, a heartbeat response queue — is the agent plane's
//! business; the eventual success/failure comes back later as a role event.

use std::sync::Arc;

/// What the agent should do with the role's process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCommand {
    Start,
    Stop,
}

impl RoleCommand {
    /// Short stable name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            RoleCommand::Start => "START",
            RoleCommand::Stop => "STOP",
        }
    }
}

/// Deployment order addressed to the agents hosting one role.
#[derive(Debug, Clone)]
pub struct RoleAction {
    /// Owning cluster name.
    pub cluster: Arc<str>,
    /// Owning service name.
    pub service: Arc<str>,
    /// Role name.
    pub role: Arc<str>,
    /// Hosts the role is bound to (empty = not host-bound).
    pub hosts: Vec<Arc<str>>,
    /// Requested command.
    pub command: RoleCommand,
}

/// Consumer of role actions.
///
/// `deploy` is called from transition hooks on the dispatch loop: it must
/// not block. Queue the action and return; report the outcome later by
/// posting the matching role event.
pub trait ActionSink: Send + Sync + 'static {
    fn deploy(&self, action: RoleAction);
}

/// Sink that drops every action. Default when no agent plane is wired up.
pub struct DiscardSink;

impl ActionSink for DiscardSink {
    fn deploy(&self, _action: RoleAction) {}
}
