//! # Topology input: what a cluster should look like.
//!
//! Specs are plain descriptions consumed once at assembly time
//! ([`Controller::install_cluster`](crate::Controller::install_cluster));
//! entities are built from them and never re-parented afterwards.
//!
//! ## Example
//! ```rust
//! use clustervisor::{ClusterSpec, RoleSpec, ServiceSpec};
//!
//! let spec = ClusterSpec::new("acme")
//!     .service(
//!         ServiceSpec::new("hdfs")
//!             .role(RoleSpec::new("namenode").host("nn-1"))
//!             .role(RoleSpec::new("datanode").host("dn-1").host("dn-2")),
//!     )
//!     .service(ServiceSpec::new("mapred").role(RoleSpec::new("jobtracker")));
//!
//! assert_eq!(spec.services.len(), 2);
//! ```

/// Description of one role: a deployable unit bound to a set of hosts.
#[derive(Debug, Clone)]
pub struct RoleSpec {
    /// Role name, unique within its service.
    pub name: String,
    /// Hostnames this role runs on. Empty means "not host-bound":
    /// heartbeat reports from any host are accepted.
    pub hosts: Vec<String>,
}

impl RoleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: Vec::new(),
        }
    }

    /// Adds a target host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }
}

/// Description of one service: an ordered list of roles.
///
/// Order matters — startup walks the list sequentially.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    /// Service name, unique within its cluster.
    pub name: String,
    /// Roles in startup order.
    pub roles: Vec<RoleSpec>,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
        }
    }

    /// Appends a role (startup order is append order).
    pub fn role(mut self, role: RoleSpec) -> Self {
        self.roles.push(role);
        self
    }
}

/// Description of one cluster: an ordered list of services.
///
/// Order matters — startup walks the list sequentially.
#[derive(Debug, Clone)]
pub struct ClusterSpec {
    /// Cluster name.
    pub name: String,
    /// Services in startup order.
    pub services: Vec<ServiceSpec>,
}

impl ClusterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services: Vec::new(),
        }
    }

    /// Appends a service (startup order is append order).
    pub fn service(mut self, service: ServiceSpec) -> Self {
        self.services.push(service);
        self
    }
}
