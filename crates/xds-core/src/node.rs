//! Node identity carried on every discovery request.
//!
//! The control plane uses the node identity to decide which configuration a
//! client receives. Bootstrapping the identity is the surrounding process's
//! job; this type only holds what it produced.

use std::fmt;

/// Identity of the client node as presented to the control plane.
///
/// # Example
///
/// ```rust
/// use xds_core::NodeIdentity;
///
/// let node = NodeIdentity::new("sidecar-7")
///     .with_cluster("payments")
///     .with_locality("us-east1", "us-east1-b");
///
/// assert_eq!(node.id(), "sidecar-7");
/// assert_eq!(node.cluster(), "payments");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeIdentity {
    id: String,
    cluster: String,
    region: String,
    zone: String,
    user_agent_name: String,
    client_features: Vec<String>,
}

impl NodeIdentity {
    /// User agent reported when none is set explicitly.
    pub const DEFAULT_USER_AGENT: &'static str = "nebucloud-xds-client";

    /// Create an identity for the given node ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_agent_name: Self::DEFAULT_USER_AGENT.to_string(),
            ..Default::default()
        }
    }

    /// Set the logical cluster the node belongs to.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }

    /// Set the node's region and zone.
    #[must_use]
    pub fn with_locality(mut self, region: impl Into<String>, zone: impl Into<String>) -> Self {
        self.region = region.into();
        self.zone = zone.into();
        self
    }

    /// Override the user agent name.
    #[must_use]
    pub fn with_user_agent(mut self, name: impl Into<String>) -> Self {
        self.user_agent_name = name.into();
        self
    }

    /// Advertise a client feature to the control plane.
    #[must_use]
    pub fn with_client_feature(mut self, feature: impl Into<String>) -> Self {
        self.client_features.push(feature.into());
        self
    }

    /// Node identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Logical cluster name.
    #[must_use]
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Region, empty if unset.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Zone, empty if unset.
    #[must_use]
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Whether a locality was configured.
    #[must_use]
    pub fn has_locality(&self) -> bool {
        !self.region.is_empty() || !self.zone.is_empty()
    }

    /// User agent name.
    #[must_use]
    pub fn user_agent_name(&self) -> &str {
        &self.user_agent_name
    }

    /// Advertised client features.
    #[must_use]
    pub fn client_features(&self) -> &[String] {
        &self.client_features
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cluster.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}/{}", self.cluster, self.id)
        }
    }
}
