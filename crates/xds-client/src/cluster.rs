//! Cluster (CDS) resource kind.
//!
//! The client only accepts clusters whose endpoints are themselves delivered
//! over the aggregated stream and which balance with round robin. Anything
//! else is rejected so it can never reach the cache.

use xds_core::{ResourceKind, TypeUrl, XdsError, XdsResult};
use xds_types::envoy::config::cluster::v3::cluster::{DiscoveryType, LbPolicy};
use xds_types::envoy::config::cluster::v3::Cluster;
use xds_types::envoy::config::core::v3::config_source::ConfigSourceSpecifier;
use xds_types::envoy::config::core::v3::ConfigSource;

/// Validated view of a cluster resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClusterUpdate {
    /// Name to request endpoints under.
    pub service_name: String,
    /// Whether load reports should be sent to the control plane itself.
    pub enable_lrs: bool,
}

/// Marker type for the cluster resource kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterKind;

impl ResourceKind for ClusterKind {
    const TYPE_URL: &'static str = TypeUrl::CLUSTER;
    type Resource = Cluster;
    type Update = ClusterUpdate;

    fn name(resource: &Cluster) -> &str {
        &resource.name
    }

    fn validate(resource: &Cluster) -> XdsResult<ClusterUpdate> {
        validate_cluster(resource)
    }

    /// Clusters without an explicit EDS service name use their own name.
    fn resolve(mut update: ClusterUpdate, name: &str) -> ClusterUpdate {
        if update.service_name.is_empty() {
            update.service_name = name.to_string();
        }
        update
    }
}

/// Check a cluster against the supported configuration.
///
/// The returned update carries the service name exactly as configured, which
/// may be empty; [`ClusterKind::resolve`] applies the name fallback.
pub fn validate_cluster(cluster: &Cluster) -> XdsResult<ClusterUpdate> {
    let reject = |reason: String| XdsError::invalid_resource(TypeUrl::CLUSTER, &cluster.name, reason);

    if cluster.name.is_empty() {
        return Err(reject("cluster name cannot be empty".to_string()));
    }

    if cluster.discovery_type() != Some(DiscoveryType::Eds) {
        return Err(reject(format!(
            "unexpected cluster discovery type {:?}",
            cluster.cluster_discovery_type
        )));
    }

    let eds = cluster.eds_cluster_config.as_ref();
    if !eds.and_then(|c| c.eds_config.as_ref()).is_some_and(is_ads) {
        return Err(reject(format!(
            "unexpected eds config {:?}, endpoints must be delivered over ADS",
            eds.and_then(|c| c.eds_config.as_ref())
        )));
    }

    match LbPolicy::try_from(cluster.lb_policy) {
        Ok(LbPolicy::RoundRobin) => {}
        Ok(other) => return Err(reject(format!("unexpected lb policy {other:?}"))),
        Err(_) => return Err(reject(format!("unknown lb policy {}", cluster.lb_policy))),
    }

    Ok(ClusterUpdate {
        service_name: eds.map(|c| c.service_name.clone()).unwrap_or_default(),
        enable_lrs: cluster.lrs_server.as_ref().is_some_and(is_self),
    })
}

fn is_ads(source: &ConfigSource) -> bool {
    matches!(
        source.config_source_specifier,
        Some(ConfigSourceSpecifier::Ads(_))
    )
}

fn is_self(source: &ConfigSource) -> bool {
    matches!(
        source.config_source_specifier,
        Some(ConfigSourceSpecifier::Self_(_))
    )
}
