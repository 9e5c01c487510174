//! Discovery request construction.

use xds_core::NodeIdentity;
use xds_types::envoy::config::core::v3::{Locality, Node};
use xds_types::envoy::service::discovery::v3::DiscoveryRequest;

/// Build the protobuf node message for an identity.
pub fn node_proto(node: &NodeIdentity) -> Node {
    Node {
        id: node.id().to_string(),
        cluster: node.cluster().to_string(),
        metadata: None,
        locality: node.has_locality().then(|| Locality {
            region: node.region().to_string(),
            zone: node.zone().to_string(),
            sub_zone: String::new(),
        }),
        user_agent_name: node.user_agent_name().to_string(),
        client_features: node.client_features().to_vec(),
    }
}

/// Build a discovery request for `resource_names` of the given type.
///
/// An empty name list subscribes to every resource of the type.
pub fn new_discovery_request(
    node: &NodeIdentity,
    type_url: &str,
    resource_names: &[String],
) -> DiscoveryRequest {
    DiscoveryRequest {
        version_info: String::new(),
        node: Some(node_proto(node)),
        resource_names: resource_names.to_vec(),
        type_url: type_url.to_string(),
        response_nonce: String::new(),
        error_detail: None,
    }
}
