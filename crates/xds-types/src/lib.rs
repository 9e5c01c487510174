//! # xds-types
//!
//! Protobuf types for the subset of the Envoy xDS v3 API the watch client
//! reads and writes.
//!
//! Messages are declared with `prost` derives and keep the field numbers of
//! the upstream `.proto` definitions, so they interoperate on the wire with
//! any conforming control plane. Fields the client never inspects are left
//! out; prost skips unknown fields while decoding.
//!
//! - Discovery service types (`DiscoveryRequest`, `DiscoveryResponse`)
//! - Node identity (`Node`, `Locality`)
//! - Cluster resources (`Cluster`, `ConfigSource`)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)] // Mirrors upstream proto definitions

// Re-export prost types for convenience
pub use prost::Message;
pub use prost_types::Any;

pub mod envoy {
    //! Envoy xDS types.

    pub mod service {
        //! Envoy discovery service definitions.

        pub mod discovery {
            //! Core discovery service types.

            pub mod v3 {
                //! Discovery service v3 API.

                /// Discovery request sent by clients.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct DiscoveryRequest {
                    /// Version info from the last accepted response (empty on first request).
                    #[prost(string, tag = "1")]
                    pub version_info: String,
                    /// Node information.
                    #[prost(message, optional, tag = "2")]
                    pub node: Option<super::super::super::config::core::v3::Node>,
                    /// Requested resource names (empty for wildcard).
                    #[prost(string, repeated, tag = "3")]
                    pub resource_names: Vec<String>,
                    /// Type URL of requested resources.
                    #[prost(string, tag = "4")]
                    pub type_url: String,
                    /// Nonce from the last response.
                    #[prost(string, tag = "5")]
                    pub response_nonce: String,
                    /// Error details if this is a NACK.
                    #[prost(message, optional, tag = "6")]
                    pub error_detail: Option<crate::google::rpc::Status>,
                }

                /// Discovery response sent by servers.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct DiscoveryResponse {
                    /// Version of this response.
                    #[prost(string, tag = "1")]
                    pub version_info: String,
                    /// Resources.
                    #[prost(message, repeated, tag = "2")]
                    pub resources: Vec<::prost_types::Any>,
                    /// Whether this is a canary response.
                    #[prost(bool, tag = "3")]
                    pub canary: bool,
                    /// Type URL of the resources.
                    #[prost(string, tag = "4")]
                    pub type_url: String,
                    /// Unique nonce for this response.
                    #[prost(string, tag = "5")]
                    pub nonce: String,
                    /// Control plane identifier.
                    #[prost(message, optional, tag = "6")]
                    pub control_plane: Option<super::super::super::config::core::v3::ControlPlane>,
                }
            }
        }
    }

    pub mod config {
        //! Envoy configuration types.

        pub mod core {
            //! Core configuration types.

            pub mod v3 {
                //! Core v3 API.

                /// Node information.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Node {
                    /// Node identifier.
                    #[prost(string, tag = "1")]
                    pub id: String,
                    /// Cluster the node belongs to.
                    #[prost(string, tag = "2")]
                    pub cluster: String,
                    /// Node metadata.
                    #[prost(message, optional, tag = "3")]
                    pub metadata: Option<::prost_types::Struct>,
                    /// Locality.
                    #[prost(message, optional, tag = "4")]
                    pub locality: Option<Locality>,
                    /// User agent name.
                    #[prost(string, tag = "6")]
                    pub user_agent_name: String,
                    /// Client features.
                    #[prost(string, repeated, tag = "10")]
                    pub client_features: Vec<String>,
                }

                /// Control plane identifier.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct ControlPlane {
                    /// Identifier for this control plane.
                    #[prost(string, tag = "1")]
                    pub identifier: String,
                }

                /// Locality information.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Locality {
                    /// Region.
                    #[prost(string, tag = "1")]
                    pub region: String,
                    /// Zone.
                    #[prost(string, tag = "2")]
                    pub zone: String,
                    /// Sub-zone.
                    #[prost(string, tag = "3")]
                    pub sub_zone: String,
                }

                /// Where a piece of dynamic configuration is fetched from.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct ConfigSource {
                    #[prost(oneof = "config_source::ConfigSourceSpecifier", tags = "1, 3, 5")]
                    pub config_source_specifier: Option<config_source::ConfigSourceSpecifier>,
                }

                pub mod config_source {
                    //! ConfigSource sub-types.

                    /// The mechanism used to obtain the configuration.
                    #[derive(Clone, PartialEq, ::prost::Oneof)]
                    pub enum ConfigSourceSpecifier {
                        /// Filesystem path.
                        #[prost(string, tag = "1")]
                        Path(String),
                        /// Fetched over the aggregated discovery stream.
                        #[prost(message, tag = "3")]
                        Ads(super::AggregatedConfigSource),
                        /// Fetched from the same server that delivered the referencing resource.
                        #[prost(message, tag = "5")]
                        Self_(super::SelfConfigSource),
                    }
                }

                /// Marker for configuration delivered over ADS.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct AggregatedConfigSource {}

                /// Marker for configuration delivered by the referencing server.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct SelfConfigSource {
                    /// API version of the transport.
                    #[prost(int32, tag = "1")]
                    pub transport_api_version: i32,
                }
            }
        }

        pub mod cluster {
            //! Cluster configuration.

            pub mod v3 {
                //! Cluster v3 API.

                use super::super::core::v3::ConfigSource;

                /// Cluster configuration.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Cluster {
                    /// Cluster name.
                    #[prost(string, tag = "1")]
                    pub name: String,
                    /// Endpoint discovery configuration, used when the type is EDS.
                    #[prost(message, optional, tag = "3")]
                    pub eds_cluster_config: Option<cluster::EdsClusterConfig>,
                    /// Load balancing policy.
                    #[prost(enumeration = "cluster::LbPolicy", tag = "6")]
                    pub lb_policy: i32,
                    /// Load reporting server, if load reports are requested.
                    #[prost(message, optional, tag = "42")]
                    pub lrs_server: Option<ConfigSource>,
                    /// How the cluster's members are discovered.
                    #[prost(oneof = "cluster::ClusterDiscoveryType", tags = "2, 38")]
                    pub cluster_discovery_type: Option<cluster::ClusterDiscoveryType>,
                }

                impl Cluster {
                    /// The built-in discovery type, if one is declared.
                    pub fn discovery_type(&self) -> Option<cluster::DiscoveryType> {
                        match self.cluster_discovery_type {
                            Some(cluster::ClusterDiscoveryType::Type(t)) => {
                                cluster::DiscoveryType::try_from(t).ok()
                            }
                            _ => None,
                        }
                    }
                }

                pub mod cluster {
                    //! Cluster sub-types.

                    use super::super::super::core::v3::ConfigSource;

                    /// Built-in service discovery types.
                    #[derive(
                        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
                    )]
                    #[repr(i32)]
                    pub enum DiscoveryType {
                        Static = 0,
                        StrictDns = 1,
                        LogicalDns = 2,
                        Eds = 3,
                        OriginalDst = 4,
                    }

                    /// Load balancing policies.
                    #[derive(
                        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
                    )]
                    #[repr(i32)]
                    pub enum LbPolicy {
                        RoundRobin = 0,
                        LeastRequest = 1,
                        RingHash = 2,
                        Random = 3,
                        Maglev = 5,
                        ClusterProvided = 6,
                        LoadBalancingPolicyConfig = 7,
                    }

                    /// Discovery type selector.
                    #[derive(Clone, PartialEq, ::prost::Oneof)]
                    pub enum ClusterDiscoveryType {
                        /// One of the built-in discovery types.
                        #[prost(enumeration = "DiscoveryType", tag = "2")]
                        Type(i32),
                        /// A custom cluster extension.
                        #[prost(message, tag = "38")]
                        ClusterType(CustomClusterType),
                    }

                    /// Extension-provided cluster type.
                    #[derive(Clone, PartialEq, ::prost::Message)]
                    pub struct CustomClusterType {
                        /// Extension name.
                        #[prost(string, tag = "1")]
                        pub name: String,
                        /// Extension configuration.
                        #[prost(message, optional, tag = "2")]
                        pub typed_config: Option<::prost_types::Any>,
                    }

                    /// Endpoint discovery configuration for an EDS cluster.
                    #[derive(Clone, PartialEq, ::prost::Message)]
                    pub struct EdsClusterConfig {
                        /// Where endpoint data for the cluster comes from.
                        #[prost(message, optional, tag = "1")]
                        pub eds_config: Option<ConfigSource>,
                        /// Name used when requesting endpoints, if different from the cluster name.
                        #[prost(string, tag = "2")]
                        pub service_name: String,
                    }
                }
            }
        }
    }
}

pub mod google {
    //! Google API types.

    pub mod rpc {
        //! gRPC status types.

        /// Status type for error responses.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Status {
            /// Status code.
            #[prost(int32, tag = "1")]
            pub code: i32,
            /// Status message.
            #[prost(string, tag = "2")]
            pub message: String,
            /// Details.
            #[prost(message, repeated, tag = "3")]
            pub details: Vec<::prost_types::Any>,
        }
    }
}

/// Type URL constants.
pub mod type_url {
    /// Cluster type URL.
    pub const CLUSTER: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
    /// Listener type URL.
    pub const LISTENER: &str = "type.googleapis.com/envoy.config.listener.v3.Listener";
    /// Route type URL.
    pub const ROUTE: &str = "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";
    /// Endpoint type URL.
    pub const ENDPOINT: &str = "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";
}
