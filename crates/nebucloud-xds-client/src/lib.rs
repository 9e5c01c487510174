//! # nebucloud-xds-client
//!
//! xDS cluster discovery client library for Rust.
//!
//! This crate watches cluster resources over the Aggregated Discovery
//! Service (ADS). It supports:
//!
//! - One watch per resource kind, replaced by newer registrations
//! - All-or-nothing validation of each response batch
//! - A cache of validated clusters, swapped wholesale per response
//! - Watch expiry with exactly-once callback delivery
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nebucloud_xds_client::prelude::*;
//!
//! // The receiving half becomes the request stream of a tonic ADS call.
//! let (stream, requests) = ChannelStream::pair(16);
//!
//! let client = XdsClient::builder()
//!     .node(NodeIdentity::new("node-1").with_cluster("edge"))
//!     .stream(stream)
//!     .build()?;
//!
//! client.watch_cluster("backend", |outcome| {
//!     if let Ok(update) = outcome {
//!         println!("request endpoints for {}", update.service_name);
//!     }
//! }).await?;
//!
//! // Feed the inbound half of the ADS call into the client.
//! let reason = client.run(responses).await;
//! ```
//!
//! ## Architecture
//!
//! This library is organized into several crates:
//!
//! - `xds-core` - Core types, traits, and error handling
//! - `xds-client` - Watch registry, validation and cache
//! - `xds-types` - Protobuf message types
//!
//! This crate (`nebucloud-xds-client`) re-exports all public APIs for convenience.
//!
//! ## Design Principles
//!
//! 1. **No panics in library code** - All errors are returned as `Result`
//! 2. **No locks held across await points or callbacks** - Callbacks may re-register
//! 3. **Type-safe resource kinds** - Generic `ResourceKind` trait per kind
//! 4. **Observable** - `tracing` spans and events plus `ClientStats` counters

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Re-export all sub-crates
pub use xds_client as client;
pub use xds_core as core;
pub use xds_types as types;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use nebucloud_xds_client::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use xds_core::{NodeIdentity, ResourceKind, TypeUrl, XdsError, XdsResult};

    // Client types
    pub use xds_client::{
        AdsStream, CacheSnapshot, ChannelStream, ClientConfig, ClientStats, ClusterKind,
        ClusterUpdate, ResourceWatcher, WatchHandle, WatchId, XdsClient, XdsClientBuilder,
    };

    // Wire types
    pub use xds_types::envoy::service::discovery::v3::{DiscoveryRequest, DiscoveryResponse};
}

/// Version information for this crate.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Minimum supported Rust version.
    pub const MSRV: &str = "1.75";

    /// Get version info as a string.
    pub fn version_string() -> String {
        format!("nebucloud-xds-client {} (MSRV {})", VERSION, MSRV)
    }
}
