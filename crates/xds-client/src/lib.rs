//! # xds-client
//!
//! Subscription, validation and caching engine for xDS cluster discovery.
//!
//! This crate provides the client-side watch layer over an aggregated
//! discovery stream:
//!
//! - [`XdsClient`] - Facade owning one watcher per resource kind
//! - [`XdsClientBuilder`] - Builder for configuring the client
//! - [`ResourceWatcher`] - Single-watch registry plus cache for one kind
//! - [`validate_cluster`] - Acceptance rules for cluster resources
//! - [`AdsStream`] / [`ChannelStream`] - Outbound request stream
//!
//! ## Key Design Decisions
//!
//! - One lock per kind guards both the cache and the watch, so response
//!   handling and watch expiry cannot interleave
//! - A watch's callback runs exactly once and always outside that lock
//! - Registering a watch replaces the previous one and cancels its timer
//! - A response batch is all-or-nothing: one invalid resource keeps the
//!   previous cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use xds_client::{ChannelStream, XdsClient};
//! use xds_core::NodeIdentity;
//!
//! let (stream, requests) = ChannelStream::pair(16);
//! let client = XdsClient::builder()
//!     .node(NodeIdentity::new("node-1"))
//!     .stream(stream)
//!     .build()?;
//!
//! // `requests` feeds the outbound half of a tonic ADS call, whose
//! // inbound half is driven here.
//! let handle = client.watch_cluster("backend", |outcome| match outcome {
//!     Ok(update) => println!("endpoints under {}", update.service_name),
//!     Err(e) => eprintln!("watch failed: {e}"),
//! }).await?;
//!
//! let reason = client.run(responses).await;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod client;
mod cluster;
mod config;
mod request;
mod stats;
mod stream;
mod watch;
mod watcher;

/// Install a test subscriber once; honours `RUST_LOG`.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub use builder::XdsClientBuilder;
pub use client::XdsClient;
pub use cluster::{validate_cluster, ClusterKind, ClusterUpdate};
pub use config::ClientConfig;
pub use request::{new_discovery_request, node_proto};
pub use stats::ClientStats;
pub use stream::{send_request, AdsStream, ChannelStream, StreamContext, StreamId};
pub use watch::{WatchCallback, WatchCompletion, WatchHandle, WatchId};
pub use watcher::{CacheSnapshot, ResourceWatcher};
