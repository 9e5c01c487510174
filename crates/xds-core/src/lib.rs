//! # xds-core
//!
//! Core types, traits, and error handling for the xDS watch client.
//!
//! This crate provides the foundational types used across the other crates:
//!
//! - [`XdsError`] - Error taxonomy with gRPC status code mapping
//! - [`NodeIdentity`] - Client node identity sent on every request
//! - [`ResourceKind`] - Trait describing one subscribable resource kind
//! - [`TypeUrl`] - Type URL handling and constants
//!
//! ## Example
//!
//! ```rust
//! use xds_core::{NodeIdentity, TypeUrl};
//!
//! let node = NodeIdentity::new("my-node");
//! let kind = TypeUrl::new(TypeUrl::CLUSTER);
//!
//! assert_eq!(node.id(), "my-node");
//! assert_eq!(kind.short_name(), "Cluster");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod node;
mod resource;
mod type_url;

pub use error::XdsError;
pub use node::NodeIdentity;
pub use resource::{decode_any, encode_any, ResourceKind};
pub use type_url::TypeUrl;

/// Result type alias using [`XdsError`].
pub type Result<T> = std::result::Result<T, XdsError>;

/// Alias for Result to maintain backward compatibility.
pub type XdsResult<T> = Result<T>;
