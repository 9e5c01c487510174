//! Client configuration.

use std::time::Duration;

use xds_core::NodeIdentity;

/// Configuration for the xDS watch client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Identity presented on every discovery request.
    pub node: NodeIdentity,
    /// How long a watch waits for its target before failing with a timeout.
    pub watch_timeout: Duration,
    /// Buffer size of the outbound request channel created by
    /// [`XdsClientBuilder::build_channel`](crate::XdsClientBuilder::build_channel).
    pub request_buffer: usize,
}

impl ClientConfig {
    /// Default watch expiry.
    pub const DEFAULT_WATCH_TIMEOUT: Duration = Duration::from_secs(15);

    /// Default request channel buffer.
    pub const DEFAULT_REQUEST_BUFFER: usize = 16;

    /// Create a configuration for the given node with default settings.
    pub fn new(node: NodeIdentity) -> Self {
        Self {
            node,
            ..Default::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node: NodeIdentity::default(),
            watch_timeout: Self::DEFAULT_WATCH_TIMEOUT,
            request_buffer: Self::DEFAULT_REQUEST_BUFFER,
        }
    }
}
