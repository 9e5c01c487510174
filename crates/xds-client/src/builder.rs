//! Client builder.

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::wrappers::ReceiverStream;
use xds_core::{NodeIdentity, XdsError, XdsResult};
use xds_types::envoy::service::discovery::v3::DiscoveryRequest;

use crate::client::XdsClient;
use crate::config::ClientConfig;
use crate::stream::{AdsStream, ChannelStream};

/// Builder for creating an [`XdsClient`].
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use xds_client::{ChannelStream, XdsClientBuilder};
/// use xds_core::NodeIdentity;
///
/// let (stream, requests) = ChannelStream::pair(16);
/// let client = XdsClientBuilder::new()
///     .node(NodeIdentity::new("node-1").with_cluster("edge"))
///     .stream(stream)
///     .watch_timeout(Duration::from_secs(5))
///     .build()?;
///
/// // Or let the builder create the request channel.
/// let (client, requests) = XdsClientBuilder::new()
///     .node(NodeIdentity::new("node-1"))
///     .request_buffer(64)
///     .build_channel()?;
/// ```
#[derive(Default)]
pub struct XdsClientBuilder {
    node: Option<NodeIdentity>,
    stream: Option<Arc<dyn AdsStream>>,
    watch_timeout: Option<Duration>,
    request_buffer: Option<usize>,
}

impl XdsClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            node: Some(config.node),
            stream: None,
            watch_timeout: Some(config.watch_timeout),
            request_buffer: Some(config.request_buffer),
        }
    }

    /// Set the node identity.
    ///
    /// This is required.
    pub fn node(mut self, node: NodeIdentity) -> Self {
        self.node = Some(node);
        self
    }

    /// Set the outbound stream.
    ///
    /// This is required.
    pub fn stream(mut self, stream: impl AdsStream) -> Self {
        self.stream = Some(Arc::new(stream));
        self
    }

    /// Set an already shared outbound stream.
    pub fn shared_stream(mut self, stream: Arc<dyn AdsStream>) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Set the default watch timeout.
    pub fn watch_timeout(mut self, timeout: Duration) -> Self {
        self.watch_timeout = Some(timeout);
        self
    }

    /// Set the buffer of the request channel created by
    /// [`build_channel`](Self::build_channel).
    pub fn request_buffer(mut self, size: usize) -> Self {
        self.request_buffer = Some(size);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No node identity or stream was provided
    /// - The node id is empty
    /// - The watch timeout is zero
    pub fn build(mut self) -> XdsResult<XdsClient> {
        let stream = self
            .stream
            .take()
            .ok_or_else(|| XdsError::Configuration("stream is required".into()))?;
        let config = self.into_config()?;

        Ok(XdsClient::from_config(config, stream))
    }

    /// Build the client over a fresh [`ChannelStream`] sized by the request
    /// buffer, returning the client and the requests it writes.
    ///
    /// # Errors
    ///
    /// Returns an error if a stream was already provided, or for any reason
    /// [`build`](Self::build) would.
    pub fn build_channel(self) -> XdsResult<(XdsClient, ReceiverStream<DiscoveryRequest>)> {
        if self.stream.is_some() {
            return Err(XdsError::Configuration(
                "build_channel creates its own stream".into(),
            ));
        }
        let config = self.into_config()?;
        let (stream, requests) = ChannelStream::pair(config.request_buffer);

        Ok((XdsClient::from_config(config, Arc::new(stream)), requests))
    }

    fn into_config(self) -> XdsResult<ClientConfig> {
        let node = self
            .node
            .ok_or_else(|| XdsError::Configuration("node identity is required".into()))?;
        if node.id().is_empty() {
            return Err(XdsError::Configuration("node id cannot be empty".into()));
        }

        let watch_timeout = self
            .watch_timeout
            .unwrap_or(ClientConfig::DEFAULT_WATCH_TIMEOUT);
        if watch_timeout.is_zero() {
            return Err(XdsError::Configuration(
                "watch timeout must be greater than zero".into(),
            ));
        }

        let request_buffer = self
            .request_buffer
            .unwrap_or(ClientConfig::DEFAULT_REQUEST_BUFFER);
        if request_buffer == 0 {
            return Err(XdsError::Configuration(
                "request buffer must be greater than zero".into(),
            ));
        }

        Ok(ClientConfig {
            node,
            watch_timeout,
            request_buffer,
        })
    }
}

impl std::fmt::Debug for XdsClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XdsClientBuilder")
            .field("node", &self.node)
            .field("stream", &self.stream.is_some())
            .field("watch_timeout", &self.watch_timeout)
            .field("request_buffer", &self.request_buffer)
            .finish()
    }
}
