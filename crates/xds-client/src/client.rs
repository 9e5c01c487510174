//! The client facade: per-kind watchers behind one stream.

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tracing::{debug, info, instrument, warn};
use xds_core::{NodeIdentity, TypeUrl, XdsError, XdsResult};
use xds_types::envoy::service::discovery::v3::DiscoveryResponse;

use crate::builder::XdsClientBuilder;
use crate::cluster::{ClusterKind, ClusterUpdate};
use crate::config::ClientConfig;
use crate::stats::ClientStats;
use crate::stream::{AdsStream, StreamContext, StreamSlot};
use crate::watch::WatchHandle;
use crate::watcher::{CacheSnapshot, ResourceWatcher};

/// xDS client watching resources over a single aggregated stream.
///
/// Only cluster resources are supported today. Responses for other kinds
/// are rejected at dispatch.
///
/// # Example
///
/// ```rust,ignore
/// use xds_client::{ChannelStream, XdsClient};
/// use xds_core::NodeIdentity;
///
/// let (stream, requests) = ChannelStream::pair(16);
/// let client = XdsClient::builder()
///     .node(NodeIdentity::new("node-1"))
///     .stream(stream)
///     .build()?;
///
/// client
///     .watch_cluster("backend", |outcome| println!("{outcome:?}"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct XdsClient {
    config: ClientConfig,
    stream: StreamSlot,
    stats: Arc<ClientStats>,
    clusters: ResourceWatcher<ClusterKind>,
}

impl XdsClient {
    /// Create a builder.
    pub fn builder() -> XdsClientBuilder {
        XdsClientBuilder::new()
    }

    pub(crate) fn from_config(config: ClientConfig, stream: Arc<dyn AdsStream>) -> Self {
        let stream = StreamSlot::new(stream);
        let stats = Arc::new(ClientStats::new());
        let clusters =
            ResourceWatcher::with_parts(config.node.clone(), stream.clone(), Arc::clone(&stats));

        Self {
            config,
            stream,
            stats,
            clusters,
        }
    }

    /// Client configuration.
    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Identity presented to the control plane.
    #[inline]
    pub fn node(&self) -> &NodeIdentity {
        &self.config.node
    }

    /// Counters shared by every watcher of this client.
    #[inline]
    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    /// The cluster watcher.
    #[inline]
    pub fn clusters(&self) -> &ResourceWatcher<ClusterKind> {
        &self.clusters
    }

    /// Watch a cluster using the configured timeout.
    ///
    /// See [`ResourceWatcher::register_watch`] for the delivery contract.
    pub async fn watch_cluster<F>(&self, name: impl Into<String>, callback: F) -> XdsResult<WatchHandle>
    where
        F: FnOnce(XdsResult<ClusterUpdate>) + Send + 'static,
    {
        self.watch_cluster_with_timeout(name, self.config.watch_timeout, callback)
            .await
    }

    /// Watch a cluster, failing after `timeout`.
    pub async fn watch_cluster_with_timeout<F>(
        &self,
        name: impl Into<String>,
        timeout: Duration,
        callback: F,
    ) -> XdsResult<WatchHandle>
    where
        F: FnOnce(XdsResult<ClusterUpdate>) + Send + 'static,
    {
        self.clusters
            .register_watch(vec![name.into()], timeout, callback)
            .await
    }

    /// Watch a cluster and wait for the outcome.
    pub async fn cluster(&self, name: impl Into<String>) -> XdsResult<ClusterUpdate> {
        self.clusters.watch(name, self.config.watch_timeout).await
    }

    /// Snapshot of the validated clusters from the last accepted response.
    pub fn cluster_cache(&self) -> CacheSnapshot<ClusterUpdate> {
        self.clusters.cache()
    }

    /// Route a response to the watcher of its resource kind.
    pub fn handle_response(&self, response: &DiscoveryResponse) -> XdsResult<()> {
        match response.type_url.as_str() {
            TypeUrl::CLUSTER => self.clusters.handle_response(response),
            other => {
                let type_url = TypeUrl::new(other);
                let reason = if type_url.is_valid() {
                    format!("{} resources are not watched by this client", type_url.short_name())
                } else {
                    "not an xDS resource type".to_string()
                };
                Err(XdsError::InvalidTypeUrl {
                    type_url: other.to_string(),
                    reason,
                })
            }
        }
    }

    /// Fail the pending watch of the kind at `type_url`.
    fn fail_watch(&self, type_url: &str, error: XdsError) -> bool {
        match type_url {
            TypeUrl::CLUSTER => self.clusters.fail_watch(error),
            _ => false,
        }
    }

    /// Drive the inbound half of the stream until it stops being usable.
    ///
    /// Each response is handed to [`handle_response`](Self::handle_response).
    /// A rejected batch fails the pending watch of its kind with the
    /// rejection and ends the loop with the same error, so the caller can
    /// tear the stream down. A transport status ends the loop with
    /// [`XdsError::TransportError`] and the end of the stream with
    /// [`XdsError::StreamClosed`]. Pending watches are otherwise left alone;
    /// they survive a reconnect via [`replace_stream`](Self::replace_stream).
    #[instrument(skip_all, fields(node = %self.config.node.id()))]
    pub async fn run<S>(&self, responses: S) -> XdsError
    where
        S: Stream<Item = Result<DiscoveryResponse, tonic::Status>>,
    {
        let ctx = StreamContext::new();
        let mut responses = std::pin::pin!(responses);
        debug!(stream = %ctx.id(), "response loop started");

        while let Some(item) = responses.next().await {
            let response = match item {
                Ok(response) => response,
                Err(status) => {
                    warn!(
                        stream = %ctx.id(),
                        code = ?status.code(),
                        message = %status.message(),
                        "ADS stream failed"
                    );
                    return XdsError::transport("ADS response stream failed", status);
                }
            };
            ctx.record_response();

            if let Err(e) = self.handle_response(&response) {
                ctx.record_rejection();
                self.fail_watch(&response.type_url, e.duplicate());
                warn!(
                    stream = %ctx.id(),
                    type_url = %response.type_url,
                    responses = ctx.response_count(),
                    error = %e,
                    "ending response loop after rejected response"
                );
                return e;
            }
        }

        info!(
            stream = %ctx.id(),
            responses = ctx.response_count(),
            duration = ?ctx.duration(),
            "ADS stream ended"
        );
        XdsError::StreamClosed {
            reason: "control plane closed the response stream".to_string(),
        }
    }

    /// Swap in a new transport stream and resubscribe pending watches.
    ///
    /// Returns the number of subscriptions re-sent.
    pub async fn replace_stream(&self, stream: impl AdsStream) -> usize {
        self.stream.replace(Arc::new(stream));
        let resent = usize::from(self.clusters.resend().await);
        debug!(resent, "replaced ADS stream");
        resent
    }
}
