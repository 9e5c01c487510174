//! Outbound stream handle and per-stream bookkeeping.
//!
//! Establishing the bidirectional ADS stream is the transport's job. The
//! client only needs something it can push [`DiscoveryRequest`]s into, which
//! is what [`AdsStream`] abstracts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{trace, warn};
use xds_core::{XdsError, XdsResult};
use xds_types::envoy::service::discovery::v3::DiscoveryRequest;

/// Outbound half of an ADS stream.
#[async_trait]
pub trait AdsStream: Send + Sync + 'static {
    /// Write one request onto the stream.
    async fn send(&self, request: DiscoveryRequest) -> XdsResult<()>;
}

/// [`AdsStream`] backed by a tokio channel.
///
/// The receiving half is a [`ReceiverStream`], which can be handed directly
/// to a tonic client as the request stream of a bidirectional call.
#[derive(Debug, Clone)]
pub struct ChannelStream {
    sender: mpsc::Sender<DiscoveryRequest>,
}

impl ChannelStream {
    /// Wrap an existing channel sender.
    pub fn new(sender: mpsc::Sender<DiscoveryRequest>) -> Self {
        Self { sender }
    }

    /// Create a stream handle and the request stream it feeds.
    pub fn pair(buffer: usize) -> (Self, ReceiverStream<DiscoveryRequest>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self { sender }, ReceiverStream::new(receiver))
    }

    /// Whether the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl AdsStream for ChannelStream {
    async fn send(&self, request: DiscoveryRequest) -> XdsResult<()> {
        self.sender
            .send(request)
            .await
            .map_err(|e| XdsError::transport("ADS request channel closed", e))
    }
}

/// Transport handle shared by every resource kind of one client.
///
/// The transport collaborator may swap in a fresh stream after reconnecting;
/// senders always pick up the current one.
#[derive(Clone)]
pub(crate) struct StreamSlot(Arc<RwLock<Arc<dyn AdsStream>>>);

impl StreamSlot {
    pub(crate) fn new(stream: Arc<dyn AdsStream>) -> Self {
        Self(Arc::new(RwLock::new(stream)))
    }

    pub(crate) fn current(&self) -> Arc<dyn AdsStream> {
        Arc::clone(&self.0.read())
    }

    pub(crate) fn replace(&self, stream: Arc<dyn AdsStream>) {
        *self.0.write() = stream;
    }
}

impl std::fmt::Debug for StreamSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSlot").finish_non_exhaustive()
    }
}

/// Send `request` on `stream`, reporting only whether the write succeeded.
///
/// Failures are logged and swallowed; reconnecting is up to the transport.
pub async fn send_request(stream: &dyn AdsStream, request: DiscoveryRequest) -> bool {
    let type_url = request.type_url.clone();
    let names = request.resource_names.clone();

    match stream.send(request).await {
        Ok(()) => {
            trace!(type_url = %type_url, resources = ?names, "sent discovery request");
            true
        }
        Err(e) => {
            warn!(
                type_url = %type_url,
                resources = ?names,
                error = %e,
                "discovery request failed"
            );
            false
        }
    }
}

/// Unique identifier for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(u64);

impl StreamId {
    /// Generate a new unique stream ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

/// Bookkeeping for one inbound response stream.
#[derive(Debug)]
pub struct StreamContext {
    id: StreamId,
    created_at: Instant,
    responses: AtomicU64,
    rejected: AtomicU64,
}

impl StreamContext {
    /// Create a new stream context.
    pub fn new() -> Self {
        Self {
            id: StreamId::new(),
            created_at: Instant::now(),
            responses: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Get the stream ID.
    #[inline]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Get stream duration.
    #[inline]
    pub fn duration(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    /// Record a received response.
    pub fn record_response(&self) {
        self.responses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a response whose batch was rejected.
    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Total responses received.
    #[inline]
    pub fn response_count(&self) -> u64 {
        self.responses.load(Ordering::Relaxed)
    }

    /// Total responses rejected.
    #[inline]
    pub fn rejection_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl Default for StreamContext {
    fn default() -> Self {
        Self::new()
    }
}
