//! Watch entries and their one-shot completion.
//!
//! A watch is a standing request to learn the state of one named resource.
//! Each registration owns a [`WatchCompletion`], which can only be consumed
//! once; the registry keeps the entry after completion until a newer
//! registration replaces it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;
use xds_core::XdsResult;

/// Callback invoked with the outcome of a watch.
pub type WatchCallback<U> = Box<dyn FnOnce(XdsResult<U>) + Send + 'static>;

/// Unique identifier for a watch registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    /// Create a new unique watch ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value of this watch ID.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// Capability to deliver a watch outcome exactly once.
///
/// Completing consumes the token, so a second delivery does not type-check.
pub struct WatchCompletion<U> {
    callback: WatchCallback<U>,
}

impl<U> WatchCompletion<U> {
    /// Wrap a callback.
    pub fn new(callback: impl FnOnce(XdsResult<U>) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Deliver the outcome.
    pub fn complete(self, outcome: XdsResult<U>) {
        (self.callback)(outcome)
    }
}

impl<U> fmt::Debug for WatchCompletion<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchCompletion").finish_non_exhaustive()
    }
}

/// The single outstanding subscription for a resource kind.
#[derive(Debug)]
pub(crate) struct WatchEntry<U> {
    id: WatchId,
    targets: Vec<String>,
    completion: Option<WatchCompletion<U>>,
    timer: Option<JoinHandle<()>>,
}

impl<U> WatchEntry<U> {
    pub(crate) fn new(targets: Vec<String>, completion: WatchCompletion<U>) -> Self {
        Self {
            id: WatchId::next(),
            targets,
            completion: Some(completion),
            timer: None,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> WatchId {
        self.id
    }

    #[inline]
    pub(crate) fn targets(&self) -> &[String] {
        &self.targets
    }

    /// The name matched against incoming resources.
    #[inline]
    pub(crate) fn primary_target(&self) -> Option<&str> {
        self.targets.first().map(String::as_str)
    }

    /// Whether the outcome has not been delivered yet.
    #[inline]
    pub(crate) fn is_pending(&self) -> bool {
        self.completion.is_some()
    }

    pub(crate) fn arm(&mut self, timer: JoinHandle<()>) {
        self.timer = Some(timer);
    }

    /// Stop the expiry timer and take the completion, if still pending.
    ///
    /// Must run under the watcher lock; whoever takes the token first owns
    /// the right to complete the watch.
    pub(crate) fn finish(&mut self) -> Option<WatchCompletion<U>> {
        self.stop_timer();
        self.completion.take()
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<U> Drop for WatchEntry<U> {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

/// Handle returned by a watch registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchHandle {
    id: WatchId,
    request_sent: bool,
}

impl WatchHandle {
    pub(crate) fn new(id: WatchId, request_sent: bool) -> Self {
        Self { id, request_sent }
    }

    /// ID of the registered watch.
    #[inline]
    pub fn id(&self) -> WatchId {
        self.id
    }

    /// Whether the subscription request reached the stream.
    ///
    /// False when the send failed or when a newer registration replaced
    /// this one before its request was written. A failed send leaves the
    /// watch armed; it completes on a later response (after
    /// [`resend`](crate::ResourceWatcher::resend)) or on expiry.
    #[inline]
    pub fn request_sent(&self) -> bool {
        self.request_sent
    }
}
