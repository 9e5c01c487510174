//! Per-kind watch registry, cache and response handling.
//!
//! [`ResourceWatcher`] owns, behind a single lock, the cache of validated
//! updates for one resource kind together with that kind's only active
//! watch. Response handling, watch expiry and re-registration all go through
//! that lock, so exactly one of them gets to complete a given watch.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};
use xds_core::{decode_any, NodeIdentity, ResourceKind, XdsError, XdsResult};
use xds_types::envoy::service::discovery::v3::DiscoveryResponse;

use crate::request::new_discovery_request;
use crate::stats::ClientStats;
use crate::stream::{send_request, AdsStream, StreamSlot};
use crate::watch::{WatchCompletion, WatchEntry, WatchHandle, WatchId};

/// Read-only snapshot of a kind's cache.
pub type CacheSnapshot<U> = Arc<HashMap<String, U>>;

/// Cache and watch slot, always mutated together.
struct WatcherState<U> {
    cache: CacheSnapshot<U>,
    watch: Option<WatchEntry<U>>,
}

struct WatcherInner<K: ResourceKind> {
    node: NodeIdentity,
    stream: StreamSlot,
    stats: Arc<ClientStats>,
    state: Mutex<WatcherState<K::Update>>,
    /// Orders subscription writes. Never held together with `state`.
    send_order: tokio::sync::Mutex<()>,
}

/// Subscription, validation and cache engine for one resource kind.
///
/// Cloning is cheap and yields a handle to the same engine.
pub struct ResourceWatcher<K: ResourceKind> {
    inner: Arc<WatcherInner<K>>,
}

impl<K: ResourceKind> Clone for ResourceWatcher<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: ResourceKind> fmt::Debug for ResourceWatcher<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ResourceWatcher")
            .field("type_url", &K::TYPE_URL)
            .field("cached", &state.cache.len())
            .field("watch", &state.watch.as_ref().map(|w| w.id()))
            .finish()
    }
}

impl<K: ResourceKind> ResourceWatcher<K> {
    /// Create a standalone watcher sending on `stream`.
    pub fn new(node: NodeIdentity, stream: Arc<dyn AdsStream>) -> Self {
        Self::with_parts(node, StreamSlot::new(stream), Arc::new(ClientStats::new()))
    }

    pub(crate) fn with_parts(node: NodeIdentity, stream: StreamSlot, stats: Arc<ClientStats>) -> Self {
        Self {
            inner: Arc::new(WatcherInner {
                node,
                stream,
                stats,
                state: Mutex::new(WatcherState {
                    cache: Arc::new(HashMap::new()),
                    watch: None,
                }),
                send_order: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Statistics shared with the owning client.
    pub fn stats(&self) -> &ClientStats {
        &self.inner.stats
    }

    /// Register the kind's watch, replacing any previous one.
    ///
    /// Only the first of `targets` is matched against responses; all of them
    /// are requested. The callback runs exactly once: with the update of the
    /// first target, with [`XdsError::ResourceNotFound`] when a valid
    /// response omits it, with [`XdsError::Timeout`] after `timeout`, or with
    /// [`XdsError::WatchCancelled`] if a newer registration displaces it
    /// first. A displaced watch's timer is stopped before the new one is armed.
    ///
    /// Subscription writes are serialized, and a registration that has been
    /// displaced by the time it may write skips its request, so the last
    /// request on the wire always names the registered targets.
    ///
    /// Fails with [`XdsError::Configuration`] when `targets` is empty.
    ///
    /// Must be called from within a tokio runtime, which drives the expiry
    /// timer.
    pub async fn register_watch<F>(
        &self,
        targets: Vec<String>,
        timeout: Duration,
        callback: F,
    ) -> XdsResult<WatchHandle>
    where
        F: FnOnce(XdsResult<K::Update>) + Send + 'static,
    {
        if targets.is_empty() {
            return Err(XdsError::Configuration(format!(
                "{} watch requires at least one target",
                kind_label::<K>()
            )));
        }
        let runtime = Handle::try_current()
            .map_err(|e| XdsError::internal("watch expiry timer requires a tokio runtime", e))?;

        let mut entry = WatchEntry::new(targets.clone(), WatchCompletion::new(callback));
        let id = entry.id();

        let displaced = {
            let mut state = self.inner.state.lock();
            // Armed under the lock so the timer can never observe the slot
            // before this entry is installed.
            let weak = Arc::downgrade(&self.inner);
            entry.arm(runtime.spawn(expire_after(weak, id, timeout)));
            state
                .watch
                .replace(entry)
                .and_then(|mut old| old.finish().map(|completion| (old.id(), completion)))
        };

        debug!(
            type_url = K::TYPE_URL,
            watch_id = %id,
            targets = ?targets,
            timeout = ?timeout,
            "registered watch"
        );

        if let Some((old_id, completion)) = displaced {
            debug!(type_url = K::TYPE_URL, watch_id = %old_id, "cancelled displaced watch");
            self.inner.stats.record_failed();
            completion.complete(Err(XdsError::WatchCancelled {
                type_url: K::TYPE_URL.to_string(),
                watch_id: old_id.as_u64(),
            }));
        }

        let sent = match self.send_subscription(Some(id)).await {
            Some(sent) => sent,
            None => {
                debug!(type_url = K::TYPE_URL, watch_id = %id, "request superseded by newer watch");
                false
            }
        };

        Ok(WatchHandle::new(id, sent))
    }

    /// Write the subscription of the registered watch.
    ///
    /// With `expected`, only that registration's request is written;
    /// otherwise only a still pending watch is resubscribed. Returns `None`
    /// when nothing qualified, else whether the write succeeded.
    async fn send_subscription(&self, expected: Option<WatchId>) -> Option<bool> {
        let _order = self.inner.send_order.lock().await;

        // Checked after taking the send order so a displaced registration
        // can never write after its successor.
        let targets = {
            let state = self.inner.state.lock();
            match state.watch.as_ref() {
                Some(w) if expected.map_or(w.is_pending(), |id| w.id() == id) => w.targets().to_vec(),
                _ => return None,
            }
        };

        let request = new_discovery_request(&self.inner.node, K::TYPE_URL, &targets);
        let stream = self.inner.stream.current();
        let sent = send_request(stream.as_ref(), request).await;
        self.inner.stats.record_send(sent);
        Some(sent)
    }

    /// Watch `target` and wait for the outcome.
    pub async fn watch(&self, target: impl Into<String>, timeout: Duration) -> XdsResult<K::Update> {
        let (tx, rx) = oneshot::channel();
        self.register_watch(vec![target.into()], timeout, move |outcome| {
            let _ = tx.send(outcome);
        })
        .await?;

        rx.await.map_err(|_| XdsError::StreamClosed {
            reason: "watcher dropped before the watch completed".to_string(),
        })?
    }

    /// Process one response batch for this kind.
    ///
    /// Every resource is unwrapped and validated before anything changes; the
    /// first failure aborts the batch, keeps the old cache, leaves the watch
    /// pending and is returned. A fully valid batch replaces the cache
    /// wholesale and completes the watch, with
    /// [`XdsError::ResourceNotFound`] if its target was not in the batch.
    /// A response with no registered watch is a protocol violation.
    pub fn handle_response(&self, response: &DiscoveryResponse) -> XdsResult<()> {
        let (watch_id, completion, outcome) = match self.apply_batch(response) {
            Ok(applied) => applied,
            Err(e) => {
                self.inner.stats.record_rejected();
                warn!(
                    type_url = K::TYPE_URL,
                    version = %response.version_info,
                    nonce = %response.nonce,
                    error = %e,
                    "rejected response"
                );
                return Err(e);
            }
        };
        self.inner.stats.record_handled();

        let Some(completion) = completion else {
            debug!(
                type_url = K::TYPE_URL,
                watch_id = %watch_id,
                "watch already notified, cache refreshed only"
            );
            return Ok(());
        };

        match &outcome {
            Ok(update) => {
                self.inner.stats.record_satisfied();
                info!(type_url = K::TYPE_URL, watch_id = %watch_id, update = ?update, "watch satisfied");
            }
            Err(e) => {
                self.inner.stats.record_failed();
                warn!(type_url = K::TYPE_URL, watch_id = %watch_id, error = %e, "watch failed");
            }
        }
        completion.complete(outcome);
        Ok(())
    }

    /// Validate and cache a batch, taking the watch completion on success.
    #[allow(clippy::type_complexity)]
    fn apply_batch(
        &self,
        response: &DiscoveryResponse,
    ) -> XdsResult<(WatchId, Option<WatchCompletion<K::Update>>, XdsResult<K::Update>)> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        let watch = state.watch.as_mut().ok_or_else(|| XdsError::NoActiveWatch {
            type_url: K::TYPE_URL.to_string(),
        })?;
        let target = watch.primary_target().unwrap_or_default().to_string();

        let mut fresh = HashMap::with_capacity(response.resources.len());
        let mut matched = None;
        for any in &response.resources {
            let resource: K::Resource = decode_any(any, K::TYPE_URL)?;
            let name = K::name(&resource);
            let update = K::resolve(K::validate(&resource)?, name);
            trace!(type_url = K::TYPE_URL, name = %name, update = ?update, "accepted resource");

            if name == target {
                matched = Some(update.clone());
            }
            fresh.insert(name.to_string(), update);
        }

        debug!(
            type_url = K::TYPE_URL,
            version = %response.version_info,
            resources = fresh.len(),
            "replaced cache"
        );
        state.cache = Arc::new(fresh);
        self.inner.stats.record_cache_swap();

        let outcome = matched.ok_or_else(|| XdsError::ResourceNotFound {
            type_url: K::TYPE_URL.to_string(),
            name: target,
        });
        Ok((watch.id(), watch.finish(), outcome))
    }

    /// Complete the pending watch with `error`.
    ///
    /// Returns `false` if there was no pending watch.
    pub fn fail_watch(&self, error: XdsError) -> bool {
        let taken = {
            let mut state = self.inner.state.lock();
            state
                .watch
                .as_mut()
                .and_then(|w| w.finish().map(|completion| (w.id(), completion)))
        };

        match taken {
            Some((watch_id, completion)) => {
                self.inner.stats.record_failed();
                warn!(type_url = K::TYPE_URL, watch_id = %watch_id, error = %error, "watch failed");
                completion.complete(Err(error));
                true
            }
            None => false,
        }
    }

    fn expire(&self, id: WatchId) {
        let taken = {
            let mut state = self.inner.state.lock();
            match state.watch.as_mut() {
                Some(w) if w.id() == id => w
                    .finish()
                    .map(|completion| (w.primary_target().unwrap_or_default().to_string(), completion)),
                _ => None,
            }
        };

        // Already completed or displaced; the timer lost the race.
        let Some((target, completion)) = taken else {
            return;
        };

        self.inner.stats.record_timeout();
        warn!(type_url = K::TYPE_URL, watch_id = %id, target = %target, "watch expired");
        completion.complete(Err(XdsError::Timeout {
            operation: format!("{} watch for {target}", kind_label::<K>()),
        }));
    }

    /// Re-send the subscription of the pending watch, if any.
    ///
    /// Used after the transport replaces the stream. Returns whether a
    /// request was written.
    pub async fn resend(&self) -> bool {
        self.send_subscription(None).await.unwrap_or(false)
    }

    /// Current cache contents.
    ///
    /// The snapshot is immutable; later responses replace the cache rather
    /// than changing it, so re-read to observe updates.
    pub fn cache(&self) -> CacheSnapshot<K::Update> {
        Arc::clone(&self.inner.state.lock().cache)
    }

    /// Targets of the registered watch, whether or not it has completed.
    pub fn watched_targets(&self) -> Option<Vec<String>> {
        self.inner
            .state
            .lock()
            .watch
            .as_ref()
            .map(|w| w.targets().to_vec())
    }

    /// Whether a registered watch is still waiting for its outcome.
    pub fn has_pending_watch(&self) -> bool {
        self.inner
            .state
            .lock()
            .watch
            .as_ref()
            .is_some_and(WatchEntry::is_pending)
    }
}

/// Discovery service name of the kind, for messages.
fn kind_label<K: ResourceKind>() -> String {
    let type_url = K::type_url();
    match type_url.service_abbrev() {
        Some(abbrev) => abbrev.to_string(),
        None => type_url.short_name().to_string(),
    }
}

async fn expire_after<K: ResourceKind>(inner: Weak<WatcherInner<K>>, id: WatchId, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    if let Some(inner) = inner.upgrade() {
        ResourceWatcher { inner }.expire(id);
    }
}
