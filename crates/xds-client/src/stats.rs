//! Client statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for watch and response handling.
///
/// All counters are atomic and can be safely read from any thread.
#[derive(Debug, Default)]
pub struct ClientStats {
    requests_sent: AtomicU64,
    send_failures: AtomicU64,
    responses_handled: AtomicU64,
    responses_rejected: AtomicU64,
    cache_swaps: AtomicU64,
    watches_satisfied: AtomicU64,
    watches_failed: AtomicU64,
    watch_timeouts: AtomicU64,
}

impl ClientStats {
    /// Create zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one request write.
    #[inline]
    pub fn record_send(&self, ok: bool) {
        if ok {
            self.requests_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.send_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a response that was fully processed.
    #[inline]
    pub fn record_handled(&self) {
        self.responses_handled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a response whose batch was rejected.
    #[inline]
    pub fn record_rejected(&self) {
        self.responses_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a wholesale cache replacement.
    #[inline]
    pub fn record_cache_swap(&self) {
        self.cache_swaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a watch completed with an update.
    #[inline]
    pub fn record_satisfied(&self) {
        self.watches_satisfied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a watch completed with an error other than a timeout.
    #[inline]
    pub fn record_failed(&self) {
        self.watches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a watch that expired.
    #[inline]
    pub fn record_timeout(&self) {
        self.watch_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests written successfully.
    #[inline]
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }

    /// Request writes that failed.
    #[inline]
    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    /// Responses fully processed.
    #[inline]
    pub fn responses_handled(&self) -> u64 {
        self.responses_handled.load(Ordering::Relaxed)
    }

    /// Responses rejected.
    #[inline]
    pub fn responses_rejected(&self) -> u64 {
        self.responses_rejected.load(Ordering::Relaxed)
    }

    /// Cache replacements.
    #[inline]
    pub fn cache_swaps(&self) -> u64 {
        self.cache_swaps.load(Ordering::Relaxed)
    }

    /// Watches completed with an update.
    #[inline]
    pub fn watches_satisfied(&self) -> u64 {
        self.watches_satisfied.load(Ordering::Relaxed)
    }

    /// Watches completed with a non-timeout error.
    #[inline]
    pub fn watches_failed(&self) -> u64 {
        self.watches_failed.load(Ordering::Relaxed)
    }

    /// Watches that expired.
    #[inline]
    pub fn watch_timeouts(&self) -> u64 {
        self.watch_timeouts.load(Ordering::Relaxed)
    }

    /// Total watch completions of any kind.
    pub fn watches_completed(&self) -> u64 {
        self.watches_satisfied() + self.watches_failed() + self.watch_timeouts()
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        for counter in [
            &self.requests_sent,
            &self.send_failures,
            &self.responses_handled,
            &self.responses_rejected,
            &self.cache_swaps,
            &self.watches_satisfied,
            &self.watches_failed,
            &self.watch_timeouts,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
