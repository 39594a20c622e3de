//! Per-worker records kept by the pool.
//!
//! [`ActiveEntry`] is the live record for a registered worker and the only
//! place the worker payload is held. When a worker leaves the pool its entry
//! is retired into a [`RemovedEntry`], which keeps the client metadata and
//! the removal time but never the worker itself.

use std::sync::Arc;
use std::time::Duration;

use workerpool_core::WorkerId;

/// Live record for a registered worker.
///
/// Timestamps are wall-clock milliseconds. `created_at <= last_used_at`
/// holds for the whole life of the entry.
#[derive(Debug)]
pub(crate) struct ActiveEntry<W, C> {
    pub(crate) worker: Arc<W>,
    pub(crate) client_info: Arc<C>,
    pub(crate) created_at: u64,
    pub(crate) last_used_at: u64,
    pub(crate) message_count: u64,
    /// Write-once lineage link to the worker this one supersedes.
    pub(crate) previous_id: Option<WorkerId>,
}

impl<W, C> ActiveEntry<W, C> {
    /// Creates an entry whose last use is its creation time.
    pub(crate) fn new(worker: W, client_info: C, now: u64) -> Self {
        Self {
            worker: Arc::new(worker),
            client_info: Arc::new(client_info),
            created_at: now,
            last_used_at: now,
            message_count: 0,
            previous_id: None,
        }
    }

    /// Records use at `timestamp`, clamped so it never precedes creation.
    pub(crate) fn touch(&mut self, timestamp: u64) {
        self.last_used_at = timestamp.max(self.created_at);
    }

    /// Returns `true` if the entry has been idle for strictly longer than `timeout_ms`.
    ///
    /// A clock reading behind `last_used_at` counts as zero idle time.
    pub(crate) fn is_idle(&self, now: u64, timeout_ms: u64) -> bool {
        now.saturating_sub(self.last_used_at) > timeout_ms
    }

    /// Increments the message counter, returning the new count.
    pub(crate) fn record_message(&mut self) -> u64 {
        self.message_count = self.message_count.saturating_add(1);
        self.message_count
    }

    /// Messages per second over the whole age of the entry, idle tail included.
    pub(crate) fn current_rate(&self, now: u64) -> f64 {
        per_second(self.message_count, now.saturating_sub(self.created_at))
    }

    /// Messages per second over the span between creation and last use.
    pub(crate) fn effective_rate(&self) -> f64 {
        per_second(
            self.message_count,
            self.last_used_at.saturating_sub(self.created_at),
        )
    }

    /// Sets the lineage link if none is set yet. Returns `false` if one was already present.
    pub(crate) fn link_previous(&mut self, previous: WorkerId) -> bool {
        if self.previous_id.is_some() {
            return false;
        }
        self.previous_id = Some(previous);
        true
    }

    /// Splits the entry into the worker payload and a ledger record.
    pub(crate) fn retire(
        self,
        id: WorkerId,
        cause: RemovalCause,
        now: u64,
    ) -> (Arc<W>, RemovedEntry<C>) {
        let removed = RemovedEntry {
            id,
            client_info: self.client_info,
            removed_at: now,
            cause,
        };
        (self.worker, removed)
    }
}

/// Message count divided by a millisecond span, as a per-second rate.
///
/// Spans shorter than the clock resolution are treated as one millisecond.
#[allow(clippy::cast_precision_loss)]
fn per_second(count: u64, span_ms: u64) -> f64 {
    count as f64 * 1000.0 / span_ms.max(1) as f64
}

/// Why a worker left the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Evicted by a purge after exceeding the idle timeout.
    Purged,
    /// Removed explicitly by a caller.
    Removed,
}

/// Ledger record for a worker that has left the pool.
#[derive(Debug)]
pub struct RemovedEntry<C> {
    pub id: WorkerId,
    /// Client metadata the worker was registered with.
    pub client_info: Arc<C>,
    /// Wall-clock milliseconds at removal.
    pub removed_at: u64,
    pub cause: RemovalCause,
}

// Manual impl: cloning shares the metadata `Arc`, so `C` need not be `Clone`.
impl<C> Clone for RemovedEntry<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            client_info: Arc::clone(&self.client_info),
            removed_at: self.removed_at,
            cause: self.cause,
        }
    }
}

/// Point-in-time view of every pool counter, read under one lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub active: usize,
    pub capacity: usize,
    /// `capacity - active`, floored at zero.
    pub available_slots: usize,
    pub timeout: Duration,
    pub ever_created: u64,
    pub purged: u64,
    pub removed: u64,
}
