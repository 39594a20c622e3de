//! Bounded, idle-evicting registry of leased workers.
//!
//! [`WorkerPool`] hands out identifiers for caller-supplied worker payloads,
//! refuses new registrations once `capacity` workers are active, and evicts
//! workers whose last use is older than `timeout`. Every worker that leaves
//! the pool is appended to exactly one of two ledgers: purged (idle timeout)
//! or removed (explicit caller removal).
//!
//! All entry state and both ledgers live behind a single `RwLock`, so each
//! mutating call is one critical section and readers never observe a
//! half-applied change. Capacity and timeout live in an `ArcSwap` so they can
//! be read without touching that lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};
use workerpool_core::{ClockSource, SystemClock, WorkerId};

use crate::config::PoolConfig;
use crate::entry::{ActiveEntry, PoolStats, RemovalCause, RemovedEntry};
use crate::error::{PoolError, PoolResult};

// ---------------------------------------------------------------------------
// PoolState
// ---------------------------------------------------------------------------

/// Everything guarded by the pool lock.
struct PoolState<W, C> {
    active: HashMap<WorkerId, ActiveEntry<W, C>>,
    /// Append-only, never pruned.
    purged: Vec<RemovedEntry<C>>,
    /// Append-only, never pruned.
    removed: Vec<RemovedEntry<C>>,
    ever_created: u64,
}

impl<W, C> PoolState<W, C> {
    fn new() -> Self {
        Self {
            active: HashMap::new(),
            purged: Vec::new(),
            removed: Vec::new(),
            ever_created: 0,
        }
    }

    /// Moves every entry idle for longer than `timeout_ms` into the purged ledger.
    fn purge_idle(&mut self, now: u64, timeout_ms: u64) -> Vec<WorkerId> {
        let expired: Vec<WorkerId> = self
            .active
            .iter()
            .filter(|(_, entry)| entry.is_idle(now, timeout_ms))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(entry) = self.active.remove(id) {
                let (_worker, record) = entry.retire(id.clone(), RemovalCause::Purged, now);
                self.purged.push(record);
            }
        }

        if !expired.is_empty() {
            info!(
                purged = expired.len(),
                active = self.active.len(),
                timeout_ms = timeout_ms,
                "Purged idle workers"
            );
        }

        expired
    }

    fn remove(&mut self, id: &WorkerId, now: u64) -> Option<Arc<W>> {
        let entry = self.active.remove(id)?;
        let (worker, record) = entry.retire(id.clone(), RemovalCause::Removed, now);
        self.removed.push(record);
        Some(worker)
    }
}

// ---------------------------------------------------------------------------
// WorkerPool
// ---------------------------------------------------------------------------

/// Thread-safe registry of active workers with admission control and idle eviction.
///
/// `W` is the worker payload and `C` the client metadata stored alongside it;
/// the pool never inspects either. Share it between threads as
/// `Arc<WorkerPool<W, C>>`.
pub struct WorkerPool<W, C> {
    state: RwLock<PoolState<W, C>>,
    config: ArcSwap<PoolConfig>,
    clock: Arc<dyn ClockSource>,
}

impl<W, C> WorkerPool<W, C> {
    /// Creates an empty pool reading the real system clock.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty pool reading time from `clock`.
    #[must_use]
    pub fn with_clock(config: PoolConfig, clock: Arc<dyn ClockSource>) -> Self {
        Self {
            state: RwLock::new(PoolState::new()),
            config: ArcSwap::from_pointee(config),
            clock,
        }
    }

    // --- Membership ---

    /// Registers a worker, returning its new identifier.
    ///
    /// Idle workers are purged first. Returns `None`, leaving the pool
    /// unchanged, if it is still at capacity after the purge.
    pub fn register(&self, worker: W, client_info: C) -> Option<WorkerId> {
        let config = self.config.load();
        let mut state = self.state.write();
        let now = self.clock.now();

        state.purge_idle(now, config.timeout_millis());

        if state.active.len() >= config.capacity {
            warn!(
                capacity = config.capacity,
                active = state.active.len(),
                "Worker pool full; registration rejected"
            );
            return None;
        }

        let mut id = WorkerId::generate();
        while state.active.contains_key(&id) {
            id = WorkerId::generate();
        }

        state
            .active
            .insert(id.clone(), ActiveEntry::new(worker, client_info, now));
        state.ever_created += 1;

        debug!(worker_id = %id, active = state.active.len(), "Registered worker");
        Some(id)
    }

    /// Removes a worker at the caller's request.
    ///
    /// Returns `true` if the worker was active. Unknown identifiers are ignored.
    pub fn remove(&self, id: &WorkerId) -> bool {
        let mut state = self.state.write();
        let now = self.clock.now();
        let removed = state.remove(id, now).is_some();
        if removed {
            debug!(worker_id = %id, active = state.active.len(), "Removed worker");
        }
        removed
    }

    /// Removes every active worker, handing the payloads back to the caller.
    ///
    /// Each worker is recorded in the removed ledger. No purge runs first, so
    /// idle workers are drained rather than counted as purged.
    pub fn drain_all(&self) -> Vec<(WorkerId, Arc<W>)> {
        let mut state = self.state.write();
        let now = self.clock.now();

        let ids: Vec<WorkerId> = state.active.keys().cloned().collect();
        let mut drained = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(worker) = state.remove(&id, now) {
                drained.push((id, worker));
            }
        }

        debug!(drained = drained.len(), "Drained worker pool");
        drained
    }

    /// Evicts every worker idle for longer than the timeout.
    ///
    /// Returns the evicted identifiers, or `None` if nothing was evicted.
    pub fn purge(&self) -> Option<Vec<WorkerId>> {
        let timeout_ms = self.config.load().timeout_millis();
        let mut state = self.state.write();
        let now = self.clock.now();

        let purged = state.purge_idle(now, timeout_ms);
        if purged.is_empty() {
            None
        } else {
            Some(purged)
        }
    }

    /// Returns `true` if `id` names an active worker.
    pub fn contains(&self, id: &WorkerId) -> bool {
        self.state.read().active.contains_key(id)
    }

    // --- Per-worker access ---

    /// Returns the worker payload. Does not count as use.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn get(&self, id: &WorkerId) -> PoolResult<Arc<W>> {
        self.with_entry(id, |entry| Arc::clone(&entry.worker))
    }

    /// Returns the client metadata the worker was registered with.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn client_info(&self, id: &WorkerId) -> PoolResult<Arc<C>> {
        self.with_entry(id, |entry| Arc::clone(&entry.client_info))
    }

    /// Records use of a worker at `timestamp` (wall-clock millis).
    ///
    /// Returns `true` if applied. Unknown identifiers are ignored, since
    /// keepalives routinely race with eviction.
    pub fn touch(&self, id: &WorkerId, timestamp: u64) -> bool {
        let mut state = self.state.write();
        if let Some(entry) = state.active.get_mut(id) {
            entry.touch(timestamp);
            true
        } else {
            trace!(worker_id = %id, "Ignoring touch of inactive worker");
            false
        }
    }

    /// Creation time of an active worker (wall-clock millis).
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn created_at(&self, id: &WorkerId) -> PoolResult<u64> {
        self.with_entry(id, |entry| entry.created_at)
    }

    /// Last recorded use of an active worker (wall-clock millis).
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn last_used_at(&self, id: &WorkerId) -> PoolResult<u64> {
        self.with_entry(id, |entry| entry.last_used_at)
    }

    // --- Message statistics ---

    /// Increments a worker's message count, returning the new count.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn increment_message_count(&self, id: &WorkerId) -> PoolResult<u64> {
        self.with_entry_mut(id, ActiveEntry::record_message)
    }

    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn message_count(&self, id: &WorkerId) -> PoolResult<u64> {
        self.with_entry(id, |entry| entry.message_count)
    }

    /// Messages per second since creation, measured up to now.
    ///
    /// Decays toward zero while the worker sits idle.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn current_average_message_rate(&self, id: &WorkerId) -> PoolResult<f64> {
        let state = self.state.read();
        let now = self.clock.now();
        state
            .active
            .get(id)
            .map(|entry| entry.current_rate(now))
            .ok_or_else(|| not_found(id))
    }

    /// Messages per second between creation and last use.
    ///
    /// Stable once the worker stops being touched.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn effective_average_message_rate(&self, id: &WorkerId) -> PoolResult<f64> {
        self.with_entry(id, ActiveEntry::effective_rate)
    }

    // --- Lineage ---

    /// Links a worker to the one it supersedes.
    ///
    /// The link is write-once: returns `false`, keeping the existing link, if
    /// one was already set.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn set_previous_id(&self, id: &WorkerId, previous: WorkerId) -> PoolResult<bool> {
        self.with_entry_mut(id, |entry| entry.link_previous(previous))
    }

    /// Returns the worker's lineage link, or `None` if it was never set.
    ///
    /// The link is only readable while the worker is active.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotFound` if `id` is not active.
    pub fn previous_id(&self, id: &WorkerId) -> PoolResult<Option<WorkerId>> {
        self.with_entry(id, |entry| entry.previous_id.clone())
    }

    // --- Configuration ---

    /// Returns the current configuration.
    pub fn config(&self) -> PoolConfig {
        PoolConfig::clone(&self.config.load())
    }

    pub fn capacity(&self) -> usize {
        self.config.load().capacity
    }

    /// Changes the capacity. Lowering it never evicts active workers;
    /// registrations fail until the population drops below the new limit.
    pub fn set_capacity(&self, capacity: usize) {
        self.config.rcu(|current| PoolConfig {
            capacity,
            ..PoolConfig::clone(current)
        });
    }

    pub fn timeout(&self) -> Duration {
        self.config.load().timeout
    }

    /// Changes the idle timeout; applies from the next register or purge.
    pub fn set_timeout(&self, timeout: Duration) {
        self.config.rcu(|current| PoolConfig {
            timeout,
            ..PoolConfig::clone(current)
        });
    }

    // --- Snapshots and counters ---

    /// Purges idle workers, then returns the client metadata of every
    /// remaining active worker.
    pub fn client_info_snapshot(&self) -> HashMap<WorkerId, Arc<C>> {
        let timeout_ms = self.config.load().timeout_millis();
        let mut state = self.state.write();
        let now = self.clock.now();

        state.purge_idle(now, timeout_ms);
        state
            .active
            .iter()
            .map(|(id, entry)| (id.clone(), Arc::clone(&entry.client_info)))
            .collect()
    }

    /// Number of currently active workers.
    pub fn active_count(&self) -> usize {
        self.state.read().active.len()
    }

    /// `capacity - active`, floored at zero.
    pub fn available_slots(&self) -> usize {
        let capacity = self.capacity();
        capacity.saturating_sub(self.active_count())
    }

    /// Total successful registrations over the life of the pool.
    pub fn ever_created_count(&self) -> u64 {
        self.state.read().ever_created
    }

    pub fn purged_count(&self) -> u64 {
        ledger_len(&self.state.read().purged)
    }

    pub fn removed_count(&self) -> u64 {
        ledger_len(&self.state.read().removed)
    }

    /// Copy of the purged ledger, oldest first.
    pub fn purged_entries(&self) -> Vec<RemovedEntry<C>> {
        self.state.read().purged.clone()
    }

    /// Copy of the removed ledger, oldest first.
    pub fn removed_entries(&self) -> Vec<RemovedEntry<C>> {
        self.state.read().removed.clone()
    }

    /// All counters from a single consistent read.
    pub fn stats(&self) -> PoolStats {
        let config = self.config.load();
        let state = self.state.read();
        PoolStats {
            active: state.active.len(),
            capacity: config.capacity,
            available_slots: config.capacity.saturating_sub(state.active.len()),
            timeout: config.timeout,
            ever_created: state.ever_created,
            purged: ledger_len(&state.purged),
            removed: ledger_len(&state.removed),
        }
    }

    // --- Internal helpers ---

    fn with_entry<R>(
        &self,
        id: &WorkerId,
        f: impl FnOnce(&ActiveEntry<W, C>) -> R,
    ) -> PoolResult<R> {
        self.state
            .read()
            .active
            .get(id)
            .map(f)
            .ok_or_else(|| not_found(id))
    }

    fn with_entry_mut<R>(
        &self,
        id: &WorkerId,
        f: impl FnOnce(&mut ActiveEntry<W, C>) -> R,
    ) -> PoolResult<R> {
        self.state
            .write()
            .active
            .get_mut(id)
            .map(f)
            .ok_or_else(|| not_found(id))
    }
}

fn ledger_len<C>(records: &[RemovedEntry<C>]) -> u64 {
    records.len() as u64
}

fn not_found(id: &WorkerId) -> PoolError {
    PoolError::NotFound { id: id.clone() }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
