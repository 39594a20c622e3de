//! Background task that purges idle workers on a fixed interval.
//!
//! The pool purges lazily on `register` and `client_info_snapshot`; a service
//! that wants idle workers released even when nobody registers runs a reaper
//! alongside it. The task holds only a `Weak` handle, so it never keeps a
//! pool alive, and stops on the first of: shutdown signal, controller
//! dropped, pool dropped.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::ReaperConfig;
use crate::pool::WorkerPool;

/// Owns the shutdown signal for one or more reapers.
#[derive(Debug)]
pub struct ReaperController {
    shutdown_signal: watch::Sender<bool>,
}

impl ReaperController {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shutdown_signal: tx,
        }
    }

    /// Returns a receiver to pass to [`spawn_reaper`].
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Signals every reaper subscribed to this controller to stop.
    pub fn trigger_shutdown(&self) {
        // Ignore send errors -- reapers may already have exited
        let _ = self.shutdown_signal.send(true);
    }
}

impl Default for ReaperController {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns a task on the current tokio runtime that calls
/// [`WorkerPool::purge`] every `config.interval`.
///
/// The first sweep runs immediately.
pub fn spawn_reaper<W, C>(
    pool: &Arc<WorkerPool<W, C>>,
    config: ReaperConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    W: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    let pool = Arc::downgrade(pool);
    // tokio::time::interval panics on a zero period
    let period = config.interval.max(Duration::from_millis(1));
    tokio::spawn(run_reaper(pool, period, shutdown))
}

async fn run_reaper<W, C>(
    pool: Weak<WorkerPool<W, C>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    W: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow() {
            debug!("Reaper received shutdown signal");
            return;
        }

        tokio::select! {
            _ = ticker.tick() => {
                let Some(pool) = pool.upgrade() else {
                    debug!("Worker pool dropped; reaper exiting");
                    return;
                };
                pool.purge();
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    debug!("Reaper controller dropped; reaper exiting");
                    return;
                }
            }
        }
    }
}
