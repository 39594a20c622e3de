//! Worker pool: a bounded, idle-evicting, thread-safe registry of leased
//! worker handles with per-worker usage statistics.

pub mod config;
pub mod entry;
pub mod error;
pub mod pool;
pub mod reaper;

pub use config::{PoolConfig, ReaperConfig};
pub use entry::{PoolStats, RemovalCause, RemovedEntry};
pub use error::{PoolError, PoolResult};
pub use pool::WorkerPool;
pub use reaper::{spawn_reaper, ReaperController};
pub use workerpool_core::{ClockSource, ManualClock, SystemClock, WorkerClientInfo, WorkerId};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
