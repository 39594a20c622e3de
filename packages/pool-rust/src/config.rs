//! Configuration types for the worker pool.

use std::time::Duration;

/// Admission and eviction settings for a [`WorkerPool`](crate::WorkerPool).
///
/// Both values can be changed on a live pool; changes apply to the next
/// register or purge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of simultaneously active workers.
    pub capacity: usize,
    /// Idle time after which a worker becomes eligible for purge.
    pub timeout: Duration,
}

impl PoolConfig {
    #[must_use]
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        Self { capacity, timeout }
    }

    /// Convenience constructor taking the timeout in milliseconds.
    #[must_use]
    pub fn from_millis(capacity: usize, timeout_ms: u64) -> Self {
        Self::new(capacity, Duration::from_millis(timeout_ms))
    }

    /// Timeout in whole milliseconds, saturating at `u64::MAX`.
    #[must_use]
    pub fn timeout_millis(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Settings for the background purge task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaperConfig {
    /// Time between purge sweeps.
    pub interval: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.capacity, 64);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn from_millis_matches_new() {
        assert_eq!(
            PoolConfig::from_millis(8, 4_000),
            PoolConfig::new(8, Duration::from_secs(4))
        );
    }

    #[test]
    fn timeout_millis_truncates_sub_millisecond_part() {
        let config = PoolConfig::new(1, Duration::from_micros(2_500));
        assert_eq!(config.timeout_millis(), 2);
    }

    #[test]
    fn timeout_millis_saturates() {
        let config = PoolConfig::new(1, Duration::MAX);
        assert_eq!(config.timeout_millis(), u64::MAX);
    }

    #[test]
    fn reaper_config_defaults() {
        assert_eq!(ReaperConfig::default().interval, Duration::from_secs(1));
    }
}
