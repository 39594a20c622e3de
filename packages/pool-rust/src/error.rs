use workerpool_core::WorkerId;

/// Errors returned by per-worker accessors.
///
/// Only lookups that expect a live worker fail. Capacity exhaustion, and
/// removing or touching an unknown worker, are reported through plain return
/// values instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The identifier was never issued, or its worker was already removed or purged.
    #[error("worker not found: {id}")]
    NotFound { id: WorkerId },
}

pub type PoolResult<T> = Result<T, PoolError>;
