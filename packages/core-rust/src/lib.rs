//! Worker pool core: identifiers, clock sources, and client metadata shared
//! between the registry and its callers.

pub mod client;
pub mod clock;
pub mod id;

pub use client::{ClientTypeMajor, ClientTypeMinor, WorkerClientInfo};
pub use clock::{ClockSource, ManualClock, SystemClock};
pub use id::WorkerId;

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
