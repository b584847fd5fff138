//! Time source abstraction.
//!
//! History entries carry a wall-clock timestamp. Decoupling the clock lets the
//! simulation harness drive virtual time while production reads the system
//! clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock timestamps in milliseconds since the Unix epoch.
///
/// # Invariants
///
/// - Implementations used by a single controller should not go backwards;
///   history timestamps are expected to be non-decreasing.
pub trait Clock: Send + Sync + 'static {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Production clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a system clock.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}
