//! Time capability.

use time::OffsetDateTime;

/// Source of the current time as Unix seconds.
pub trait Clock: Send + Sync {
    /// Returns the current Unix timestamp in seconds.
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }
}

/// A clock frozen at a fixed Unix timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}
