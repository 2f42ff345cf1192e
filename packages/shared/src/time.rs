//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Duration, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given instant
    pub fn new(fixed_time: DateTime<Utc>) -> Self {
        Self { fixed_time }
    }

    /// Create a new fixed clock from a Unix timestamp in milliseconds.
    ///
    /// Out-of-range timestamps fall back to the Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self::new(
            DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        )
    }

    /// Return a clock advanced by `offset`
    pub fn advanced_by(&self, offset: Duration) -> Self {
        Self::new(self.fixed_time + offset)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.fixed_time
    }
}

/// Format an instant as an HTTP date (`Thu, 01 Jan 1970 00:00:00 GMT`), as used by
/// the `Expires` cookie attribute.
pub fn to_http_date(instant: DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
