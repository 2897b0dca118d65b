//! Time source for `modified` stamps.
//!
//! Every timestamp the engine writes comes from a [`Clock`], so tests can pin
//! the value and drift detection stays deterministic.

use crate::Timestamp;
use std::sync::atomic::{AtomicI64, Ordering};

/// A source of Unix timestamps in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock {
    seconds: AtomicI64,
}

impl FixedClock {
    /// Create a clock pinned at `seconds`.
    pub fn new(seconds: Timestamp) -> Self {
        Self {
            seconds: AtomicI64::new(seconds),
        }
    }

    /// Move the clock forward and return the new value.
    pub fn advance(&self, seconds: Timestamp) -> Timestamp {
        self.seconds.fetch_add(seconds, Ordering::SeqCst) + seconds
    }

    /// Pin the clock at a specific value.
    pub fn set(&self, seconds: Timestamp) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.seconds.load(Ordering::SeqCst)
    }
}
