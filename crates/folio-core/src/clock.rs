#![forbid(unsafe_code)]

//! Monotonic time sources.
//!
//! Every stateful component reads time through [`MonotonicClock`] instead of
//! calling `Instant::now()` itself, so the host decides how time advances:
//! the browser feeds real time, tests advance a [`ManualClock`] by hand.
//! Timestamps are `Duration`s since an arbitrary, fixed origin.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

/// A monotonic clock.
pub trait MonotonicClock {
    /// Current time since the clock's origin. Never decreases.
    fn now_mono(&self) -> Duration;
}

/// Wall-clock backed source; works on native and `wasm32-unknown-unknown`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Create a clock at `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current time. Values earlier than the current time are ignored.
    pub fn set(&self, now: Duration) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }

    /// Advance time by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get().saturating_add(dt));
    }

    /// Advance time by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl MonotonicClock for ManualClock {
    fn now_mono(&self) -> Duration {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance_ms(40);
        assert_eq!(other.now_mono(), Duration::from_millis(40));
    }

    #[test]
    fn manual_clock_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.set(Duration::from_millis(100));
        clock.set(Duration::from_millis(50));
        assert_eq!(clock.now_mono(), Duration::from_millis(100));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_mono();
        let b = clock.now_mono();
        assert!(b >= a);
    }
}
