#![forbid(unsafe_code)]

//! Fixed-window rate limiter shared by gestures, scroll settling and the
//! viewport throttle.
//!
//! A [`Cooldown`] is either idle or active until a deadline. Starting it
//! while idle succeeds; while active, further attempts are refused rather
//! than queued. The limiter never fires callbacks: callers compare against
//! the current time, typically from a `tick`.

use std::time::Duration;

/// A fixed-length window during which further starts are refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    window: Duration,
    until: Option<Duration>,
}

impl Cooldown {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            until: None,
        }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// `true` while the window started last is still open at `now`.
    #[must_use]
    pub fn is_active(&self, now: Duration) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Time left in the window, zero when idle.
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        self.until
            .map_or(Duration::ZERO, |until| until.saturating_sub(now))
    }

    /// Deadline of the open window, if any was started and not cleared.
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.until
    }

    /// Start the window if idle. Returns `false` (and changes nothing) while
    /// a window is open.
    pub fn try_begin(&mut self, now: Duration) -> bool {
        if self.is_active(now) {
            return false;
        }
        self.begin(now);
        true
    }

    /// Start (or restart) the window unconditionally.
    pub fn begin(&mut self, now: Duration) {
        self.until = Some(now.saturating_add(self.window));
    }

    /// Close the window. Returns `true` if one had been started.
    pub fn clear(&mut self) -> bool {
        self.until.take().is_some()
    }

    /// Forget an expired deadline. Returns `true` if the window elapsed
    /// since the last call.
    pub fn expire(&mut self, now: Duration) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }
}
