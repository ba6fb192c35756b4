#![forbid(unsafe_code)]

//! Gesture translation: wheel and touch input into discrete section steps.
//!
//! [`GestureTranslator`] is a stateful processor that turns raw wheel deltas
//! and touch start/end positions into at most one [`SectionStep`] per
//! gesture. It never produces partial scrolls: every accepted gesture moves
//! exactly one section.
//!
//! # State Machine
//!
//! - **Cooldown**: after an accepted step, all further gestures are
//!   discarded (not queued) until the cooldown window elapses. The window is
//!   longer than the scroll settle time so one deliberate wheel flick cannot
//!   move two sections.
//! - **Touch tracker**: remembers the Y coordinate of the last touch start.
//!   A touch end compares against it; travel beyond the swipe threshold is a
//!   step.
//!
//! # Invariants
//!
//! 1. At most one step is produced per cooldown window.
//! 2. A step never targets an index outside `0..len`; out-of-bounds
//!    gestures produce nothing and do not start the cooldown.
//! 3. While the caller reports `busy` (a scroll is in flight), every gesture
//!    is discarded.
//! 4. A touch end with no recorded start produces nothing.

use std::time::Duration;

use tracing::trace;

use crate::cooldown::Cooldown;
use crate::section::Direction;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds and timeouts for gesture translation.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Window after an accepted gesture during which input is discarded
    /// (default: 900ms).
    pub cooldown: Duration,
    /// Minimum vertical travel in CSS pixels for a swipe (default: 50).
    pub swipe_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(900),
            swipe_threshold: 50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Raw gesture input, already reduced to the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    /// A wheel event; positive `delta_y` scrolls towards later sections.
    Wheel { delta_y: f64 },
    /// First finger down at client Y.
    TouchStart { y: f64 },
    /// Last finger up at client Y.
    TouchEnd { y: f64 },
    /// The touch sequence was interrupted by the platform.
    TouchCancel,
}

/// Where the page currently is, supplied by the caller on each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureContext {
    /// Index of the active section.
    pub index: usize,
    /// Number of sections.
    pub len: usize,
    /// A scroll animation is in flight.
    pub busy: bool,
}

/// An accepted one-section step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionStep {
    pub direction: Direction,
    /// Index to scroll to.
    pub target: usize,
}

// ---------------------------------------------------------------------------
// GestureTranslator
// ---------------------------------------------------------------------------

/// Stateful translator from gestures to section steps.
#[derive(Debug, Clone)]
pub struct GestureTranslator {
    config: GestureConfig,
    cooldown: Cooldown,
    touch_start_y: Option<f64>,
}

impl GestureTranslator {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        let cooldown = Cooldown::new(config.cooldown);
        Self {
            config,
            cooldown,
            touch_start_y: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// `true` while gestures are being discarded.
    #[must_use]
    pub fn is_cooling_down(&self, now: Duration) -> bool {
        self.cooldown.is_active(now)
    }

    /// Process one input. Returns the step to perform, if any.
    pub fn process(
        &mut self,
        input: GestureInput,
        ctx: GestureContext,
        now: Duration,
    ) -> Option<SectionStep> {
        let direction = match input {
            GestureInput::Wheel { delta_y } => Direction::from_delta(delta_y)?,
            GestureInput::TouchStart { y } => {
                self.touch_start_y = Some(y);
                return None;
            }
            GestureInput::TouchEnd { y } => {
                let start = self.touch_start_y.take()?;
                let travel = start - y;
                if travel.abs() <= self.config.swipe_threshold {
                    trace!(travel, "swipe below threshold");
                    return None;
                }
                // Finger moving up (positive travel) reveals the next section.
                Direction::from_delta(travel)?
            }
            GestureInput::TouchCancel => {
                self.touch_start_y = None;
                return None;
            }
        };

        if ctx.busy || self.cooldown.is_active(now) {
            trace!(?direction, busy = ctx.busy, "gesture discarded");
            return None;
        }

        let target = step_index(ctx.index, ctx.len, direction)?;
        self.cooldown.begin(now);
        Some(SectionStep { direction, target })
    }

    /// Drop an elapsed cooldown. Returns `true` when the window just closed.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.cooldown.expire(now)
    }

    /// Return to the initial idle state.
    pub fn reset(&mut self) {
        self.cooldown.clear();
        self.touch_start_y = None;
    }
}

impl Default for GestureTranslator {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

fn step_index(index: usize, len: usize, direction: Direction) -> Option<usize> {
    let target = match direction {
        Direction::Next => index.checked_add(1)?,
        Direction::Previous => index.checked_sub(1)?,
    };
    (target < len).then_some(target)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn at(index: usize) -> GestureContext {
        GestureContext {
            index,
            len: 5,
            busy: false,
        }
    }

    fn wheel(delta_y: f64) -> GestureInput {
        GestureInput::Wheel { delta_y }
    }

    #[test]
    fn wheel_down_steps_next() {
        let mut g = GestureTranslator::default();
        let step = g.process(wheel(120.0), at(0), ms(0)).unwrap();
        assert_eq!(step.direction, Direction::Next);
        assert_eq!(step.target, 1);
    }

    #[test]
    fn wheel_up_steps_previous() {
        let mut g = GestureTranslator::default();
        let step = g.process(wheel(-3.0), at(2), ms(0)).unwrap();
        assert_eq!(step.direction, Direction::Previous);
        assert_eq!(step.target, 1);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut g = GestureTranslator::default();
        assert_eq!(g.process(wheel(0.0), at(2), ms(0)), None);
        assert!(!g.is_cooling_down(ms(0)));
    }

    #[test]
    fn burst_within_cooldown_yields_one_step() {
        let mut g = GestureTranslator::default();
        let mut steps = Vec::new();
        for i in 0..20 {
            if let Some(step) = g.process(wheel(100.0), at(0), ms(i * 10)) {
                steps.push(step);
            }
        }
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].target, 1);
    }

    #[test]
    fn cooldown_releases_after_window() {
        let mut g = GestureTranslator::default();
        assert!(g.process(wheel(1.0), at(0), ms(0)).is_some());
        assert!(g.process(wheel(1.0), at(1), ms(899)).is_none());
        assert!(g.process(wheel(1.0), at(1), ms(900)).is_some());
    }

    #[test]
    fn out_of_bounds_does_not_start_cooldown() {
        let mut g = GestureTranslator::default();
        assert_eq!(g.process(wheel(1.0), at(4), ms(0)), None);
        assert_eq!(g.process(wheel(-1.0), at(0), ms(0)), None);
        assert!(!g.is_cooling_down(ms(0)));
        // An in-bounds gesture right after is still accepted.
        assert!(g.process(wheel(-1.0), at(4), ms(1)).is_some());
    }

    #[test]
    fn busy_discards_without_queueing() {
        let mut g = GestureTranslator::default();
        let busy = GestureContext {
            busy: true,
            ..at(0)
        };
        assert_eq!(g.process(wheel(1.0), busy, ms(0)), None);
        assert!(!g.is_cooling_down(ms(0)));
        assert!(g.process(wheel(1.0), at(0), ms(1)).is_some());
    }

    #[test]
    fn swipe_up_steps_next() {
        let mut g = GestureTranslator::default();
        assert_eq!(g.process(GestureInput::TouchStart { y: 400.0 }, at(1), ms(0)), None);
        let step = g
            .process(GestureInput::TouchEnd { y: 300.0 }, at(1), ms(50))
            .unwrap();
        assert_eq!(step.direction, Direction::Next);
        assert_eq!(step.target, 2);
    }

    #[test]
    fn swipe_down_steps_previous() {
        let mut g = GestureTranslator::default();
        g.process(GestureInput::TouchStart { y: 100.0 }, at(1), ms(0));
        let step = g
            .process(GestureInput::TouchEnd { y: 260.0 }, at(1), ms(50))
            .unwrap();
        assert_eq!(step.direction, Direction::Previous);
        assert_eq!(step.target, 0);
    }

    #[test]
    fn short_swipe_is_ignored() {
        let mut g = GestureTranslator::default();
        g.process(GestureInput::TouchStart { y: 100.0 }, at(1), ms(0));
        assert_eq!(g.process(GestureInput::TouchEnd { y: 150.0 }, at(1), ms(10)), None);
    }

    #[test]
    fn touch_end_without_start_is_ignored() {
        let mut g = GestureTranslator::default();
        assert_eq!(g.process(GestureInput::TouchEnd { y: 0.0 }, at(1), ms(0)), None);
    }

    #[test]
    fn touch_cancel_forgets_start() {
        let mut g = GestureTranslator::default();
        g.process(GestureInput::TouchStart { y: 500.0 }, at(1), ms(0));
        g.process(GestureInput::TouchCancel, at(1), ms(1));
        assert_eq!(g.process(GestureInput::TouchEnd { y: 0.0 }, at(1), ms(2)), None);
    }

    #[test]
    fn swipe_shares_cooldown_with_wheel() {
        let mut g = GestureTranslator::default();
        assert!(g.process(wheel(1.0), at(0), ms(0)).is_some());
        g.process(GestureInput::TouchStart { y: 400.0 }, at(1), ms(10));
        assert_eq!(g.process(GestureInput::TouchEnd { y: 0.0 }, at(1), ms(20)), None);
    }

    #[test]
    fn reset_clears_cooldown() {
        let mut g = GestureTranslator::default();
        assert!(g.process(wheel(1.0), at(0), ms(0)).is_some());
        g.reset();
        assert!(g.process(wheel(1.0), at(1), ms(1)).is_some());
    }

    #[test]
    fn tick_reports_expiry_once() {
        let mut g = GestureTranslator::default();
        g.process(wheel(1.0), at(0), ms(0));
        assert!(!g.tick(ms(500)));
        assert!(g.tick(ms(900)));
        assert!(!g.tick(ms(1000)));
    }
}
