#![forbid(unsafe_code)]

//! Viewport observer: reports the section the user is actually looking at.
//!
//! The host streams intersection ratios; the observer keeps the latest ratio
//! per section and reports the most visible one to the store. It only ever
//! calls `set_active`; it never requests scrolls, so it cannot start a
//! feedback loop with the executor.
//!
//! # Throttle
//!
//! A new candidate is applied immediately if the throttle window is idle.
//! Otherwise it is parked and re-evaluated on [`ViewportObserver::tick`]
//! once the window closes (trailing edge), so a section that stays visible
//! is always reported eventually.
//!
//! # Suppression
//!
//! While the executor is scrolling, intersection updates describe the
//! animation rather than the user's choice. They are recorded but not
//! reported until the scroll settles.
//!
//! # Initial probe
//!
//! An element already on screen at mount may never produce an intersection
//! callback. After `initial_probe_delay` the observer measures section
//! bounds once and reports the section whose midpoint sits in the central
//! band of the viewport, or the first section if none does. The probe is
//! skipped when the user or a deep link already asked for a section.

use std::rc::Rc;
use std::time::Duration;

use folio_core::visibility::section_in_band;
use folio_core::{Band, Cooldown, IntersectionEntry, SectionId, VisibilityMap};
use tracing::{debug, trace};

use crate::config::PagerConfig;
use crate::host::{ObservationToken, SectionHost};
use crate::store::ActiveSectionStore;

/// What the rest of the page is doing, supplied on each call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverContext {
    /// A scroll animation is in flight.
    pub scrolling: bool,
    /// A section was explicitly requested since mount.
    pub explicit_request: bool,
}

/// Throttled intersection-driven reporter of the active section.
pub struct ViewportObserver {
    store: ActiveSectionStore,
    host: Rc<dyn SectionHost>,
    map: VisibilityMap,
    threshold: f64,
    band: Band,
    throttle: Cooldown,
    parked: bool,
    probe_at: Option<Duration>,
    token: Option<ObservationToken>,
}

impl ViewportObserver {
    /// Ask the host to observe every section.
    ///
    /// Returns `None` when the host cannot observe visibility.
    pub fn start(
        store: ActiveSectionStore,
        host: Rc<dyn SectionHost>,
        config: &PagerConfig,
        now: Duration,
    ) -> Option<Self> {
        let ids: Vec<SectionId> = store.sections().ids().cloned().collect();
        let threshold = config.viewport.threshold;
        let Some(token) = host.observe(&ids, threshold) else {
            debug!(target: "folio.viewport", "visibility observation unavailable, observer disabled");
            return None;
        };
        debug!(target: "folio.viewport", sections = ids.len(), threshold, "observing");
        let map = VisibilityMap::new(store.sections());
        Some(Self {
            store,
            host,
            map,
            threshold,
            band: config.band(),
            throttle: Cooldown::new(config.observer_throttle()),
            parked: false,
            probe_at: Some(now.saturating_add(config.initial_probe_delay())),
            token: Some(token),
        })
    }

    /// `true` until [`disconnect`](Self::disconnect) is called.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.token.as_ref().is_some_and(ObservationToken::is_active)
    }

    /// A candidate is waiting for the throttle or the scroll to finish.
    #[must_use]
    pub fn has_parked(&self) -> bool {
        self.parked
    }

    /// Probe deadline, while the probe has not run.
    #[must_use]
    pub fn probe_at(&self) -> Option<Duration> {
        self.probe_at
    }

    /// Record a batch of intersection entries and report if allowed.
    pub fn record(&mut self, entries: &[IntersectionEntry], ctx: ObserverContext, now: Duration) {
        if !self.is_connected() {
            return;
        }
        for entry in entries {
            if !self.map.record(entry) {
                trace!(target: "folio.viewport", id = %entry.id, "entry for unknown section");
            }
        }
        self.evaluate(ctx, now);
    }

    /// Run the initial probe when due and release a parked candidate once
    /// the throttle window and any scroll are over.
    pub fn tick(&mut self, ctx: ObserverContext, now: Duration) {
        if !self.is_connected() {
            return;
        }
        self.throttle.expire(now);
        if self.probe_at.is_some_and(|at| now >= at) && !ctx.scrolling {
            self.probe_at = None;
            if ctx.explicit_request {
                debug!(target: "folio.viewport", "initial probe skipped, section already requested");
            } else {
                self.probe();
            }
        }
        if self.parked {
            self.evaluate(ctx, now);
        }
    }

    /// Stop observing and release the host observation.
    pub fn disconnect(&mut self) {
        if let Some(mut token) = self.token.take() {
            token.release();
            debug!(target: "folio.viewport", "disconnected");
        }
        self.parked = false;
        self.probe_at = None;
        self.map.clear();
    }

    fn evaluate(&mut self, ctx: ObserverContext, now: Duration) {
        if ctx.scrolling {
            self.parked = true;
            return;
        }
        let Some(candidate) = self.map.candidate(self.threshold).cloned() else {
            self.parked = false;
            return;
        };
        if candidate == self.store.active_id() {
            self.parked = false;
            return;
        }
        if self.throttle.try_begin(now) {
            self.parked = false;
            debug!(target: "folio.viewport", id = %candidate, "visible section changed");
            self.store.set_active(candidate.as_str());
        } else {
            trace!(target: "folio.viewport", id = %candidate, "throttled, parking candidate");
            self.parked = true;
        }
    }

    fn probe(&mut self) {
        let sections = self.store.sections();
        let viewport_height = self.host.viewport_height();
        let host = &self.host;
        let found = section_in_band(sections, viewport_height, self.band, |id| {
            host.section_bounds(id)
        })
        .cloned();
        let target = found.unwrap_or_else(|| sections.first().id.clone());
        debug!(target: "folio.viewport", id = %target, "initial probe");
        self.store.set_active(target.as_str());
    }
}

impl Drop for ViewportObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for ViewportObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportObserver")
            .field("threshold", &self.threshold)
            .field("parked", &self.parked)
            .field("probe_at", &self.probe_at)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
