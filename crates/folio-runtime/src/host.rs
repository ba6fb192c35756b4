#![forbid(unsafe_code)]

//! The page host: whatever owns the real section elements.
//!
//! The runtime never touches a DOM. Everything it needs from the page goes
//! through [`SectionHost`]: whether a section element exists yet, how to
//! scroll to it, how to observe visibility, and section geometry for the
//! initial probe. `folio-web` implements it over `web-sys`;
//! [`HeadlessHost`] is a recording implementation for tests and
//! non-browser rendering.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use folio_core::{SectionBounds, SectionId};
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// How a scroll should be animated.
///
/// `Instant` suits visitors who prefer reduced motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

impl ScrollBehavior {
    /// The CSS `scroll-behavior` keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Instant => "instant",
        }
    }
}

/// Access to the page's section elements.
pub trait SectionHost {
    /// `true` once the element for `id` exists and can be scrolled to.
    fn has_section(&self, id: &SectionId) -> bool;

    /// Scroll the element for `id` to the top of the viewport.
    fn scroll_to(&self, id: &SectionId, behavior: ScrollBehavior);

    /// Start observing visibility of `ids` at `threshold`.
    ///
    /// Returns `None` where observation is unavailable (server rendering,
    /// old browsers). Observation stops when the token is released.
    fn observe(&self, ids: &[SectionId], threshold: f64) -> Option<ObservationToken>;

    /// Bounds of the element for `id` relative to the viewport top.
    fn section_bounds(&self, id: &SectionId) -> Option<SectionBounds>;

    /// Viewport height in CSS pixels.
    fn viewport_height(&self) -> f64;
}

/// Handle to an active visibility observation; released on drop.
#[must_use = "dropping the token stops the observation"]
pub struct ObservationToken {
    release: Option<Box<dyn FnOnce()>>,
}

impl ObservationToken {
    /// Token that runs `release` exactly once when the observation ends.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Stop observing. Idempotent.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for ObservationToken {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ObservationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationToken")
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// HeadlessHost
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct HeadlessState {
    present: Vec<SectionId>,
    bounds: HashMap<SectionId, SectionBounds>,
    viewport_height: f64,
    observation_available: bool,
    observing: usize,
    observe_calls: usize,
    scrolls: Vec<(SectionId, ScrollBehavior)>,
}

/// In-memory host that records scrolls.
///
/// Clones share state, so a test can keep one handle while the pager owns
/// another.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    /// Host where every id in `present` already has an element.
    pub fn new<I, S>(present: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SectionId>,
    {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                present: present.into_iter().map(Into::into).collect(),
                bounds: HashMap::new(),
                viewport_height: 0.0,
                observation_available: true,
                observing: 0,
                observe_calls: 0,
                scrolls: Vec::new(),
            })),
        }
    }

    /// Host with no section elements yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(std::iter::empty::<SectionId>())
    }

    /// Make `observe` return `None`, as during server rendering.
    #[must_use]
    pub fn without_observation(self) -> Self {
        self.state.borrow_mut().observation_available = false;
        self
    }

    pub fn insert_section(&self, id: impl Into<SectionId>) {
        let id = id.into();
        let mut state = self.state.borrow_mut();
        if !state.present.contains(&id) {
            state.present.push(id);
        }
    }

    pub fn remove_section(&self, id: &str) {
        self.state.borrow_mut().present.retain(|p| *p != *id);
    }

    pub fn set_bounds(&self, id: impl Into<SectionId>, bounds: SectionBounds) {
        self.state.borrow_mut().bounds.insert(id.into(), bounds);
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.state.borrow_mut().viewport_height = height;
    }

    /// Lay sections out back to back, each one viewport tall, scrolled so
    /// that `visible` sits exactly in the viewport.
    pub fn stack_sections(&self, ids: &[&str], viewport_height: f64, visible: usize) {
        self.set_viewport_height(viewport_height);
        for (idx, id) in ids.iter().enumerate() {
            let top = (idx as f64 - visible as f64) * viewport_height;
            self.set_bounds(*id, SectionBounds::new(top, viewport_height));
        }
    }

    /// Every scroll performed so far, oldest first.
    #[must_use]
    pub fn scrolls(&self) -> Vec<(SectionId, ScrollBehavior)> {
        self.state.borrow().scrolls.clone()
    }

    /// Ids scrolled to so far, oldest first.
    #[must_use]
    pub fn scroll_targets(&self) -> Vec<String> {
        self.state
            .borrow()
            .scrolls
            .iter()
            .map(|(id, _)| id.to_string())
            .collect()
    }

    /// Number of observations currently held.
    #[must_use]
    pub fn observing(&self) -> usize {
        self.state.borrow().observing
    }

    /// Number of times `observe` was called.
    #[must_use]
    pub fn observe_calls(&self) -> usize {
        self.state.borrow().observe_calls
    }
}

impl SectionHost for HeadlessHost {
    fn has_section(&self, id: &SectionId) -> bool {
        self.state.borrow().present.contains(id)
    }

    fn scroll_to(&self, id: &SectionId, behavior: ScrollBehavior) {
        self.state.borrow_mut().scrolls.push((id.clone(), behavior));
    }

    fn observe(&self, _ids: &[SectionId], _threshold: f64) -> Option<ObservationToken> {
        let mut state = self.state.borrow_mut();
        state.observe_calls += 1;
        if !state.observation_available {
            return None;
        }
        state.observing += 1;
        let shared = Rc::clone(&self.state);
        Some(ObservationToken::new(move || {
            let mut state = shared.borrow_mut();
            state.observing = state.observing.saturating_sub(1);
        }))
    }

    fn section_bounds(&self, id: &SectionId) -> Option<SectionBounds> {
        self.state.borrow().bounds.get(id).copied()
    }

    fn viewport_height(&self) -> f64 {
        self.state.borrow().viewport_height
    }
}
