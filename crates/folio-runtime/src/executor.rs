#![forbid(unsafe_code)]

//! Scroll executor: turns scroll requests into smooth scrolls, one at a time.
//!
//! # State Machine
//!
//! ```text
//!            request(x)            mark_ready
//! NotReady ───────────▶ NotReady ─────────────▶ Scrolling(target)
//! {pending}   pending=x                               │  ▲
//!                                       settle elapsed │  │ request(x)
//!                                                      ▼  │
//!                                                      Idle
//! ```
//!
//! - **NotReady**: section elements do not exist yet. Requests are buffered
//!   in a single slot; the latest one wins.
//! - **Idle**: a request starts a scroll immediately.
//! - **Scrolling**: the settle window is open. A new request replaces any
//!   queued one and starts once the window closes.
//!
//! # Invariants
//!
//! 1. The store is updated before the host starts the animation.
//! 2. The pending buffer is consumed exactly once, inside [`mark_ready`].
//! 3. At most one scroll is in flight and at most one is queued.
//! 4. Unknown ids never change the phase.
//!
//! # Failure Modes
//!
//! - **Element missing when a scroll begins**: the executor drops back to
//!   NotReady with the target buffered; [`retry_pending`] resumes once the
//!   element appears.
//!
//! [`mark_ready`]: ScrollExecutor::mark_ready
//! [`retry_pending`]: ScrollExecutor::retry_pending

use std::rc::Rc;
use std::time::Duration;

use folio_core::{Cooldown, SectionId};
use tracing::{debug, info, warn};

use crate::host::{ScrollBehavior, SectionHost};
use crate::store::ActiveSectionStore;

/// Current executor phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorPhase {
    /// Section elements are not available; holds the latest request.
    NotReady { pending: Option<SectionId> },
    /// Ready and not scrolling.
    Idle,
    /// A scroll to `target` is settling; `queued` starts next.
    Scrolling {
        target: SectionId,
        queued: Option<SectionId>,
    },
}

impl ExecutorPhase {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotReady { .. } => "not_ready",
            Self::Idle => "idle",
            Self::Scrolling { .. } => "scrolling",
        }
    }
}

/// Single-flight scroll driver.
pub struct ScrollExecutor {
    store: ActiveSectionStore,
    host: Rc<dyn SectionHost>,
    settle: Cooldown,
    behavior: ScrollBehavior,
    phase: ExecutorPhase,
    /// Set by `mark_ready`, cleared by `reset`.
    mounted: bool,
}

impl ScrollExecutor {
    #[must_use]
    pub fn new(store: ActiveSectionStore, host: Rc<dyn SectionHost>, settle: Duration) -> Self {
        Self {
            store,
            host,
            settle: Cooldown::new(settle),
            behavior: ScrollBehavior::default(),
            phase: ExecutorPhase::NotReady { pending: None },
            mounted: false,
        }
    }

    /// Animate scrolls with `behavior` instead of smooth scrolling.
    #[must_use]
    pub fn with_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    #[must_use]
    pub fn phase(&self) -> &ExecutorPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        !matches!(self.phase, ExecutorPhase::NotReady { .. })
    }

    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        matches!(self.phase, ExecutorPhase::Scrolling { .. })
    }

    /// Buffered request while not ready.
    #[must_use]
    pub fn pending(&self) -> Option<&SectionId> {
        match &self.phase {
            ExecutorPhase::NotReady { pending } => pending.as_ref(),
            _ => None,
        }
    }

    /// Handle a scroll request.
    ///
    /// A settle window that has already elapsed is closed first, so the
    /// request does not wait for the next [`tick`](Self::tick).
    pub fn request(&mut self, id: &SectionId, now: Duration) {
        if !self.store.sections().contains(id.as_str()) {
            warn!(target: "folio.executor", %id, "scroll request for unknown section");
            return;
        }
        self.tick(now);
        match &mut self.phase {
            ExecutorPhase::NotReady { pending } => {
                debug!(target: "folio.executor", %id, "buffering request until ready");
                *pending = Some(id.clone());
            }
            ExecutorPhase::Idle => self.begin(id.clone(), now),
            ExecutorPhase::Scrolling { queued, .. } => {
                debug!(target: "folio.executor", %id, "queueing request behind scroll");
                *queued = Some(id.clone());
            }
        }
    }

    /// Enter the ready state and start the first scroll.
    ///
    /// The target is the buffered request if any, else `initial` if it names
    /// a known section, else the first section. No-op when already ready.
    /// Returns the id scrolled to.
    pub fn mark_ready(&mut self, initial: Option<&SectionId>, now: Duration) -> Option<SectionId> {
        let ExecutorPhase::NotReady { pending } = &mut self.phase else {
            return None;
        };
        let sections = self.store.sections();
        let target = pending
            .take()
            .or_else(|| initial.filter(|id| sections.contains(id.as_str())).cloned())
            .unwrap_or_else(|| sections.first().id.clone());
        info!(target: "folio.executor", %target, "ready");
        self.mounted = true;
        self.phase = ExecutorPhase::Idle;
        self.begin(target.clone(), now);
        self.is_scrolling().then_some(target)
    }

    /// Resume a buffered scroll whose element was missing, once it exists.
    ///
    /// Only applies after a failed begin; a never-readied executor still
    /// waits for [`mark_ready`](Self::mark_ready).
    pub fn retry_pending(&mut self, now: Duration) -> bool {
        let ready_to_retry = self.mounted
            && self
                .pending()
                .is_some_and(|id| self.host.has_section(id));
        if ready_to_retry {
            self.mark_ready(None, now);
        }
        ready_to_retry
    }

    /// Close an elapsed settle window and start the queued request, if any.
    /// Returns `true` when a scroll finished.
    pub fn tick(&mut self, now: Duration) -> bool {
        if !self.is_scrolling() || self.settle.is_active(now) {
            return false;
        }
        self.settle.clear();
        let previous = std::mem::replace(&mut self.phase, ExecutorPhase::Idle);
        if let ExecutorPhase::Scrolling { target, queued } = previous {
            debug!(target: "folio.executor", %target, "scroll settled");
            if let Some(next) = queued {
                self.begin(next, now);
            }
        }
        true
    }

    /// Return to NotReady, dropping any queued or buffered request.
    pub fn reset(&mut self) {
        self.settle.clear();
        self.mounted = false;
        self.phase = ExecutorPhase::NotReady { pending: None };
        info!(target: "folio.executor", "reset to not ready");
    }

    fn begin(&mut self, target: SectionId, now: Duration) {
        if !self.host.has_section(&target) {
            info!(target: "folio.executor", %target, "section element missing, buffering");
            self.phase = ExecutorPhase::NotReady {
                pending: Some(target),
            };
            return;
        }
        self.store.set_active(target.as_str());
        self.host.scroll_to(&target, self.behavior);
        self.settle.begin(now);
        info!(
            target: "folio.executor",
            %target,
            behavior = self.behavior.as_str(),
            "scrolling"
        );
        self.phase = ExecutorPhase::Scrolling {
            target,
            queued: None,
        };
    }
}

impl std::fmt::Debug for ScrollExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollExecutor")
            .field("phase", &self.phase)
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use folio_core::SectionSequence;

    const IDS: [&str; 4] = ["hero", "about", "skills", "contact"];

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn setup(host: HeadlessHost) -> (ScrollExecutor, ActiveSectionStore) {
        let store = ActiveSectionStore::new(SectionSequence::from_ids(IDS).unwrap());
        let exec = ScrollExecutor::new(store.clone(), Rc::new(host), ms(250));
        (exec, store)
    }

    fn id(s: &str) -> SectionId {
        SectionId::new(s)
    }

    #[test]
    fn starts_not_ready() {
        let (exec, _) = setup(HeadlessHost::new(IDS));
        assert_eq!(exec.phase(), &ExecutorPhase::NotReady { pending: None });
        assert!(!exec.is_ready());
    }

    #[test]
    fn pending_is_last_wins_and_consumed_on_ready() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, store) = setup(host.clone());
        exec.request(&id("about"), ms(0));
        exec.request(&id("skills"), ms(1));
        assert_eq!(exec.pending(), Some(&id("skills")));
        assert!(host.scrolls().is_empty());

        assert_eq!(exec.mark_ready(Some(&id("contact")), ms(2)), Some(id("skills")));
        assert_eq!(host.scroll_targets(), vec!["skills"]);
        assert_eq!(store.active_id(), "skills");
        assert_eq!(exec.pending(), None);
    }

    #[test]
    fn ready_uses_initial_then_first() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, _) = setup(host.clone());
        exec.mark_ready(Some(&id("contact")), ms(0));
        assert_eq!(host.scroll_targets(), vec!["contact"]);

        let host = HeadlessHost::new(IDS);
        let (mut exec, _) = setup(host.clone());
        exec.mark_ready(Some(&id("legal")), ms(0));
        assert_eq!(host.scroll_targets(), vec!["hero"]);
    }

    #[test]
    fn mark_ready_twice_is_noop() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, _) = setup(host.clone());
        exec.mark_ready(None, ms(0));
        assert_eq!(exec.mark_ready(Some(&id("about")), ms(1)), None);
        assert_eq!(host.scrolls().len(), 1);
    }

    #[test]
    fn store_updated_before_scroll_and_settles() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, store) = setup(host.clone());
        exec.mark_ready(None, ms(0));
        exec.tick(ms(250));
        exec.request(&id("about"), ms(300));
        assert_eq!(store.active_id(), "about");
        assert!(exec.is_scrolling());
        assert!(!exec.tick(ms(549)));
        assert!(exec.tick(ms(550)));
        assert_eq!(exec.phase(), &ExecutorPhase::Idle);
    }

    #[test]
    fn requests_during_scroll_coalesce_to_latest() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, store) = setup(host.clone());
        exec.mark_ready(None, ms(0));
        exec.request(&id("about"), ms(10));
        exec.request(&id("skills"), ms(20));
        exec.request(&id("contact"), ms(30));
        assert_eq!(store.active_id(), "hero");

        exec.tick(ms(250));
        assert_eq!(host.scroll_targets(), vec!["hero", "contact"]);
        assert_eq!(store.active_id(), "contact");
        assert!(exec.is_scrolling());
    }

    #[test]
    fn request_after_elapsed_window_starts_without_tick() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, store) = setup(host.clone());
        exec.mark_ready(None, ms(0));
        exec.request(&id("skills"), ms(1000));
        assert_eq!(host.scroll_targets(), vec!["hero", "skills"]);
        assert_eq!(store.active_id(), "skills");
        assert_eq!(
            exec.phase(),
            &ExecutorPhase::Scrolling {
                target: id("skills"),
                queued: None
            }
        );
    }

    #[test]
    fn elapsed_window_starts_queued_before_new_request() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, _) = setup(host.clone());
        exec.mark_ready(None, ms(0));
        exec.request(&id("about"), ms(100));
        exec.request(&id("contact"), ms(300));
        assert_eq!(host.scroll_targets(), vec!["hero", "about"]);
        assert_eq!(
            exec.phase(),
            &ExecutorPhase::Scrolling {
                target: id("about"),
                queued: Some(id("contact"))
            }
        );
    }

    #[test]
    fn configured_behavior_reaches_host() {
        let host = HeadlessHost::new(IDS);
        let store = ActiveSectionStore::new(SectionSequence::from_ids(IDS).unwrap());
        let mut exec = ScrollExecutor::new(store, Rc::new(host.clone()), ms(250))
            .with_behavior(ScrollBehavior::Instant);
        exec.mark_ready(None, ms(0));
        assert_eq!(host.scrolls()[0].1, ScrollBehavior::Instant);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, _) = setup(host.clone());
        exec.request(&id("legal"), ms(0));
        assert_eq!(exec.pending(), None);
        exec.mark_ready(None, ms(0));
        exec.tick(ms(300));
        exec.request(&id("legal"), ms(300));
        assert_eq!(exec.phase(), &ExecutorPhase::Idle);
    }

    #[test]
    fn missing_element_buffers_until_it_appears() {
        let host = HeadlessHost::new(["hero"]);
        let (mut exec, store) = setup(host.clone());
        exec.mark_ready(None, ms(0));
        exec.tick(ms(250));
        exec.request(&id("contact"), ms(300));
        assert_eq!(exec.pending(), Some(&id("contact")));
        assert_eq!(store.active_id(), "hero");

        assert!(!exec.retry_pending(ms(310)));
        host.insert_section("contact");
        assert!(exec.retry_pending(ms(320)));
        assert_eq!(host.scroll_targets(), vec!["hero", "contact"]);
        assert_eq!(store.active_id(), "contact");
    }

    #[test]
    fn retry_waits_for_first_ready() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, _) = setup(host.clone());
        exec.request(&id("about"), ms(0));
        assert!(!exec.retry_pending(ms(1)));
        assert!(host.scrolls().is_empty());
    }

    #[test]
    fn reset_returns_to_not_ready() {
        let host = HeadlessHost::new(IDS);
        let (mut exec, _) = setup(host.clone());
        exec.mark_ready(None, ms(0));
        exec.request(&id("about"), ms(1));
        exec.reset();
        assert_eq!(exec.phase(), &ExecutorPhase::NotReady { pending: None });
        assert_eq!(exec.phase().name(), "not_ready");
        assert!(!exec.tick(ms(1000)));
        assert_eq!(host.scrolls().len(), 1);
    }
}
