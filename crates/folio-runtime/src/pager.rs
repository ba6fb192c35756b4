#![forbid(unsafe_code)]

//! Section pager: the per-page orchestrator.
//!
//! One [`SectionPager`] exists per mounted page. It owns the scroll
//! executor, the gesture translator and the viewport observer, subscribes
//! the executor to the navigation service's request channel, and routes
//! host input to the right component.
//!
//! ```text
//! header/footer/deep link ─▶ SectionNav::request_scroll ─▶ channel ─▶ inbox ─▶ executor
//! wheel/touch ─▶ GestureTranslator ───────────────────────────────────────────▶ executor
//! intersection ─▶ ViewportObserver ─▶ store.set_active
//! ```
//!
//! # Re-entrancy
//!
//! Starting a scroll updates the store, and store subscribers may request
//! another scroll synchronously. Such requests land in an inbox and are
//! handed to the executor, in order, once the current call into it returns.
//!
//! # Time
//!
//! The pager reads the injected [`MonotonicClock`] on every call. Nothing
//! happens between calls: the host must call [`SectionPager::tick`]
//! regularly (every animation frame or on a short timer) for settle
//! windows, throttles and the initial probe to advance.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use folio_core::{
    GestureContext, GestureInput, GestureTranslator, IntersectionEntry, MonotonicClock,
    SectionId,
};
use tracing::{debug, debug_span, info};

use crate::config::PagerConfig;
use crate::executor::{ExecutorPhase, ScrollExecutor};
use crate::host::SectionHost;
use crate::nav::SectionNav;
use crate::reactive::Subscription;
use crate::viewport::{ObserverContext, ViewportObserver};

type Inbox = Rc<RefCell<VecDeque<SectionId>>>;

/// Per-page coordinator of scrolling, gestures and visibility.
pub struct SectionPager {
    nav: SectionNav,
    host: Rc<dyn SectionHost>,
    clock: Rc<dyn MonotonicClock>,
    config: PagerConfig,
    executor: Rc<RefCell<ScrollExecutor>>,
    inbox: Inbox,
    gestures: GestureTranslator,
    observer: Option<ViewportObserver>,
    explicit_request: Rc<Cell<bool>>,
    mounted: bool,
    _requests: Subscription,
}

impl SectionPager {
    /// Create a pager and subscribe it to `nav`'s scroll requests.
    ///
    /// Requests made before [`mount`](Self::mount) are buffered.
    pub fn new(
        nav: SectionNav,
        host: Rc<dyn SectionHost>,
        clock: Rc<dyn MonotonicClock>,
        config: PagerConfig,
    ) -> Self {
        let executor = Rc::new(RefCell::new(
            ScrollExecutor::new(nav.store().clone(), Rc::clone(&host), config.settle_window())
                .with_behavior(config.scroll_behavior()),
        ));
        let inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
        let explicit_request = Rc::new(Cell::new(false));

        let requests = {
            let executor = Rc::clone(&executor);
            let inbox = Rc::clone(&inbox);
            let clock = Rc::clone(&clock);
            let explicit_request = Rc::clone(&explicit_request);
            nav.scroll_requests(move |id| {
                explicit_request.set(true);
                inbox.borrow_mut().push_back(id.clone());
                drain_inbox(&executor, &inbox, clock.now_mono());
            })
        };

        Self {
            gestures: GestureTranslator::new(config.to_gesture_config()),
            nav,
            host,
            clock,
            config,
            executor,
            inbox,
            observer: None,
            explicit_request,
            mounted: false,
            _requests: requests,
        }
    }

    /// The section elements now exist: run the ready transition and start
    /// observing visibility.
    ///
    /// `initial` is the deep-linked section, if any. A request buffered
    /// before mount takes precedence over it.
    pub fn mount(&mut self, initial: Option<SectionId>) {
        let now = self.now();
        let _span = debug_span!("folio.pager.mount", initial = ?initial).entered();
        if self.mounted {
            self.unmount();
        }
        self.mounted = true;

        let buffered = self.executor.borrow().pending().is_some();
        let deep_linked = initial
            .as_ref()
            .is_some_and(|id| self.nav.sections().contains(id.as_str()));
        self.explicit_request.set(buffered || deep_linked);

        self.executor.borrow_mut().mark_ready(initial.as_ref(), now);
        self.drain();

        self.observer = ViewportObserver::start(
            self.nav.store().clone(),
            Rc::clone(&self.host),
            &self.config,
            now,
        );
        info!(
            target: "folio.pager",
            observing = self.observer.is_some(),
            "mounted"
        );
    }

    /// Release the observer and return the executor to NotReady.
    pub fn unmount(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
        self.executor.borrow_mut().reset();
        self.inbox.borrow_mut().clear();
        self.gestures.reset();
        self.explicit_request.set(false);
        if self.mounted {
            info!(target: "folio.pager", "unmounted");
        }
        self.mounted = false;
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        self.on_gesture(GestureInput::Wheel { delta_y });
    }

    pub fn on_touch_start(&mut self, y: f64) {
        self.on_gesture(GestureInput::TouchStart { y });
    }

    pub fn on_touch_end(&mut self, y: f64) {
        self.on_gesture(GestureInput::TouchEnd { y });
    }

    pub fn on_touch_cancel(&mut self) {
        self.on_gesture(GestureInput::TouchCancel);
    }

    /// Feed intersection observations from the host.
    pub fn on_intersection(&mut self, entries: &[IntersectionEntry]) {
        let now = self.now();
        self.finish_elapsed_scroll(now);
        let ctx = self.observer_context();
        if let Some(observer) = self.observer.as_mut() {
            observer.record(entries, ctx, now);
        }
        self.drain();
    }

    /// Advance every timer: scroll settle, gesture cooldown, observer
    /// throttle and the initial probe.
    pub fn tick(&mut self) {
        let now = self.now();
        self.gestures.tick(now);
        {
            let mut executor = self.executor.borrow_mut();
            executor.tick(now);
            if self.mounted {
                executor.retry_pending(now);
            }
        }
        self.drain();
        let ctx = self.observer_context();
        if let Some(observer) = self.observer.as_mut() {
            observer.tick(ctx, now);
        }
        self.drain();
    }

    #[must_use]
    pub fn nav(&self) -> &SectionNav {
        &self.nav
    }

    #[must_use]
    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observer
            .as_ref()
            .is_some_and(ViewportObserver::is_connected)
    }

    /// Snapshot of the executor phase.
    #[must_use]
    pub fn phase(&self) -> ExecutorPhase {
        self.executor.borrow().phase().clone()
    }

    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.executor.borrow().is_scrolling()
    }

    fn on_gesture(&mut self, input: GestureInput) {
        let now = self.now();
        self.finish_elapsed_scroll(now);
        let store = self.nav.store();
        let ctx = GestureContext {
            index: store.active_index(),
            len: store.sections().len(),
            busy: !self.mounted || self.is_scrolling(),
        };
        let Some(step) = self.gestures.process(input, ctx, now) else {
            return;
        };
        let Some(target) = store.sections().get(step.target).map(|s| s.id.clone()) else {
            return;
        };
        debug!(target: "folio.pager", %target, direction = ?step.direction, "gesture step");
        self.explicit_request.set(true);
        self.executor.borrow_mut().request(&target, now);
        self.drain();
    }

    /// Close a settle window that elapsed since the last tick, so input
    /// arriving before it is not judged against a finished scroll.
    fn finish_elapsed_scroll(&self, now: Duration) {
        self.executor.borrow_mut().tick(now);
        self.drain();
    }

    fn observer_context(&self) -> ObserverContext {
        ObserverContext {
            scrolling: self.is_scrolling(),
            explicit_request: self.explicit_request.get(),
        }
    }

    fn drain(&self) {
        drain_inbox(&self.executor, &self.inbox, self.now());
    }

    fn now(&self) -> Duration {
        self.clock.now_mono()
    }
}

impl Drop for SectionPager {
    fn drop(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl std::fmt::Debug for SectionPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionPager")
            .field("mounted", &self.mounted)
            .field("phase", &self.phase())
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}

/// Hand queued requests to the executor unless it is already busy further
/// up the stack; the outer caller drains the rest.
fn drain_inbox(
    executor: &RefCell<ScrollExecutor>,
    inbox: &RefCell<VecDeque<SectionId>>,
    now: Duration,
) {
    loop {
        let Ok(mut executor) = executor.try_borrow_mut() else {
            return;
        };
        let Some(id) = inbox.borrow_mut().pop_front() else {
            return;
        };
        executor.request(&id, now);
    }
}
