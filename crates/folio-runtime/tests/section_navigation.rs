#![forbid(unsafe_code)]

//! End-to-end navigation behaviour of a mounted pager.
//!
//! Covers:
//! 1. A scroll request makes the target active exactly once
//! 2. "is last" follows the active section
//! 3. Wheel bursts inside the cooldown move one section
//! 4. Requests before mount become the first scroll, with nothing in between
//! 5. Next from the last section and previous from the first are no-ops
//! 6. The five-section walkthrough (request, single wheel, double wheel)
//! 7. A section that stays visible after scrolling settles becomes active
//! 8. Input after an elapsed settle window is handled without waiting for a tick
//!
//! Run:
//!   cargo test -p folio-runtime --test section_navigation

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{IntersectionEntry, ManualClock, SectionId, SectionSequence};
use folio_runtime::{
    ExecutorPhase, HeadlessHost, PagerConfig, ScrollBehavior, SectionNav, SectionPager,
    Subscription,
};

const SCENARIO: [&str; 5] = ["hero", "about", "skills", "portfolio", "contact"];

struct Page {
    pager: SectionPager,
    nav: SectionNav,
    host: HeadlessHost,
    clock: ManualClock,
}

impl Page {
    fn new() -> Self {
        Self::with_host(HeadlessHost::new(SCENARIO))
    }

    fn with_host(host: HeadlessHost) -> Self {
        let nav = SectionNav::new(SectionSequence::from_ids(SCENARIO).unwrap());
        let clock = ManualClock::new();
        let pager = SectionPager::new(
            nav.clone(),
            Rc::new(host.clone()),
            Rc::new(clock.clone()),
            PagerConfig::default(),
        );
        Self {
            pager,
            nav,
            host,
            clock,
        }
    }

    /// Mount and let the initial scroll and probe finish.
    fn mounted() -> Self {
        let mut page = Self::new();
        page.host.stack_sections(&SCENARIO, 1000.0, 0);
        page.pager.mount(None);
        page.advance(400);
        page
    }

    fn advance(&mut self, ms: u64) {
        self.clock.advance_ms(ms);
        self.pager.tick();
    }

    fn record_active(&self) -> (Rc<RefCell<Vec<String>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let sub = self
            .nav
            .active()
            .subscribe(move |id| log_clone.borrow_mut().push(id.to_string()));
        (log, sub)
    }

    fn record_last(&self) -> (Rc<RefCell<Vec<bool>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let sub = self
            .nav
            .is_last()
            .subscribe(move |last| log_clone.borrow_mut().push(*last));
        (log, sub)
    }
}

// ============================================================================
// 1. Request → active exactly once
// ============================================================================

#[test]
fn request_scroll_emits_target_once() {
    let page = Page::mounted();
    let (active, _sub) = page.record_active();

    page.nav.request_scroll("skills");
    assert_eq!(*active.borrow(), vec!["skills"]);
    assert_eq!(
        page.host.scrolls().last(),
        Some(&(SectionId::new("skills"), ScrollBehavior::Smooth))
    );
}

#[test]
fn every_known_section_can_be_requested() {
    for id in SCENARIO {
        let mut page = Page::mounted();
        let (active, _sub) = page.record_active();
        page.nav.request_scroll(id);
        page.advance(300);
        let expected: Vec<String> = if id == "hero" {
            Vec::new()
        } else {
            vec![id.to_string()]
        };
        assert_eq!(*active.borrow(), expected, "{id}");
        assert_eq!(page.nav.active().get(), id);
    }
}

// ============================================================================
// 3. Wheel bursts
// ============================================================================

#[test]
fn wheel_burst_moves_one_section() {
    let mut page = Page::mounted();
    for _ in 0..10 {
        page.pager.on_wheel(120.0);
        page.clock.advance_ms(20);
    }
    page.advance(1000);
    assert_eq!(page.nav.active().get(), "about");
}

#[test]
fn wheel_after_cooldown_moves_again() {
    let mut page = Page::mounted();
    page.pager.on_wheel(120.0);
    page.advance(900);
    page.pager.on_wheel(120.0);
    assert_eq!(page.nav.active().get(), "skills");
}

#[test]
fn swipe_moves_one_section() {
    let mut page = Page::mounted();
    page.pager.on_touch_start(600.0);
    page.pager.on_touch_end(200.0);
    assert_eq!(page.nav.active().get(), "about");
    page.advance(1000);
    page.pager.on_touch_start(200.0);
    page.pager.on_touch_end(600.0);
    assert_eq!(page.nav.active().get(), "hero");
}

// ============================================================================
// 4. Pending buffer
// ============================================================================

#[test]
fn request_before_mount_is_the_first_scroll() {
    let mut page = Page::new();
    page.nav.request_scroll("about");
    page.nav.request_scroll("portfolio");
    assert!(page.host.scrolls().is_empty());
    assert_eq!(
        page.pager.phase(),
        ExecutorPhase::NotReady {
            pending: Some(SectionId::new("portfolio"))
        }
    );

    page.pager.mount(Some(SectionId::new("contact")));
    assert_eq!(page.host.scroll_targets(), vec!["portfolio"]);
    assert_eq!(page.nav.active().get(), "portfolio");

    page.advance(1000);
    assert_eq!(page.host.scroll_targets(), vec!["portfolio"]);
    assert_eq!(page.nav.active().get(), "portfolio", "probe must not override");
}

#[test]
fn deep_link_is_the_first_scroll() {
    let mut page = Page::new();
    page.pager.mount(Some(SectionId::new("skills")));
    assert_eq!(page.host.scroll_targets(), vec!["skills"]);
    page.advance(1000);
    assert_eq!(page.nav.active().get(), "skills");
}

#[test]
fn missing_elements_defer_the_scroll() {
    let mut page = Page::with_host(HeadlessHost::empty());
    page.pager.mount(Some(SectionId::new("about")));
    assert!(page.host.scrolls().is_empty());

    for id in SCENARIO {
        page.host.insert_section(id);
    }
    page.advance(16);
    assert_eq!(page.host.scroll_targets(), vec!["about"]);
    assert_eq!(page.nav.active().get(), "about");
}

// ============================================================================
// 5. Bounds
// ============================================================================

#[test]
fn no_step_past_either_end() {
    let mut page = Page::mounted();
    let (active, _sub) = page.record_active();
    page.pager.on_wheel(-50.0);
    assert!(active.borrow().is_empty());

    page.nav.request_scroll("contact");
    page.advance(1000);
    let scrolls = page.host.scrolls().len();
    page.pager.on_wheel(50.0);
    page.advance(1000);
    assert_eq!(page.host.scrolls().len(), scrolls);
    assert_eq!(*active.borrow(), vec!["contact"]);
}

// ============================================================================
// 6. Walkthrough
// ============================================================================

#[test]
fn scenario_request_last_section() {
    let page = Page::mounted();
    let (active, _a) = page.record_active();
    let (last, _l) = page.record_last();

    page.nav.request_scroll("contact");
    assert_eq!(*active.borrow(), vec!["contact"]);
    assert_eq!(*last.borrow(), vec![true]);
}

#[test]
fn scenario_single_wheel_down() {
    let mut page = Page::mounted();
    let (active, _a) = page.record_active();
    let (last, _l) = page.record_last();

    page.pager.on_wheel(100.0);
    page.advance(1000);
    assert_eq!(*active.borrow(), vec!["about"]);
    assert!(last.borrow().is_empty());
    assert!(!page.nav.is_last().get());
}

#[test]
fn scenario_two_wheels_ten_ms_apart() {
    let mut page = Page::mounted();
    let (active, _a) = page.record_active();

    page.pager.on_wheel(100.0);
    page.clock.advance_ms(10);
    page.pager.on_wheel(100.0);
    page.advance(1000);
    assert_eq!(*active.borrow(), vec!["about"]);
}

// ============================================================================
// 7. Viewport truth
// ============================================================================

#[test]
fn visible_section_wins_once_scroll_settles() {
    let mut page = Page::mounted();
    page.nav.request_scroll("about");
    // The animation overshoots and the page rests on "skills".
    page.pager
        .on_intersection(&[IntersectionEntry::new("skills", 0.6)]);
    assert_eq!(page.nav.active().get(), "about");

    page.advance(260);
    assert_eq!(page.nav.active().get(), "skills");
}

#[test]
fn observer_never_requests_scrolls() {
    let mut page = Page::mounted();
    let before = page.host.scrolls().len();
    page.pager.on_intersection(&[IntersectionEntry::new("portfolio", 1.0)]);
    page.advance(500);
    assert_eq!(page.nav.active().get(), "portfolio");
    assert_eq!(page.host.scrolls().len(), before);
}

#[test]
fn headless_without_observation_still_navigates() {
    let mut page = Page::with_host(HeadlessHost::new(SCENARIO).without_observation());
    page.pager.mount(None);
    assert!(!page.pager.is_observing());
    page.advance(300);
    page.pager.on_wheel(1.0);
    assert_eq!(page.nav.active().get(), "about");
}

#[test]
fn initial_probe_detects_restored_position() {
    let mut page = Page::new();
    // A restored page is already scrolled to "portfolio".
    page.host.stack_sections(&SCENARIO, 900.0, 3);
    page.pager.mount(None);
    page.advance(250);
    assert_eq!(page.nav.active().get(), "hero");
    page.advance(100);
    assert_eq!(page.nav.active().get(), "portfolio");
}

#[test]
fn unmount_then_remount_restores_navigation() {
    let mut page = Page::mounted();
    page.pager.unmount();
    assert_eq!(page.host.observing(), 0);
    page.nav.request_scroll("skills");
    assert_eq!(page.host.scroll_targets(), vec!["hero"]);

    page.pager.mount(None);
    assert_eq!(page.host.scroll_targets(), vec!["hero", "skills"]);
    assert_eq!(page.host.observing(), 1);
}

// ============================================================================
// 8. Late ticks
// ============================================================================

#[test]
fn request_after_elapsed_settle_scrolls_without_tick() {
    let mut page = Page::new();
    page.pager.mount(None);
    // Background tab: animation frames stop, the clock keeps running.
    page.clock.advance_ms(1000);

    page.nav.request_scroll("skills");
    assert_eq!(page.host.scroll_targets(), vec!["hero", "skills"]);
    assert_eq!(page.nav.active().get(), "skills");
    assert!(matches!(
        page.pager.phase(),
        ExecutorPhase::Scrolling { ref target, queued: None } if *target == "skills"
    ));
}

#[test]
fn wheel_after_elapsed_settle_is_not_busy() {
    let mut page = Page::new();
    page.pager.mount(None);
    page.clock.advance_ms(1000);

    page.pager.on_wheel(120.0);
    assert_eq!(page.host.scroll_targets(), vec!["hero", "about"]);
    assert_eq!(page.nav.active().get(), "about");
}

#[test]
fn configured_instant_behavior_is_used_for_every_scroll() {
    let nav = SectionNav::new(SectionSequence::from_ids(SCENARIO).unwrap());
    let host = HeadlessHost::new(SCENARIO);
    let clock = ManualClock::new();
    let mut config = PagerConfig::default();
    config.executor.scroll_behavior = ScrollBehavior::Instant;
    let mut pager = SectionPager::new(
        nav.clone(),
        Rc::new(host.clone()),
        Rc::new(clock.clone()),
        config,
    );
    pager.mount(None);
    clock.advance_ms(300);
    nav.request_scroll("contact");

    let behaviors: Vec<ScrollBehavior> = host.scrolls().into_iter().map(|(_, b)| b).collect();
    assert_eq!(behaviors, vec![ScrollBehavior::Instant, ScrollBehavior::Instant]);
}
