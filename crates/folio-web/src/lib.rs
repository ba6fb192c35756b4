#![forbid(unsafe_code)]

//! `folio-web` connects the section pager to a browser page.
//!
//! Design goals:
//! - **Host-driven I/O**: the page script pushes DOM activity as
//!   [`HostEvent`]s; nothing here installs listeners of its own except the
//!   intersection observer.
//! - **Deterministic time**: the pager reads a monotonic clock and advances
//!   only on [`HostEvent::Tick`].
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! [`dispatch`] is target independent and drives a pager from decoded
//! events; on `wasm32` the `FolioPager` export wraps it with a DOM-backed
//! host and `localStorage` persistence.

pub mod input;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use input::{HostEvent, HostEventError, IntersectionJson};
#[cfg(target_arch = "wasm32")]
pub use wasm::{DomHost, FolioPager, WebStorage};

use folio_core::{DeepLink, IntersectionEntry, SectionId};
use folio_runtime::{SectionNav, SectionPager};
use tracing::trace;

/// Ratios at which the browser should report intersection changes.
///
/// A single `threshold` would only report crossings of that ratio, so the
/// recorded ratios could not be compared. Quarter steps plus `threshold`
/// itself keep them close to what is on screen. Sorted, clamped to
/// `0.0..=1.0`, without duplicates.
#[must_use]
pub fn observer_thresholds(threshold: f64) -> Vec<f64> {
    let mut steps = vec![0.0, 0.25, 0.5, 0.75, 1.0];
    if threshold.is_finite() {
        steps.push(threshold.clamp(0.0, 1.0));
    }
    steps.sort_by(f64::total_cmp);
    steps.dedup();
    steps
}

/// Resolve the section a page URL deep-links to, if it names a known one.
#[must_use]
pub fn initial_section(nav: &SectionNav, url: Option<&str>) -> Option<SectionId> {
    url.map(DeepLink::parse)
        .and_then(|link| link.resolve(nav.sections()))
}

/// Apply one host event to `pager`.
pub fn dispatch(pager: &mut SectionPager, nav: &SectionNav, event: HostEvent) {
    trace!(target: "folio.web", kind = event.kind(), "host event");
    match event {
        HostEvent::Mount { url } => {
            let initial = initial_section(nav, url.as_deref());
            pager.mount(initial);
        }
        HostEvent::Wheel { delta_y } => pager.on_wheel(delta_y),
        HostEvent::TouchStart { y } => pager.on_touch_start(y),
        HostEvent::TouchEnd { y } => pager.on_touch_end(y),
        HostEvent::TouchCancel => pager.on_touch_cancel(),
        HostEvent::Intersection { entries } => {
            let entries: Vec<IntersectionEntry> = entries.iter().map(Into::into).collect();
            pager.on_intersection(&entries);
        }
        HostEvent::Navigate { id } => nav.request_scroll(id),
        HostEvent::Tick => pager.tick(),
        HostEvent::Unmount => pager.unmount(),
    }
}

/// Decode `json` and apply it to `pager`.
pub fn dispatch_json(
    pager: &mut SectionPager,
    nav: &SectionNav,
    json: &str,
) -> Result<(), HostEventError> {
    let event = HostEvent::from_json_str(json)?;
    dispatch(pager, nav, event);
    Ok(())
}
