#![forbid(unsafe_code)]

//! Core: section model, gesture translation, and timing primitives.
//!
//! # Role in folio
//! `folio-core` holds the deterministic, allocation-light pieces of the
//! section pager. Nothing here owns shared state or talks to a browser:
//! every type takes the current time as an argument and returns a decision.
//!
//! # Primary responsibilities
//! - **Sections**: [`SectionId`], [`Section`], and the validated, ordered
//!   [`SectionSequence`].
//! - **Catalog**: the portfolio's six sections with German, English and
//!   Russian labels ([`catalog`], [`Lang`]).
//! - **Time**: [`MonotonicClock`] sources and the [`Cooldown`] rate limiter.
//! - **Input**: [`GestureTranslator`] turns wheel and touch input into one
//!   discrete [`SectionStep`] per gesture.
//! - **Visibility**: intersection-ratio and viewport-band detection of the
//!   visible section ([`visibility`]).
//! - **Deep links**: [`DeepLink`] extracts the requested section from a URL.
//!
//! # How it fits in the system
//! `folio-runtime` wires these pieces into the active-section store, the
//! scroll executor and the viewport observer. `folio-web` feeds them with
//! browser input.

pub mod catalog;
pub mod clock;
pub mod cooldown;
pub mod deep_link;
pub mod gesture;
pub mod locale;
pub mod section;
pub mod visibility;

pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use cooldown::Cooldown;
pub use deep_link::DeepLink;
pub use gesture::{GestureConfig, GestureContext, GestureInput, GestureTranslator, SectionStep};
pub use locale::Lang;
pub use section::{Direction, Section, SectionError, SectionId, SectionSequence};
pub use visibility::{Band, IntersectionEntry, SectionBounds, VisibilityMap};
