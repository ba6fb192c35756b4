#![forbid(unsafe_code)]

//! Folio Runtime
//!
//! Stateful coordination for the section pager: which section is active,
//! how scroll requests become scrolls, and how the visible section is fed
//! back into state.
//!
//! # Key Components
//!
//! - [`ActiveSectionStore`] - Observable active section and "is last" flag
//! - [`ScrollRequestChannel`] - Fire-and-forget multicast of scroll requests
//! - [`SectionNav`] - Navigation service handed to header, footer and links
//! - [`ScrollExecutor`] - NotReady / Idle / Scrolling state machine
//! - [`ViewportObserver`] - Throttled intersection-based section reporting
//! - [`SectionPager`] - Per-page orchestrator wiring all of the above
//! - [`LanguageService`] - Persisted UI language broadcast
//! - [`PagerConfig`] - Policy-as-data tunables
//!
//! # Role in folio
//! `folio-runtime` sits between the pure building blocks of `folio-core`
//! and a page host. Everything is single-threaded and host-driven: the host
//! forwards input and calls [`SectionPager::tick`]; the runtime answers
//! through the [`SectionHost`] trait.

pub mod channel;
pub mod config;
pub mod executor;
pub mod host;
pub mod language;
pub mod nav;
pub mod pager;
pub mod reactive;
pub mod store;
pub mod viewport;

pub use channel::ScrollRequestChannel;
pub use config::{ConfigError, ExecutorPolicy, GesturePolicy, PagerConfig, ViewportPolicy};
pub use executor::{ExecutorPhase, ScrollExecutor};
pub use host::{HeadlessHost, ObservationToken, ScrollBehavior, SectionHost};
pub use language::{LanguageService, LanguageStorage, MemoryStorage, STORAGE_KEY, StorageError};
pub use nav::SectionNav;
pub use pager::SectionPager;
pub use reactive::{BatchScope, Observable, Subscription, Watch};
pub use store::ActiveSectionStore;
pub use viewport::{ObserverContext, ViewportObserver};
