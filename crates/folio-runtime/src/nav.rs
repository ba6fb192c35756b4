#![forbid(unsafe_code)]

//! `SectionNav`: the navigation service handed to header, footer and
//! deep-link code.
//!
//! It bundles the [`ActiveSectionStore`] and the [`ScrollRequestChannel`]
//! behind one cheap `Clone` handle. UI code asks for navigation with
//! [`SectionNav::request_scroll`] and observes state through
//! [`SectionNav::active`] and [`SectionNav::is_last`]; it never touches the
//! scroll executor directly.

use folio_core::{SectionId, SectionSequence};
use tracing::debug;

use crate::channel::ScrollRequestChannel;
use crate::reactive::{Subscription, Watch};
use crate::store::ActiveSectionStore;

/// Shared navigation service for one page.
#[derive(Debug, Clone)]
pub struct SectionNav {
    store: ActiveSectionStore,
    requests: ScrollRequestChannel,
}

impl SectionNav {
    #[must_use]
    pub fn new(sections: SectionSequence) -> Self {
        Self {
            store: ActiveSectionStore::new(sections),
            requests: ScrollRequestChannel::new(),
        }
    }

    /// Ask the page to scroll to `id`.
    ///
    /// The request goes out on the channel first. Known ids then also become
    /// active right away, so auxiliary UI (footer visibility, header theme)
    /// reflects the intent before the scroll starts.
    pub fn request_scroll(&self, id: impl Into<SectionId>) {
        let id = id.into();
        debug!(target: "folio.nav", %id, "scroll requested");
        self.requests.emit(id.clone());
        self.store.set_active(id.as_str());
    }

    /// Report the section that is actually visible. Unknown ids are ignored.
    pub fn set_active(&self, id: &str) -> bool {
        self.store.set_active(id)
    }

    #[must_use]
    pub fn active(&self) -> Watch<SectionId> {
        self.store.active()
    }

    #[must_use]
    pub fn is_last(&self) -> Watch<bool> {
        self.store.is_last()
    }

    /// Subscribe to the raw request stream.
    pub fn scroll_requests(&self, callback: impl Fn(&SectionId) + 'static) -> Subscription {
        self.requests.subscribe(callback)
    }

    #[must_use]
    pub fn sections(&self) -> &SectionSequence {
        self.store.sections()
    }

    #[must_use]
    pub fn store(&self) -> &ActiveSectionStore {
        &self.store
    }
}
