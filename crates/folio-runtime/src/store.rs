#![forbid(unsafe_code)]

//! Active-section store: the single source of truth for which section is
//! active.
//!
//! The store owns two observables. `active` holds the current section id and
//! `is_last` is derived from it. Both are written together inside one
//! [`BatchScope`], so a subscriber of either value always reads a consistent
//! pair.
//!
//! # Invariants
//!
//! 1. `active` is always an id of the store's sequence; it starts at the
//!    first section.
//! 2. `is_last` is `true` iff `active` is the last section.
//! 3. Setting the current id again notifies nobody.
//!
//! # Failure Modes
//!
//! - **Unknown id**: ignored with a debug event; `set_active` returns `false`.

use std::rc::Rc;

use folio_core::{SectionId, SectionSequence};
use tracing::debug;

use crate::reactive::{BatchScope, Observable, Watch};

/// Observable store of the active section.
///
/// Cloning yields another handle to the same store.
#[derive(Debug, Clone)]
pub struct ActiveSectionStore {
    sections: Rc<SectionSequence>,
    active: Observable<SectionId>,
    is_last: Observable<bool>,
}

impl ActiveSectionStore {
    /// Create a store positioned on the first section.
    #[must_use]
    pub fn new(sections: SectionSequence) -> Self {
        let first = sections.first().id.clone();
        let is_last = sections.len() == 1;
        Self {
            sections: Rc::new(sections),
            active: Observable::new(first),
            is_last: Observable::new(is_last),
        }
    }

    /// Read-only view of the active id.
    #[must_use]
    pub fn active(&self) -> Watch<SectionId> {
        self.active.watch()
    }

    /// Read-only view of "the active section is the last one".
    #[must_use]
    pub fn is_last(&self) -> Watch<bool> {
        self.is_last.watch()
    }

    /// Make `id` the active section. Returns `true` if the active id changed.
    pub fn set_active(&self, id: &str) -> bool {
        let Some((index, section)) = self
            .sections
            .index_of(id)
            .and_then(|index| self.sections.get(index).map(|s| (index, s.id.clone())))
        else {
            debug!(target: "folio.store", id, "set_active ignored: unknown section");
            return false;
        };
        let _batch = BatchScope::new();
        let changed = self.active.set(section);
        self.is_last.set(index + 1 == self.sections.len());
        if changed {
            debug!(target: "folio.store", id, index, "active section changed");
        }
        changed
    }

    #[must_use]
    pub fn active_id(&self) -> SectionId {
        self.active.get()
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
            .with(|id| self.sections.index_of(id.as_str()))
            .unwrap_or(0)
    }

    #[must_use]
    pub fn sections(&self) -> &SectionSequence {
        &self.sections
    }
}
