#![forbid(unsafe_code)]

//! Scroll-request channel: fire-and-forget multicast of "scroll to X".
//!
//! Unlike an [`Observable`](crate::reactive::Observable), the channel holds
//! no value. Each emit is delivered once to the subscribers registered at
//! that moment and then forgotten: late subscribers get no replay, repeated
//! requests for the same id are all delivered, and ids are not validated.
//!
//! # Invariants
//!
//! 1. Delivery order is registration order.
//! 2. A subscriber registered during an emit does not receive that emit.
//! 3. Dropping the [`Subscription`] stops delivery immediately.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_core::SectionId;
use tracing::trace;

use crate::reactive::Subscription;

type Listener = Rc<dyn Fn(&SectionId)>;

/// Multicast stream of scroll requests.
///
/// Cloning yields another handle to the same channel.
#[derive(Clone, Default)]
pub struct ScrollRequestChannel {
    listeners: Rc<RefCell<Vec<Weak<dyn Fn(&SectionId)>>>>,
}

impl ScrollRequestChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `id` to every live subscriber.
    pub fn emit(&self, id: impl Into<SectionId>) {
        let id = id.into();
        let listeners: Vec<Listener> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        trace!(target: "folio.channel", %id, listeners = listeners.len(), "scroll request");
        for listener in &listeners {
            listener(&id);
        }
    }

    /// Receive every request emitted from now on, until the guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&SectionId) + 'static) -> Subscription {
        let strong: Listener = Rc::new(callback);
        self.listeners.borrow_mut().push(Rc::downgrade(&strong));
        Subscription::from_guard(Box::new(strong))
    }

    /// Registered listeners, including dropped ones not yet pruned.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl std::fmt::Debug for ScrollRequestChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollRequestChannel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
