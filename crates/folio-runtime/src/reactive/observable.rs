#![forbid(unsafe_code)]

//! Observable value with change notification, plus a read-only [`Watch`]
//! view handed to consumers.
//!
//! # Design
//!
//! [`Observable<T>`] keeps its value in shared `Rc<RefCell<..>>` storage.
//! Setting a value equal (by `PartialEq`) to the current one is a no-op, so
//! subscribers only ever see distinct consecutive values. Live subscribers
//! are notified in registration order.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: callbacks live as long as their [`Subscription`]
//!   guard. Dead entries are pruned lazily on the next notification.
//! - **Re-entrancy**: subscribers may call `set` on the same or another
//!   observable; the borrow is released before callbacks run.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::info_span;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning creates another handle to the **same** value and subscribers.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing `set`.
/// 2. `set(v)` where `v == current` notifies nobody.
/// 3. Subscribers are notified in registration order.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable at version 0 with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify subscribers if it differs from the current
    /// value. Returns `true` when the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Register `callback`; it runs with each new distinct value until the
    /// returned guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Read-only view of this observable.
    #[must_use]
    pub fn watch(&self) -> Watch<T> {
        Watch {
            source: self.clone(),
        }
    }

    fn notify(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect()
        };
        if callbacks.is_empty() {
            return;
        }

        if super::batch::is_batching() {
            for cb in callbacks {
                let key = Rc::as_ptr(&cb) as *const () as usize;
                let source = self.clone();
                super::batch::defer_or_run_keyed(key, move || {
                    let latest = source.get();
                    cb(&latest);
                });
            }
            return;
        }

        let value = self.get();
        let _span = info_span!("folio.notify", subscribers = callbacks.len()).entered();
        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// Read-only handle to an [`Observable`]: consumers can read and subscribe
/// but not write.
pub struct Watch<T> {
    source: Observable<T>,
}

impl<T> Clone for Watch<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Watch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Watch").field(&self.source).finish()
    }
}

impl<T: Clone + PartialEq + 'static> Watch<T> {
    #[must_use]
    pub fn get(&self) -> T {
        self.source.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.source.with(f)
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.source.subscribe(callback)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.source.version()
    }
}

/// RAII guard for a subscriber callback; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Wrap any value whose drop ends a subscription.
    pub(crate) fn from_guard(guard: Box<dyn std::any::Any>) -> Self {
        Self { _guard: guard }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_changes_value_and_version() {
        let obs = Observable::new("hero".to_string());
        assert!(obs.set("about".to_string()));
        assert_eq!(obs.get(), "about");
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn equal_value_is_not_a_change() {
        let obs = Observable::new(7);
        let hits = Rc::new(Cell::new(0));
        let hits_clone = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| hits_clone.set(hits_clone.get() + 1));

        assert!(!obs.set(7));
        assert_eq!(hits.get(), 0);
        assert_eq!(obs.version(), 0);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let l2 = Rc::clone(&log);
        let _a = obs.subscribe(move |_| l1.borrow_mut().push('a'));
        let _b = obs.subscribe(move |_| l2.borrow_mut().push('b'));
        obs.set(1);
        assert_eq!(*log.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let obs = Observable::new(0);
        let hits = Rc::new(Cell::new(0));
        let hits_clone = Rc::clone(&hits);
        let sub = obs.subscribe(move |_| hits_clone.set(hits_clone.get() + 1));
        obs.set(1);
        drop(sub);
        obs.set(2);
        assert_eq!(hits.get(), 1);
        assert_eq!(obs.subscriber_count(), 0, "pruned on notify");
    }

    #[test]
    fn subscriber_may_write_back() {
        let obs = Observable::new(0);
        let writer = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v == 1 {
                writer.set(2);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 2);
    }

    #[test]
    fn watch_reads_and_subscribes() {
        let obs = Observable::new(false);
        let watch = obs.watch();
        let last = Rc::new(Cell::new(false));
        let last_clone = Rc::clone(&last);
        let _sub = watch.subscribe(move |v| last_clone.set(*v));

        obs.set(true);
        assert!(watch.get());
        assert!(last.get());
        assert_eq!(watch.version(), 1);
        assert!(watch.with(|v| *v));
    }

    #[test]
    fn clones_share_state() {
        let a = Observable::new(1);
        let b = a.clone();
        b.set(3);
        assert_eq!(a.get(), 3);
        assert!(format!("{a:?}").contains("version: 1"));
    }
}
