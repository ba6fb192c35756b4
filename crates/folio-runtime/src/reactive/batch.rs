#![forbid(unsafe_code)]

//! Batch scopes: make several [`Observable`](super::Observable) updates
//! appear atomic to subscribers.
//!
//! The active-section store updates two observables (`active` and
//! `is_last`) for every change. Without batching, a subscriber of `active`
//! could read `is_last` before it was recomputed. Inside a [`BatchScope`]
//! values change immediately but notifications are deferred until the
//! outermost scope exits, then delivered in first-enqueued order.
//!
//! ```ignore
//! let _batch = BatchScope::new();
//! active.set(id);     // deferred
//! is_last.set(true);  // deferred
//! // both subscriber sets run here, each seeing the final state
//! ```
//!
//! # Invariants
//!
//! 1. Nested scopes are supported: only the outermost one flushes.
//! 2. Inside a batch, `Observable::get()` returns the latest value.
//! 3. A keyed callback enqueued twice runs once, with the latest closure, at
//!    its first queue position.
//! 4. Updates made by subscribers while the batch is flushing are delivered
//!    in the same flush, after the callbacks already queued.
//!
//! # Failure Modes
//!
//! - **Callback panics during flush**: remaining callbacks still run; the
//!   first panic is re-raised afterwards.

use std::cell::RefCell;

use tracing::trace_span;

type DeferredNotify = Box<dyn FnOnce()>;

struct DeferredEntry {
    key: Option<usize>,
    notify: DeferredNotify,
}

struct BatchContext {
    /// Nesting depth; the scope that brings it to 0 flushes.
    depth: u32,
    deferred: Vec<DeferredEntry>,
}

thread_local! {
    static BATCH_CTX: RefCell<Option<BatchContext>> = const { RefCell::new(None) };
}

/// Returns true if a batch is active (or flushing) on this thread.
pub fn is_batching() -> bool {
    BATCH_CTX.with(|ctx| ctx.borrow().is_some())
}

/// Run `f` now, or queue it for the end of the current batch.
///
/// Returns `true` if it was deferred.
pub fn defer_or_run(f: impl FnOnce() + 'static) -> bool {
    enqueue(None, Box::new(f))
}

/// Like [`defer_or_run`], but replaces a callback already queued under
/// `key` while keeping its original position.
pub fn defer_or_run_keyed(key: usize, f: impl FnOnce() + 'static) -> bool {
    enqueue(Some(key), Box::new(f))
}

fn enqueue(key: Option<usize>, notify: DeferredNotify) -> bool {
    let rejected = BATCH_CTX.with(|ctx| {
        let mut guard = ctx.borrow_mut();
        let Some(batch) = guard.as_mut() else {
            return Some(notify);
        };
        match key.and_then(|k| batch.deferred.iter_mut().find(|e| e.key == Some(k))) {
            Some(entry) => entry.notify = notify,
            None => batch.deferred.push(DeferredEntry { key, notify }),
        }
        None
    });
    match rejected {
        Some(notify) => {
            notify();
            false
        }
        None => true,
    }
}

fn take_deferred() -> Vec<DeferredNotify> {
    BATCH_CTX.with(|ctx| {
        ctx.borrow_mut()
            .as_mut()
            .map(|batch| {
                std::mem::take(&mut batch.deferred)
                    .into_iter()
                    .map(|entry| entry.notify)
                    .collect()
            })
            .unwrap_or_default()
    })
}

/// Deliver deferred callbacks until none remain.
fn flush() {
    let mut first_panic: Option<Box<dyn std::any::Any + Send>> = None;
    let mut rounds = 0u32;
    loop {
        let deferred = take_deferred();
        if deferred.is_empty() {
            break;
        }
        rounds += 1;
        let _span = trace_span!("folio.batch.flush", round = rounds, callbacks = deferred.len())
            .entered();
        for notify in deferred {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(notify));
            if let Err(payload) = result
                && first_panic.is_none()
            {
                first_panic = Some(payload);
            }
        }
    }

    BATCH_CTX.with(|ctx| {
        *ctx.borrow_mut() = None;
    });

    if let Some(payload) = first_panic {
        std::panic::resume_unwind(payload);
    }
}

/// RAII guard that defers observable notifications until dropped.
pub struct BatchScope {
    is_root: bool,
}

impl BatchScope {
    #[must_use]
    pub fn new() -> Self {
        let is_root = BATCH_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            match guard.as_mut() {
                Some(batch) => {
                    batch.depth += 1;
                    false
                }
                None => {
                    *guard = Some(BatchContext {
                        depth: 1,
                        deferred: Vec::new(),
                    });
                    true
                }
            }
        });
        Self { is_root }
    }

    /// Number of notifications queued in the current batch.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        BATCH_CTX.with(|ctx| ctx.borrow().as_ref().map_or(0, |b| b.deferred.len()))
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let should_flush = BATCH_CTX.with(|ctx| match ctx.borrow_mut().as_mut() {
            Some(batch) => {
                batch.depth = batch.depth.saturating_sub(1);
                batch.depth == 0
            }
            None => false,
        });
        if should_flush {
            flush();
        }
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope")
            .field("is_root", &self.is_root)
            .field("pending", &self.pending_count())
            .finish()
    }
}
