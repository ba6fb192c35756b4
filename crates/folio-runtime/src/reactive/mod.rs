#![forbid(unsafe_code)]

//! Reactive primitives for the section pager.
//!
//! - [`Observable`]: shared value with change notification and version
//!   tracking; [`Watch`] is its read-only view.
//! - [`BatchScope`]: RAII guard that defers notifications until the
//!   outermost scope exits, so multi-value updates look atomic.

pub mod batch;
pub mod observable;

pub use batch::BatchScope;
pub use observable::{Observable, Subscription, Watch};
