//! Reactive stream toolkit (in-process, synchronous).
//!
//! - [`Observable`] / [`Observer`]: lazy push-based streams
//! - [`Subject`], [`BehaviorSubject`], [`ReplaySubject`]: privately owned
//!   sources exposed to consumers only as read-only observables
//! - operators: [`Observable::map`], [`Observable::catch_error`], [`combine_latest`]
//! - [`Subscription`]: explicit disposal

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod notification;
pub mod observable;
pub mod operators;
pub mod subject;
pub mod subscription;

pub use notification::{Notification, StreamError};
pub use observable::{Observable, Observer};
pub use operators::combine_latest;
pub use subject::{BehaviorSubject, ReplaySubject, Subject};
pub use subscription::Subscription;

// A panicking observer must not wedge every other subscriber of the same source.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
