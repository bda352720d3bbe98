//! Push-based observable streams (mechanics only).
//!
//! This module provides the **observable pattern**: a source pushes
//! [`Notification`]s to every attached [`Observer`], and derived streams are
//! built by wrapping one or more sources in operators.
//!
//! ## Design Philosophy
//!
//! - **Synchronous**: a derived stream recomputes inside the upstream emission
//!   call; there is no scheduler and no buffering.
//! - **Lazy**: building an `Observable` does nothing; work starts on
//!   `subscribe` and every subscription gets its own operator state.
//! - **Explicit disposal**: `subscribe` returns a [`Subscription`]; dropping it
//!   detaches the observer from all upstream sources.
//!
//! State lives in subjects (see `subject`), not in observables.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::notification::{Notification, StreamError};
use crate::subscription::Subscription;

type Sink<T> = dyn Fn(Notification<T>) + Send + Sync;
type SubscribeFn<T> = dyn Fn(Observer<T>) -> Subscription + Send + Sync;

/// Receiving end of a stream.
///
/// Clones share the same closed flag: once any clone has seen a terminal
/// notification (or has been closed by its subscription), none of them
/// forwards anything else.
pub struct Observer<T> {
    sink: Arc<Sink<T>>,
    closed: Arc<AtomicBool>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T> Observer<T> {
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(Notification<T>) + Send + Sync + 'static,
    {
        Self {
            sink: Arc::new(sink),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn next(&self, value: T) {
        self.emit(Notification::Next(value));
    }

    pub fn error(&self, error: StreamError) {
        self.emit(Notification::Error(error));
    }

    pub fn complete(&self) {
        self.emit(Notification::Complete);
    }

    /// Deliver a notification, enforcing the stream grammar.
    pub fn emit(&self, notification: Notification<T>) {
        if notification.is_terminal() {
            if self.closed.swap(true, Ordering::SeqCst) {
                return;
            }
        } else if self.closed.load(Ordering::SeqCst) {
            return;
        }
        (self.sink)(notification);
    }

    /// Stop forwarding without delivering a terminal notification.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl<T> core::fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observer")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A lazy, push-based stream of `T` values.
///
/// ## Usage Pattern
///
/// ```ignore
/// let subject = BehaviorSubject::new(1);
/// let doubled = subject.as_observable().map(|n| n * 2);
///
/// let sub = doubled.subscribe(|n| match n {
///     Notification::Next(v) => println!("{v}"),
///     Notification::Error(e) => eprintln!("{e}"),
///     Notification::Complete => {}
/// });
///
/// subject.next(5); // prints 10 before `next` returns
/// drop(sub);       // detaches from `subject`
/// ```
///
/// ## Thread Safety
///
/// Observables and observers are `Send + Sync`; emissions from different
/// threads are delivered on the emitting thread and are not ordered against
/// each other.
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> core::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Build an observable from its subscribe function.
    ///
    /// The function is called once per subscription and must return the
    /// subscription that detaches whatever it attached.
    pub fn new<F>(subscribe: F) -> Self
    where
        F: Fn(Observer<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            subscribe_fn: Arc::new(subscribe),
        }
    }

    /// Completes immediately without emitting.
    pub fn empty() -> Self {
        Self::new(|observer| {
            observer.complete();
            Subscription::empty()
        })
    }

    /// Emits `value` once, then completes.
    pub fn of(value: T) -> Self {
        Self::new(move |observer| {
            observer.next(value.clone());
            observer.complete();
            Subscription::empty()
        })
    }

    /// Errors immediately with `error`.
    pub fn throw(error: StreamError) -> Self {
        Self::new(move |observer| {
            observer.error(error.clone());
            Subscription::empty()
        })
    }

    pub fn subscribe<F>(&self, on_notification: F) -> Subscription
    where
        F: Fn(Notification<T>) + Send + Sync + 'static,
    {
        self.subscribe_observer(Observer::new(on_notification))
    }

    pub fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        let mut subscription = (self.subscribe_fn)(observer.clone());
        // Runs first on teardown: nothing reaches the observer once disposal starts.
        subscription.add_teardown(move || observer.close());
        subscription
    }
}
