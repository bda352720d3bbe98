//! Stream operators: `map`, `catch_error` and `combine_latest`.
//!
//! Every operator is lazy. Subscribing to the derived observable subscribes to
//! its sources and allocates fresh per-subscription state.

use std::sync::{Arc, Mutex};

use crate::lock;
use crate::notification::{Notification, StreamError};
use crate::observable::{Observable, Observer};
use crate::subscription::Subscription;

impl<T> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Transform every value with `f`; terminal notifications pass through.
    pub fn map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);

        Observable::new(move |downstream: Observer<U>| {
            let f = Arc::clone(&f);
            source.subscribe(move |notification| match notification {
                Notification::Next(value) => downstream.next((*f)(value)),
                Notification::Error(e) => downstream.error(e),
                Notification::Complete => downstream.complete(),
            })
        })
    }

    /// Replace an erroring source with the observable returned by `handler`.
    ///
    /// Values emitted before the error are forwarded as-is; the error itself
    /// never reaches downstream.
    pub fn catch_error<F>(&self, handler: F) -> Observable<T>
    where
        F: Fn(StreamError) -> Observable<T> + Send + Sync + 'static,
    {
        let source = self.clone();
        let handler = Arc::new(handler);

        Observable::new(move |downstream: Observer<T>| {
            let handler = Arc::clone(&handler);
            // The source may fail synchronously inside `subscribe`, so the
            // replacement subscription lives in a slot owned by both sides.
            let replacement: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
            let slot = Arc::clone(&replacement);

            let mut subscription = source.subscribe(move |notification| match notification {
                Notification::Next(value) => downstream.next(value),
                Notification::Complete => downstream.complete(),
                Notification::Error(e) => {
                    let forward = downstream.clone();
                    let inner = (*handler)(e).subscribe(move |n| forward.emit(n));
                    *lock(&slot) = Some(inner);
                }
            });

            subscription.add_teardown(move || {
                let inner = lock(&replacement).take();
                drop(inner);
            });
            subscription
        })
    }
}

#[derive(Debug)]
struct CombineState<A, B> {
    left: Option<A>,
    right: Option<B>,
    left_done: bool,
    right_done: bool,
}

impl<A: Clone, B: Clone> CombineState<A, B> {
    fn new() -> Self {
        Self {
            left: None,
            right: None,
            left_done: false,
            right_done: false,
        }
    }

    fn on_left(&mut self, notification: Notification<A>) -> Option<Notification<(A, B)>> {
        match notification {
            Notification::Next(value) => {
                self.left = Some(value);
                self.pair()
            }
            Notification::Complete => {
                self.left_done = true;
                self.completion()
            }
            terminal => terminal.into_terminal(),
        }
    }

    fn on_right(&mut self, notification: Notification<B>) -> Option<Notification<(A, B)>> {
        match notification {
            Notification::Next(value) => {
                self.right = Some(value);
                self.pair()
            }
            Notification::Complete => {
                self.right_done = true;
                self.completion()
            }
            terminal => terminal.into_terminal(),
        }
    }

    fn pair(&self) -> Option<Notification<(A, B)>> {
        match (&self.left, &self.right) {
            (Some(a), Some(b)) => Some(Notification::Next((a.clone(), b.clone()))),
            _ => None,
        }
    }

    // A side that completed without ever emitting means no pair can ever form.
    fn completion(&self) -> Option<Notification<(A, B)>> {
        let both_done = self.left_done && self.right_done;
        let starved =
            (self.left_done && self.left.is_none()) || (self.right_done && self.right.is_none());
        (both_done || starved).then_some(Notification::Complete)
    }
}

/// Emit `(latest_a, latest_b)` whenever either source emits, once both have
/// emitted at least once.
///
/// Errors from either side are forwarded immediately. Completes when both
/// sides complete, or as soon as one side completes without having emitted.
pub fn combine_latest<A, B>(a: &Observable<A>, b: &Observable<B>) -> Observable<(A, B)>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    let (a, b) = (a.clone(), b.clone());

    Observable::new(move |downstream: Observer<(A, B)>| {
        let state = Arc::new(Mutex::new(CombineState::new()));
        let mut subscription = Subscription::empty();

        let left_state = Arc::clone(&state);
        let left_downstream = downstream.clone();
        subscription.add(a.subscribe(move |n| {
            let out = lock(&left_state).on_left(n);
            if let Some(out) = out {
                left_downstream.emit(out);
            }
        }));

        let right_state = Arc::clone(&state);
        subscription.add(b.subscribe(move |n| {
            let out = lock(&right_state).on_right(n);
            if let Some(out) = out {
                downstream.emit(out);
            }
        }));

        subscription
    })
}
