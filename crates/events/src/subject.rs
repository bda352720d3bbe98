//! In-process subjects: the writable sources behind observables.
//!
//! - No IO / no async
//! - Observers are never invoked while the subject's lock is held
//! - Notifications are queued per subject and delivered in push order by
//!   whichever thread is already delivering. A push made from inside an
//!   observer (or from another thread mid-delivery) is queued and handed out
//!   once the current notification has reached every observer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use crate::lock;
use crate::notification::{Notification, StreamError};
use crate::observable::{Observable, Observer};
use crate::subscription::Subscription;

/// What a subject remembers for late subscribers.
trait Slot<T>: Send + 'static {
    fn store(&mut self, value: &T);
    fn replay(&self) -> Option<T>;
}

/// Remembers nothing.
#[derive(Debug)]
struct NoReplay;

impl<T> Slot<T> for NoReplay {
    fn store(&mut self, _value: &T) {}

    fn replay(&self) -> Option<T> {
        None
    }
}

/// Latest value once one has been pushed.
#[derive(Debug)]
struct Latest<T>(Option<T>);

impl<T: Clone + Send + 'static> Slot<T> for Latest<T> {
    fn store(&mut self, value: &T) {
        self.0 = Some(value.clone());
    }

    fn replay(&self) -> Option<T> {
        self.0.clone()
    }
}

/// Always-present current value.
#[derive(Debug)]
struct Current<T>(T);

impl<T: Clone + Send + 'static> Slot<T> for Current<T> {
    fn store(&mut self, value: &T) {
        self.0 = value.clone();
    }

    fn replay(&self) -> Option<T> {
        Some(self.0.clone())
    }
}

#[derive(Debug)]
struct Registered<T> {
    id: u64,
    /// Sequence number of the last push made before this observer attached.
    since: u64,
    observer: Observer<T>,
}

#[derive(Debug)]
struct Delivery<T> {
    seq: u64,
    notification: Notification<T>,
    /// Replays go to one observer only.
    target: Option<u64>,
}

#[derive(Debug)]
struct SubjectState<T, S> {
    slot: S,
    observers: Vec<Registered<T>>,
    next_id: u64,
    seq: u64,
    pending: VecDeque<Delivery<T>>,
    delivering: bool,
    terminal: Option<Notification<T>>,
}

impl<T: Clone, S> SubjectState<T, S> {
    fn enqueue(&mut self, notification: Notification<T>) {
        self.seq += 1;
        self.pending.push_back(Delivery {
            seq: self.seq,
            notification,
            target: None,
        });
    }

    fn recipients(&mut self, delivery: &Delivery<T>) -> Vec<Observer<T>> {
        let eligible = |r: &Registered<T>| match delivery.target {
            Some(id) => r.id == id,
            None => r.since < delivery.seq,
        };

        if delivery.notification.is_terminal() {
            std::mem::take(&mut self.observers)
                .into_iter()
                .filter(|r| eligible(r))
                .map(|r| r.observer)
                .collect()
        } else {
            self.observers
                .iter()
                .filter(|r| eligible(*r))
                .map(|r| r.observer.clone())
                .collect()
        }
    }
}

/// Hand out queued notifications unless another call is already doing so.
fn drain<T, S>(state: &Mutex<SubjectState<T, S>>)
where
    T: Clone,
{
    {
        let mut guard = lock(state);
        if guard.delivering {
            return;
        }
        guard.delivering = true;
    }
    let _reset = ResetOnPanic(state);

    loop {
        let (notification, observers) = {
            let mut guard = lock(state);
            let Some(delivery) = guard.pending.pop_front() else {
                guard.delivering = false;
                return;
            };
            let observers = guard.recipients(&delivery);
            (delivery.notification, observers)
        };

        for observer in observers {
            observer.emit(notification.clone());
        }
    }
}

/// Releases delivery ownership if an observer panics mid-drain.
struct ResetOnPanic<'a, T, S>(&'a Mutex<SubjectState<T, S>>);

impl<T, S> Drop for ResetOnPanic<'_, T, S> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            lock(self.0).delivering = false;
        }
    }
}

/// Shared fan-out core for every subject flavour.
#[derive(Debug)]
struct SubjectCore<T, S> {
    state: Arc<Mutex<SubjectState<T, S>>>,
}

impl<T, S> SubjectCore<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: Slot<T>,
{
    fn new(slot: S) -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                slot,
                observers: Vec::new(),
                next_id: 0,
                seq: 0,
                pending: VecDeque::new(),
                delivering: false,
                terminal: None,
            })),
        }
    }

    /// Compute the next value from the slot and fan it out.
    ///
    /// Returns `false` (and does nothing) once the subject is terminated.
    fn push_with(&self, compute: impl FnOnce(&S) -> T) -> bool {
        {
            let mut state = lock(&self.state);
            if state.terminal.is_some() {
                return false;
            }
            let value = compute(&state.slot);
            state.slot.store(&value);
            state.enqueue(Notification::Next(value));
        }
        drain(&self.state);
        true
    }

    fn terminate(&self, notification: Notification<T>) -> bool {
        {
            let mut state = lock(&self.state);
            if state.terminal.is_some() {
                return false;
            }
            state.terminal = Some(notification.clone());
            state.enqueue(notification);
        }
        drain(&self.state);
        true
    }

    fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.state).slot)
    }

    fn observer_count(&self) -> usize {
        lock(&self.state).observers.len()
    }

    fn is_closed(&self) -> bool {
        lock(&self.state).terminal.is_some()
    }

    fn observable(&self) -> Observable<T> {
        let state = Arc::clone(&self.state);

        Observable::new(move |observer: Observer<T>| {
            let attached = {
                let mut guard = lock(&state);
                match &guard.terminal {
                    Some(terminal) => Err(terminal.clone()),
                    None => {
                        let id = guard.next_id;
                        guard.next_id += 1;
                        let since = guard.seq;
                        guard.observers.push(Registered {
                            id,
                            since,
                            observer: observer.clone(),
                        });
                        if let Some(value) = guard.slot.replay() {
                            guard.pending.push_back(Delivery {
                                seq: since,
                                notification: Notification::Next(value),
                                target: Some(id),
                            });
                        }
                        Ok(id)
                    }
                }
            };

            match attached {
                Err(terminal) => {
                    observer.emit(terminal);
                    Subscription::empty()
                }
                Ok(id) => {
                    drain(&state);
                    let weak: Weak<Mutex<SubjectState<T, S>>> = Arc::downgrade(&state);
                    Subscription::new(move || {
                        if let Some(state) = weak.upgrade() {
                            lock(&state).observers.retain(|r| r.id != id);
                        }
                    })
                }
            }
        })
    }
}

/// Plain multicast subject: late subscribers only see later values.
#[derive(Debug)]
pub struct Subject<T> {
    core: SubjectCore<T, NoReplay>,
}

impl<T> Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            core: SubjectCore::new(NoReplay),
        }
    }

    pub fn next(&self, value: T) -> bool {
        self.core.push_with(move |_| value)
    }

    pub fn error(&self, error: StreamError) -> bool {
        self.core.terminate(Notification::Error(error))
    }

    pub fn complete(&self) -> bool {
        self.core.terminate(Notification::Complete)
    }

    /// Read-only view of this subject.
    pub fn as_observable(&self) -> Observable<T> {
        self.core.observable()
    }

    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}

impl<T> Default for Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Subject that always holds a current value and replays it on subscribe.
#[derive(Debug)]
pub struct BehaviorSubject<T> {
    core: SubjectCore<T, Current<T>>,
}

impl<T> BehaviorSubject<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            core: SubjectCore::new(Current(initial)),
        }
    }

    pub fn next(&self, value: T) -> bool {
        self.core.push_with(move |_| value)
    }

    /// Atomically derive the next value from the current one.
    ///
    /// Concurrent updates never lose each other's changes. `f` runs under the
    /// subject's lock and must not call back into this subject.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        self.core.push_with(|current| f(&current.0))
    }

    pub fn value(&self) -> T {
        self.core.read(|current| current.0.clone())
    }

    pub fn error(&self, error: StreamError) -> bool {
        self.core.terminate(Notification::Error(error))
    }

    pub fn complete(&self) -> bool {
        self.core.terminate(Notification::Complete)
    }

    pub fn as_observable(&self) -> Observable<T> {
        self.core.observable()
    }

    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}

/// Subject that starts empty and replays its most recent value on subscribe.
///
/// Used for fetched snapshots: nothing is emitted until the first snapshot
/// arrives, and late subscribers immediately see the latest one.
#[derive(Debug)]
pub struct ReplaySubject<T> {
    core: SubjectCore<T, Latest<T>>,
}

impl<T> ReplaySubject<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            core: SubjectCore::new(Latest(None)),
        }
    }

    pub fn next(&self, value: T) -> bool {
        self.core.push_with(move |_| value)
    }

    /// Most recent value, if any has been pushed.
    pub fn value(&self) -> Option<T> {
        self.core.read(|latest| latest.0.clone())
    }

    pub fn error(&self, error: StreamError) -> bool {
        self.core.terminate(Notification::Error(error))
    }

    pub fn complete(&self) -> bool {
        self.core.terminate(Notification::Complete)
    }

    pub fn as_observable(&self) -> Observable<T> {
        self.core.observable()
    }

    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}

impl<T> Default for ReplaySubject<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Clone + Send + Sync + 'static>(
        source: &Observable<T>,
    ) -> (Arc<Mutex<Vec<Notification<T>>>>, Subscription) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let sub = source.subscribe(move |n| sink.lock().unwrap().push(n));
        (log, sub)
    }

    #[test]
    fn subject_does_not_replay_to_late_subscribers() {
        let subject = Subject::new();
        subject.next(1);

        let (log, _sub) = collect(&subject.as_observable());
        subject.next(2);

        assert_eq!(*log.lock().unwrap(), vec![Notification::Next(2)]);
    }

    #[test]
    fn behavior_subject_replays_current_value() {
        let subject = BehaviorSubject::new("all");
        subject.next("tools");

        let (log, _sub) = collect(&subject.as_observable());

        assert_eq!(*log.lock().unwrap(), vec![Notification::Next("tools")]);
        assert_eq!(subject.value(), "tools");
    }

    #[test]
    fn behavior_subject_update_builds_on_current_value() {
        let subject = BehaviorSubject::new(Vec::<u32>::new());
        let (log, _sub) = collect(&subject.as_observable());

        subject.update(|list| {
            let mut list = list.clone();
            list.push(1);
            list
        });
        subject.update(|list| {
            let mut list = list.clone();
            list.push(2);
            list
        });

        assert_eq!(subject.value(), vec![1, 2]);
        assert_eq!(
            log.lock().unwrap().last(),
            Some(&Notification::Next(vec![1, 2]))
        );
    }

    #[test]
    fn replay_subject_is_silent_until_first_value() {
        let subject = ReplaySubject::new();
        let (log, _sub) = collect(&subject.as_observable());
        assert!(log.lock().unwrap().is_empty());

        subject.next(7);
        let (late, _late_sub) = collect(&subject.as_observable());

        assert_eq!(*log.lock().unwrap(), vec![Notification::Next(7)]);
        assert_eq!(*late.lock().unwrap(), vec![Notification::Next(7)]);
    }

    #[test]
    fn error_terminates_and_is_replayed_to_late_subscribers() {
        let subject = ReplaySubject::new();
        subject.next(1);
        assert!(subject.error(StreamError::new("boom")));
        assert!(!subject.next(2));
        assert!(subject.is_closed());

        let (log, _sub) = collect(&subject.as_observable());
        assert_eq!(
            *log.lock().unwrap(),
            vec![Notification::Error(StreamError::new("boom"))]
        );
    }

    #[test]
    fn dropping_subscription_detaches_observer() {
        let subject = Subject::new();
        let (log, sub) = collect(&subject.as_observable());
        assert_eq!(subject.observer_count(), 1);

        drop(sub);
        assert_eq!(subject.observer_count(), 0);

        subject.next(1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn reentrant_emission_from_observer_does_not_deadlock() {
        let subject = Arc::new(BehaviorSubject::new(0u32));
        let inner = Arc::clone(&subject);
        let _sub = subject.as_observable().subscribe(move |n| {
            if let Notification::Next(v) = n {
                if v == 1 {
                    inner.next(2);
                }
            }
        });

        subject.next(1);
        assert_eq!(subject.value(), 2);
    }

    fn pushed(list: &[u32], value: u32) -> Vec<u32> {
        let mut next = list.to_vec();
        next.push(value);
        next
    }

    #[test]
    fn nested_emission_is_delivered_after_the_current_one() {
        let subject = Arc::new(BehaviorSubject::new(0u32));
        let inner = Arc::clone(&subject);
        let _first = subject.as_observable().subscribe(move |n| {
            if n == Notification::Next(1) {
                inner.next(2);
            }
        });
        let (log, _second) = collect(&subject.as_observable());

        subject.next(1);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Notification::Next(0),
                Notification::Next(1),
                Notification::Next(2)
            ]
        );
    }

    #[test]
    fn concurrent_updates_reach_every_observer_in_order() {
        use std::sync::mpsc;
        use std::thread;

        let subject = Arc::new(BehaviorSubject::new(Vec::<u32>::new()));
        let (entered_tx, entered_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let release_rx = Mutex::new(release_rx);

        // The first observer stalls the writer thread on its first update.
        let stalled = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stalled);
        let _stalled_sub = subject.as_observable().subscribe(move |n| {
            if let Notification::Next(list) = n {
                let stall = list == vec![1];
                sink.lock().unwrap().push(list);
                if stall {
                    entered_tx.lock().unwrap().send(()).unwrap();
                    release_rx.lock().unwrap().recv().unwrap();
                }
            }
        });
        let (log, _sub) = collect(&subject.as_observable());

        let writer = Arc::clone(&subject);
        let handle = thread::spawn(move || writer.update(|list| pushed(list, 1)));
        entered_rx.recv().unwrap();

        assert!(subject.update(|list| pushed(list, 2)));
        release_tx.send(()).unwrap();
        assert!(handle.join().unwrap());

        assert_eq!(subject.value(), vec![1, 2]);
        assert_eq!(
            *stalled.lock().unwrap(),
            vec![vec![], vec![1], vec![1, 2]]
        );
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Notification::Next(vec![]),
                Notification::Next(vec![1]),
                Notification::Next(vec![1, 2])
            ]
        );
    }

    #[test]
    fn late_subscriber_during_delivery_sees_replay_before_newer_values() {
        let subject = Arc::new(BehaviorSubject::new(0u32));
        let late_log = Arc::new(Mutex::new(Vec::new()));
        let late_subs = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::clone(&subject);
        let sink = Arc::clone(&late_log);
        let subs = Arc::clone(&late_subs);
        let _sub = subject.as_observable().subscribe(move |n| {
            if n == Notification::Next(1) {
                let sink = Arc::clone(&sink);
                let late = inner
                    .as_observable()
                    .subscribe(move |n| sink.lock().unwrap().push(n));
                subs.lock().unwrap().push(late);
                inner.next(2);
            }
        });

        subject.next(1);

        assert_eq!(
            *late_log.lock().unwrap(),
            vec![Notification::Next(1), Notification::Next(2)]
        );
    }

    #[test]
    fn completion_is_delivered_after_queued_values() {
        let subject = Arc::new(Subject::new());
        let inner = Arc::clone(&subject);
        let _first = subject.as_observable().subscribe(move |n| {
            if n == Notification::Next(1) {
                inner.next(2);
                inner.complete();
            }
        });
        let (log, _second) = collect(&subject.as_observable());

        subject.next(1);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Notification::Next(1),
                Notification::Next(2),
                Notification::Complete
            ]
        );
        assert_eq!(subject.observer_count(), 0);
    }
}
