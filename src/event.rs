//! # Event registry and dispatcher.
//!
//! [`Event`] owns an insertion-ordered sequence of [`Handler`]s behind a
//! single mutex and drives both dispatch paths.
//!
//! ## Architecture
//! ```text
//! dispatch(arg)
//!     │
//!     ├─► lock ─► clone handler sequence (snapshot) ─► unlock
//!     │
//!     └─► for handler in snapshot:          (lock NOT held)
//!             handler.invoke(arg.clone())
//!
//! dispatch_async(arg)
//!     │
//!     ├─► snapshot under lock (calling thread)
//!     └─► spawn_blocking ─► same sequential loop ─► DispatchHandle
//! ```
//!
//! ## Rules
//! - The lock guards only the handler sequence and is held only for append,
//!   scan-and-remove, and the snapshot clone. It is **never** held while a
//!   callable runs, so handlers may call `subscribe` / `unsubscribe` /
//!   `dispatch` on the same `Event` reentrantly without deadlocking.
//! - Handlers fire in insertion order within one snapshot. Mutations made
//!   during a pass affect only later passes, never the one in flight.
//! - Each handler receives its own clone of the argument; a handler mutating
//!   its copy never affects what the next handler sees.
//! - A panicking handler unwinds through `dispatch` and skips the rest of
//!   that pass. On the async path the panic is reported through the
//!   returned [`DispatchHandle`] instead (see [`crate::DispatchError`]).
//!
//! ## Example
//! ```rust
//! use evoke::Event;
//!
//! let event = Event::new();
//! let id = event.subscribe_fn(|n: u32| println!("observed {n}"));
//!
//! event.dispatch(42);
//! assert!(event.unsubscribe_id(id));
//! event.dispatch(7); // nobody left, immediate no-op
//! ```

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use parking_lot::Mutex;

use crate::error::panic_message;
use crate::handle::DispatchHandle;
use crate::handler::{Handler, HandlerId};

/// Thread-safe registry of [`Handler`]s with snapshot-based dispatch.
///
/// Subscribing the same `Handler` value (or a clone of it) twice yields two
/// entries sharing one id; `unsubscribe` removes only the first match,
/// leaving the duplicate registered. This mirrors the append-without-
/// duplicate-check contract and is intentional.
pub struct Event<T> {
    handlers: Mutex<Vec<Handler<T>>>,
}

impl<T> Event<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Creates an empty registry with room for `capacity` handlers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handlers: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends `handler` to the end of the sequence and returns its id.
    ///
    /// Always succeeds: no capacity limit, no duplicate rejection.
    pub fn subscribe(&self, handler: Handler<T>) -> HandlerId {
        let id = handler.id();
        self.handlers.lock().push(handler);
        id
    }

    /// Wraps `f` in a fresh [`Handler`] (minting a new id) and subscribes it.
    ///
    /// Keep a clone of a [`Handler`] (or the returned id) around if you need
    /// to unsubscribe later.
    pub fn subscribe_fn<F>(&self, f: F) -> HandlerId
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(Handler::new(f))
    }

    /// Removes the first entry equal to `handler` (by id) in insertion order.
    ///
    /// Returns whether an entry was found. O(n) scan; absent handler is a
    /// normal `false`, not an error.
    pub fn unsubscribe(&self, handler: &Handler<T>) -> bool {
        self.unsubscribe_id(handler.id())
    }

    /// Removes the first entry whose id equals `id` in insertion order.
    ///
    /// Same first-match, O(n) semantics as [`Event::unsubscribe`], without
    /// needing the original `Handler` value.
    pub fn unsubscribe_id(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.lock();
        match handlers.iter().position(|h| h.id() == id) {
            Some(idx) => {
                handlers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// True if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    /// Snapshot of the handler sequence, taken under the lock.
    fn snapshot(&self) -> Vec<Handler<T>> {
        self.handlers.lock().clone()
    }

    /// Replaces this registry's handlers with a copy of `source`'s.
    ///
    /// Safe to call concurrently from multiple threads in any direction:
    /// both locks are taken in a fixed total order (instance address), so
    /// two threads assigning two `Event`s to each other in opposite
    /// directions cannot deadlock. Self-assignment is a no-op.
    pub fn copy_from(&self, source: &Self) {
        if std::ptr::eq(self, source) {
            return;
        }
        if (self as *const Self) < (source as *const Self) {
            let mut dst = self.handlers.lock();
            let src = source.handlers.lock();
            dst.clone_from(&src);
        } else {
            let src = source.handlers.lock();
            let mut dst = self.handlers.lock();
            dst.clone_from(&src);
        }
    }

    /// Exchanges the handler sequences of two registries.
    ///
    /// Same fixed lock order as [`Event::copy_from`]. Swapping an instance
    /// with itself is a no-op.
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        let (mut first, mut second) = if (self as *const Self) < (other as *const Self) {
            let a = self.handlers.lock();
            let b = other.handlers.lock();
            (a, b)
        } else {
            let b = other.handlers.lock();
            let a = self.handlers.lock();
            (a, b)
        };
        std::mem::swap(&mut *first, &mut *second);
    }
}

impl<T: Clone> Event<T> {
    /// Synchronously invokes every currently registered handler with `arg`.
    ///
    /// The sequence is snapshotted under the lock, then invoked on the
    /// calling thread in insertion order with the lock released, each
    /// handler getting its own clone of `arg`. A handler that mutates the
    /// registry as a side effect changes only subsequent passes.
    ///
    /// Fire-and-forget: no per-handler results are aggregated. With zero
    /// handlers this returns immediately.
    ///
    /// # Panics
    /// A panic inside a handler propagates to the caller; handlers after it
    /// in the same snapshot are skipped.
    pub fn dispatch(&self, arg: T) {
        let snapshot = self.snapshot();
        for handler in &snapshot {
            handler.invoke(arg.clone());
        }
    }
}

impl<T: Clone + Send + 'static> Event<T> {
    /// Runs one dispatch pass on the tokio blocking pool.
    ///
    /// The snapshot is taken under the lock on the calling thread; the
    /// sequential invocation loop then runs on a blocking-pool worker.
    /// Ordering within the pass is unchanged (insertion order). The caller
    /// may await the returned [`DispatchHandle`] to observe completion, or a
    /// handler panic as [`DispatchError::HandlerPanicked`](crate::DispatchError).
    ///
    /// A handler panic is additionally reported on stderr before being
    /// re-raised, so a discarded handle never swallows it silently.
    ///
    /// With zero handlers the returned handle completes immediately.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn dispatch_async(&self, arg: T) -> DispatchHandle {
        let snapshot = self.snapshot();
        let join = tokio::task::spawn_blocking(move || {
            let pass = catch_unwind(AssertUnwindSafe(|| {
                for handler in &snapshot {
                    handler.invoke(arg.clone());
                }
            }));
            if let Err(payload) = pass {
                eprintln!(
                    "[evoke] handler panicked during async dispatch: {}",
                    panic_message(payload.as_ref())
                );
                resume_unwind(payload);
            }
        });
        DispatchHandle::new(join)
    }
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Event<T> {
    /// Deep copy: the new registry holds its own copies of the handler
    /// sequence (sharing the callables, per [`Handler::clone`]).
    fn clone(&self) -> Self {
        Self {
            handlers: Mutex::new(self.snapshot()),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if std::ptr::eq(self, source) {
            return;
        }
        // `&mut self` is exclusive, so only the source needs locking.
        self.handlers.get_mut().clone_from(&source.handlers.lock());
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // try_lock: Debug may run from inside a handler while a mutation
        // holds the lock elsewhere.
        match self.handlers.try_lock() {
            Some(handlers) => {
                let ids: Vec<HandlerId> = handlers.iter().map(Handler::id).collect();
                f.debug_struct("Event").field("handlers", &ids).finish()
            }
            None => f.debug_struct("Event").field("handlers", &"<locked>").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::thread;

    fn recorder(
        log: &Arc<StdMutex<Vec<(u32, i32)>>>,
        tag: u32,
    ) -> impl Fn(i32) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |arg| log.lock().unwrap().push((tag, arg))
    }

    #[test]
    fn test_dispatch_runs_in_insertion_order() {
        let event = Event::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        event.subscribe_fn(recorder(&log, 1));
        event.subscribe_fn(recorder(&log, 2));
        event.subscribe_fn(recorder(&log, 3));

        event.dispatch(42);
        assert_eq!(*log.lock().unwrap(), vec![(1, 42), (2, 42), (3, 42)]);
    }

    #[test]
    fn test_dispatch_with_no_handlers_is_noop() {
        let event = Event::<i32>::new();
        event.dispatch(1);
        assert!(event.is_empty());
    }

    #[test]
    fn test_subscribe_dispatch_unsubscribe_scenario() {
        let event = Event::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        let id1 = event.subscribe_fn(recorder(&log, 1));
        let id2 = event.subscribe_fn(recorder(&log, 2));
        assert_ne!(id1, id2);

        event.dispatch(42);
        assert_eq!(*log.lock().unwrap(), vec![(1, 42), (2, 42)]);

        assert!(event.unsubscribe_id(id1));
        log.lock().unwrap().clear();

        event.dispatch(7);
        assert_eq!(*log.lock().unwrap(), vec![(2, 7)]);

        assert!(!event.unsubscribe_id(id1));
    }

    #[test]
    fn test_unsubscribe_by_value_and_absent() {
        let event = Event::<i32>::new();
        let handler = Handler::new(|_| {});
        let stranger = Handler::new(|_| {});

        event.subscribe(handler.clone());
        assert!(!event.unsubscribe(&stranger));
        assert!(event.unsubscribe(&handler));
        assert!(!event.unsubscribe(&handler));
        assert!(event.is_empty());
    }

    #[test]
    fn test_duplicate_registration_removes_first_match_only() {
        let event = Event::<i32>::new();
        let handler = Handler::new(|_| {});

        event.subscribe(handler.clone());
        event.subscribe(handler.clone());
        assert_eq!(event.len(), 2);

        assert!(event.unsubscribe(&handler));
        assert_eq!(event.len(), 1, "duplicate stays registered");

        assert!(event.unsubscribe(&handler));
        assert!(event.is_empty());
    }

    #[test]
    fn test_handler_subscribing_during_dispatch_runs_next_pass_only() {
        let event = Arc::new(Event::<i32>::new());
        let inner_hits = Arc::new(AtomicUsize::new(0));

        let ev = Arc::clone(&event);
        let hits = Arc::clone(&inner_hits);
        event.subscribe_fn(move |_| {
            let hits = Arc::clone(&hits);
            ev.subscribe_fn(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        });

        event.dispatch(1);
        assert_eq!(inner_hits.load(Ordering::SeqCst), 0, "not in the same pass");
        assert_eq!(event.len(), 2);

        event.dispatch(2);
        assert_eq!(inner_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_removing_itself_during_dispatch() {
        let event = Arc::new(Event::<i32>::new());
        let own_id = Arc::new(AtomicU64::new(0));
        let hits = Arc::new(AtomicUsize::new(0));

        let ev = Arc::clone(&event);
        let id_cell = Arc::clone(&own_id);
        let hit_count = Arc::clone(&hits);
        let id = event.subscribe_fn(move |_| {
            hit_count.fetch_add(1, Ordering::SeqCst);
            assert!(ev.unsubscribe_id(id_cell.load(Ordering::SeqCst)));
        });
        own_id.store(id, Ordering::SeqCst);

        event.dispatch(1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(event.is_empty());

        // Registry still works after the reentrant removal.
        event.dispatch(2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        event.subscribe_fn(|_| {});
        assert_eq!(event.len(), 1);
    }

    #[test]
    fn test_concurrent_subscribe_and_dispatch() {
        let event = Arc::new(Event::<i32>::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let mut joins = Vec::new();
        for _ in 0..4 {
            let ev = Arc::clone(&event);
            let hits = Arc::clone(&hits);
            joins.push(thread::spawn(move || {
                for _ in 0..50 {
                    let hits = Arc::clone(&hits);
                    let id = ev.subscribe_fn(move |_| {
                        hits.fetch_add(1, Ordering::SeqCst);
                    });
                    ev.dispatch(1);
                    assert!(ev.unsubscribe_id(id));
                }
            }));
        }
        for j in joins {
            j.join().unwrap();
        }
        assert!(event.is_empty());
    }

    #[test]
    fn test_clone_is_a_deep_copy() {
        let original = Event::<i32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        original.subscribe_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let copy = original.clone();
        assert_eq!(copy.len(), 1);

        copy.subscribe_fn(|_| {});
        assert_eq!(copy.len(), 2);
        assert_eq!(original.len(), 1, "copies diverge after cloning");

        // The cloned entry still drives the shared callable.
        copy.dispatch(1);
        original.dispatch(1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_copy_from_replaces_handlers() {
        let a = Event::<i32>::new();
        let b = Event::<i32>::new();
        a.subscribe_fn(|_| {});
        a.subscribe_fn(|_| {});
        b.subscribe_fn(|_| {});

        b.copy_from(&a);
        assert_eq!(b.len(), 2);
        assert_eq!(a.len(), 2);

        // Self-assignment is a no-op.
        a.copy_from(&a);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_opposed_copy_from_does_not_deadlock() {
        let a = Arc::new(Event::<i32>::new());
        let b = Arc::new(Event::<i32>::new());
        a.subscribe_fn(|_| {});
        b.subscribe_fn(|_| {});

        let (a1, b1) = (Arc::clone(&a), Arc::clone(&b));
        let fwd = thread::spawn(move || {
            for _ in 0..1000 {
                a1.copy_from(&b1);
            }
        });
        let (a2, b2) = (Arc::clone(&a), Arc::clone(&b));
        let rev = thread::spawn(move || {
            for _ in 0..1000 {
                b2.copy_from(&a2);
            }
        });

        fwd.join().unwrap();
        rev.join().unwrap();
    }

    #[test]
    fn test_swap_exchanges_sequences() {
        let a = Event::<i32>::new();
        let b = Event::<i32>::new();
        a.subscribe_fn(|_| {});
        a.subscribe_fn(|_| {});

        a.swap(&b);
        assert!(a.is_empty());
        assert_eq!(b.len(), 2);

        a.swap(&a);
        assert!(a.is_empty());
    }

    #[test]
    fn test_each_handler_gets_its_own_argument_copy() {
        let event = Event::<Vec<i32>>::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        let seen = Arc::clone(&log);
        event.subscribe_fn(move |mut v: Vec<i32>| {
            v.push(99); // mutation stays local to this handler's copy
            seen.lock().unwrap().push(v);
        });
        let seen = Arc::clone(&log);
        event.subscribe_fn(move |v: Vec<i32>| {
            seen.lock().unwrap().push(v);
        });

        event.dispatch(vec![1]);
        assert_eq!(*log.lock().unwrap(), vec![vec![1, 99], vec![1]]);
    }

    #[test]
    fn test_with_capacity_starts_empty() {
        let event = Event::<i32>::with_capacity(16);
        assert!(event.is_empty());
        assert_eq!(event.len(), 0);
    }
}
