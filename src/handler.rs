//! # Subscription unit: a callable bound to a durable identity.
//!
//! [`Handler`] pairs a callback with a [`HandlerId`] minted from a global
//! monotonic counter. The id is the handler's identity: equality, hashing
//! and removal from an [`Event`](crate::Event) all go through it, never
//! through the callable itself.
//!
//! ## Rules
//! - Ids are unique for the lifetime of the process (atomic counter).
//! - Cloning a handler shares the callable and **keeps the id**; a clone is
//!   the same subscription, not a new one.
//! - Only [`Handler::new`] (and [`Event::subscribe_fn`](crate::Event::subscribe_fn),
//!   which calls it) mints a fresh id.
//!
//! ## Example
//! ```rust
//! use evoke::Handler;
//!
//! let h = Handler::new(|n: u32| println!("got {n}"));
//! let copy = h.clone();
//!
//! assert_eq!(h, copy);          // same id, same subscription
//! assert_eq!(h.id(), copy.id());
//! h.invoke(7);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global id counter. Starts at 1 so ids are always non-zero.
static HANDLER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identity of a registered handler, unique per process.
pub type HandlerId = u64;

/// A callback bound to a process-unique [`HandlerId`].
///
/// The callable runs on whatever thread drives the dispatch, so it must be
/// `Send + Sync`. Panics inside the callable are not caught here; they
/// propagate to the dispatching code (see
/// [`Event::dispatch`](crate::Event::dispatch) for the contract).
///
/// A `Handler` never owns the state its closure captures beyond what the
/// closure itself holds; dropping the last clone drops the closure.
pub struct Handler<T> {
    id: HandlerId,
    callable: Arc<dyn Fn(T) + Send + Sync + 'static>,
}

impl<T> Handler<T> {
    /// Wraps `f` and mints a fresh id.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            id: HANDLER_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            callable: Arc::new(f),
        }
    }

    /// Returns this handler's identity.
    #[inline]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Calls the wrapped callable with `arg`.
    #[inline]
    pub fn invoke(&self, arg: T) {
        (self.callable)(arg);
    }
}

impl<T> Clone for Handler<T> {
    /// Shares the callable and keeps the id; cloning never mints a new identity.
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callable: Arc::clone(&self.callable),
        }
    }
}

impl<T> PartialEq for Handler<T> {
    /// Handlers are equal iff their ids are equal; the callable is irrelevant.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handler<T> {}

impl<T> Hash for Handler<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::thread;

    #[test]
    fn test_ids_are_unique_and_nonzero() {
        let a = Handler::new(|_: u8| {});
        let b = Handler::new(|_: u8| {});
        assert_ne!(a.id(), 0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_ids_are_unique_across_threads() {
        let mut joins = Vec::new();
        for _ in 0..8 {
            joins.push(thread::spawn(|| {
                (0..100)
                    .map(|_| Handler::new(|_: u8| {}).id())
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for j in joins {
            for id in j.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 800);
    }

    #[test]
    fn test_clone_preserves_id_and_equality() {
        let h = Handler::new(|_: u8| {});
        let copy = h.clone();
        assert_eq!(h.id(), copy.id());
        assert_eq!(h, copy);

        let other = Handler::new(|_: u8| {});
        assert_ne!(h, other);
    }

    #[test]
    fn test_invoke_forwards_argument() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let h = Handler::new(move |n: u32| sink.lock().unwrap().push(n));

        h.invoke(3);
        h.clone().invoke(5);
        assert_eq!(*seen.lock().unwrap(), vec![3, 5]);
    }
}
