//! # evoke
//!
//! **Evoke** is a small thread-safe event/handler primitive for in-process
//! decoupled communication: a publisher holds an [`Event`], any number of
//! subscribers register callbacks as [`Handler`]s, and the publisher later
//! dispatches a typed argument to everyone registered — synchronously on the
//! calling thread, or asynchronously on the tokio blocking pool.
//!
//! ## Architecture
//! ```text
//!  subscriber ── Handler::new(closure) ──► Event::subscribe ──► HandlerId
//!                                              │
//!                                              ▼
//!                               ┌───────────────────────────┐
//!                               │ Event<T>                  │
//!                               │  Mutex<Vec<Handler<T>>>   │
//!                               └──────┬────────────────────┘
//!                                      │ snapshot under lock
//!  publisher ── dispatch(arg) ─────────┤
//!                                      ▼ lock released
//!                        h1(arg) ─► h2(arg) ─► h3(arg)   (insertion order)
//!
//!  publisher ── dispatch_async(arg) ──► spawn_blocking ──► same loop
//!                                              │
//!                                              ▼
//!                                       DispatchHandle (await completion)
//! ```
//!
//! ## Guarantees
//! - Handler ids come from one process-wide atomic counter: unique for the
//!   process lifetime, safe to mint from any thread.
//! - Dispatch operates on a snapshot cloned under the lock; the lock is
//!   never held while a callable runs, so handlers may mutate or dispatch
//!   their own `Event` reentrantly.
//! - Within one pass, handlers run sequentially in insertion order and each
//!   receives its own clone of the argument.
//!
//! ## Non-guarantees
//! - No ordering across concurrent dispatch passes.
//! - No queuing, prioritization, filtering, or cancellation of a pass in
//!   flight.
//! - Thread-safety of state captured inside a callable is the subscriber's
//!   own concern.
//!
//! ## Features
//! | Area           | Description                                             | Key types                          |
//! |----------------|---------------------------------------------------------|------------------------------------|
//! | **Handlers**   | Callbacks bound to durable, process-unique identities.  | [`Handler`], [`HandlerId`]         |
//! | **Registry**   | Subscribe/unsubscribe by value or id, from any thread.  | [`Event`]                          |
//! | **Dispatch**   | Synchronous and offloaded passes over a snapshot.       | [`Event`], [`DispatchHandle`]      |
//! | **Errors**     | Typed async-pass failures (handler panics).             | [`DispatchError`]                  |
//!
//! ## Example
//! ```rust
//! use evoke::{Event, Handler};
//!
//! struct Door {
//!     opened: Event<u32>,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let door = Door { opened: Event::new() };
//!
//!     // Subscribe with a handler value we keep for later unsubscription.
//!     let watcher = Handler::new(|floor: u32| println!("door opened on floor {floor}"));
//!     door.opened.subscribe(watcher.clone());
//!
//!     // Closures work directly too; the id is enough to unsubscribe.
//!     let id = door.opened.subscribe_fn(|floor| println!("second observer: {floor}"));
//!
//!     door.opened.dispatch(3);                       // both run, in order
//!     door.opened.dispatch_async(4).await.unwrap();  // same, on the blocking pool
//!
//!     assert!(door.opened.unsubscribe(&watcher));
//!     assert!(door.opened.unsubscribe_id(id));
//!     assert!(door.opened.is_empty());
//! }
//! ```

mod error;
mod event;
mod handle;
mod handler;

// ---- Public re-exports ----

pub use error::DispatchError;
pub use event::Event;
pub use handle::DispatchHandle;
pub use handler::{Handler, HandlerId};
