//! Completion handle for asynchronous dispatch.
//!
//! [`DispatchHandle`] is the value returned by
//! [`Event::dispatch_async`](crate::Event::dispatch_async). It wraps the
//! tokio `JoinHandle` of the offloaded pass and resolves once every handler
//! in that pass's snapshot has been invoked.
//!
//! There is no cancellation surface: the handle supports waiting for
//! completion and observing a handler panic, nothing else.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::DispatchError;

/// Future that resolves when one async dispatch pass has finished.
///
/// Awaiting yields `Ok(())` once all snapshot handlers ran, or
/// [`DispatchError::HandlerPanicked`] if one of them panicked (the rest of
/// that pass was skipped). Dropping the handle detaches the pass; it keeps
/// running to completion on the blocking pool.
#[derive(Debug)]
pub struct DispatchHandle {
    join: JoinHandle<()>,
}

impl DispatchHandle {
    pub(crate) fn new(join: JoinHandle<()>) -> Self {
        Self { join }
    }

    /// True once the dispatch pass has finished (successfully or by panic).
    ///
    /// Non-blocking; useful for polling completion without awaiting.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Future for DispatchHandle {
    type Output = Result<(), DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.join)
            .poll(cx)
            .map(|res| res.map_err(DispatchError::from))
    }
}
