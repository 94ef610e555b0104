//! Error types for asynchronous dispatch.
//!
//! Synchronous [`dispatch`](crate::Event::dispatch) has no error surface: a
//! panicking handler simply unwinds through the caller. Asynchronous
//! dispatch runs on the tokio blocking pool, so failures come back through
//! the [`DispatchHandle`](crate::DispatchHandle) as a [`DispatchError`].

use std::any::Any;
use thiserror::Error;
use tokio::task::JoinError;

/// # Errors surfaced by an async dispatch pass.
///
/// `unsubscribe`/`unsubscribe_id` returning `false` is a normal boolean
/// result, not an error; only the async completion path is fallible.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A handler panicked while the pass ran on the blocking pool.
    ///
    /// The remaining handlers of that pass were skipped. The panic payload,
    /// stringified, is carried as `reason`.
    #[error("handler panicked during async dispatch: {reason}")]
    HandlerPanicked {
        /// Stringified panic payload of the failing handler.
        reason: String,
    },

    /// The runtime aborted the dispatch task before it completed
    /// (e.g. runtime shutdown). Not reachable through this crate's API.
    #[error("async dispatch was cancelled before completion")]
    Cancelled,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use evoke::DispatchError;
    ///
    /// let err = DispatchError::HandlerPanicked { reason: "boom".into() };
    /// assert_eq!(err.as_label(), "dispatch_handler_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::HandlerPanicked { .. } => "dispatch_handler_panicked",
            DispatchError::Cancelled => "dispatch_cancelled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::HandlerPanicked { reason } => format!("handler panic: {reason}"),
            DispatchError::Cancelled => "cancelled".to_string(),
        }
    }

    /// True if the error carries a handler panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, DispatchError::HandlerPanicked { .. })
    }
}

impl From<JoinError> for DispatchError {
    fn from(err: JoinError) -> Self {
        match err.try_into_panic() {
            Ok(payload) => DispatchError::HandlerPanicked {
                reason: panic_message(payload.as_ref()),
            },
            Err(_) => DispatchError::Cancelled,
        }
    }
}

/// Best-effort stringification of a panic payload.
///
/// `panic!` with a literal yields `&str`; `format!`-style panics yield
/// `String`. Anything else is opaque.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
