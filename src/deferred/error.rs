//! How a pending computation reports that it did not produce a value.

use std::time::Duration;
use thiserror::Error;

/// Conditions a wait can end in that are not the computation's own error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("timed out after {0:?} waiting for the pending computation")]
    TimedOut(Duration),

    #[error("pending computation was dropped before it settled")]
    Abandoned,
}

/// Failure side of a settled or waited-on [`Completion`](super::Completion).
///
/// `Failed` is the envelope around the computation's own error. Anything that
/// surfaces a failure to callers strips it with [`into_error`](Self::into_error)
/// so they see the original cause rather than the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault<E> {
    #[error("{0}")]
    Failed(E),

    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl<E> Fault<E> {
    pub fn map<T, F>(self, f: F) -> Fault<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Fault::Failed(err) => Fault::Failed(f(err)),
            Fault::Wait(wait) => Fault::Wait(wait),
        }
    }

    /// The original cause, with wait conditions converted into `E`.
    pub fn into_error(self) -> E
    where
        E: From<WaitError>,
    {
        match self {
            Fault::Failed(err) => err,
            Fault::Wait(wait) => wait.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Fault::Wait(WaitError::TimedOut(_)))
    }
}
