//! Error raised when blocking extraction of an async vessel fails.

use crate::deferred::{Fault, WaitError};
use thiserror::Error;

/// A pending vessel settled without a value, or the wait for it gave up.
///
/// Carries the original cause. [`AsyncVessel::unwrap`](super::AsyncVessel::unwrap)
/// panics with this error as the payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("async unwrap failed: {cause}")]
pub struct AsyncUnwrapError<E> {
    cause: Fault<E>,
}

impl<E> AsyncUnwrapError<E> {
    pub fn new(cause: Fault<E>) -> Self {
        Self { cause }
    }

    pub fn cause(&self) -> &Fault<E> {
        &self.cause
    }

    pub fn into_cause(self) -> Fault<E> {
        self.cause
    }

    pub fn is_timeout(&self) -> bool {
        self.cause.is_timeout()
    }
}

impl<E> From<Fault<E>> for AsyncUnwrapError<E> {
    fn from(cause: Fault<E>) -> Self {
        Self::new(cause)
    }
}

impl<E> From<WaitError> for AsyncUnwrapError<E> {
    fn from(wait: WaitError) -> Self {
        Self::new(Fault::Wait(wait))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn message_carries_original_cause() {
        let err = AsyncUnwrapError::new(Fault::Failed("connection reset"));
        assert_eq!(err.to_string(), "async unwrap failed: connection reset");
        assert!(!err.is_timeout());
    }

    #[test]
    fn timeout_has_its_own_message() {
        let err: AsyncUnwrapError<String> =
            WaitError::TimedOut(Duration::from_millis(250)).into();

        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "async unwrap failed: timed out after 250ms waiting for the pending computation"
        );
        assert_eq!(
            err.into_cause(),
            Fault::Wait(WaitError::TimedOut(Duration::from_millis(250)))
        );
    }
}
