//! Error values produced by the vessel algebra itself.
//!
//! Domain errors belong to the caller and flow through the Failure channel
//! untouched. The types here are the few conditions the library synthesizes:
//! merged failures from [`zip`](crate::zip) and [`one_of`](crate::one_of),
//! misuse of the API, and panics caught at an explicit unwind boundary.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Type-erased, thread-safe error used to carry combined causes.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Why two vessels could not be merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombineReason {
    /// Both operands were failures.
    BothFailed,
    /// Only the first operand was a failure.
    FirstFailed,
    /// Only the second operand was a failure.
    SecondFailed,
}

impl CombineReason {
    /// Human-readable tag for this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BothFailed => "both failed",
            Self::FirstFailed => "first failed",
            Self::SecondFailed => "second failed",
        }
    }
}

impl fmt::Display for CombineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure produced when two vessels are merged and at least one failed.
///
/// A single failing operand always lands in the first cause slot, whichever
/// side it came from, so both single-failure shapes look the same. The second
/// slot is only populated when both operands failed.
///
/// # Example
///
/// ```rust
/// use vessel::{zip, BoxError, CombineFailure, CombineReason, Vessel};
///
/// let first: Vessel<i32, BoxError> = Vessel::success(1);
/// let second: Vessel<i32, BoxError> = Vessel::failure("offline".into());
///
/// let merged = zip(first, second, |a, b| a + b);
/// let err = merged.err().unwrap();
/// let combined = err.downcast_ref::<CombineFailure>().unwrap();
///
/// assert_eq!(combined.reason(), CombineReason::SecondFailed);
/// assert_eq!(combined.cause_first().to_string(), "offline");
/// assert!(combined.cause_second().is_none());
/// ```
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct CombineFailure {
    reason: CombineReason,
    #[source]
    first: BoxError,
    second: Option<BoxError>,
}

impl CombineFailure {
    /// Both operands failed; causes keep operand order.
    pub fn both(first: impl Into<BoxError>, second: impl Into<BoxError>) -> Self {
        Self {
            reason: CombineReason::BothFailed,
            first: first.into(),
            second: Some(second.into()),
        }
    }

    /// Only the first operand failed.
    pub fn first(cause: impl Into<BoxError>) -> Self {
        Self {
            reason: CombineReason::FirstFailed,
            first: cause.into(),
            second: None,
        }
    }

    /// Only the second operand failed. The cause still occupies the first slot.
    pub fn second(cause: impl Into<BoxError>) -> Self {
        Self {
            reason: CombineReason::SecondFailed,
            first: cause.into(),
            second: None,
        }
    }

    pub fn reason(&self) -> CombineReason {
        self.reason
    }

    pub fn cause_first(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.first.as_ref()
    }

    pub fn cause_second(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.second.as_deref()
    }

    /// Take ownership of both cause slots.
    pub fn into_causes(self) -> (BoxError, Option<BoxError>) {
        (self.first, self.second)
    }
}

/// Misuse of the API. These are raised (panicked) rather than returned as data,
/// except by the `*_checked` constructors that hand them back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("value not present: this vessel is a failure")]
    ValueNotPresent,
}

/// A panic captured by [`Vessel::lift_unwind`](crate::Vessel::lift_unwind).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("computation panicked: {message}")]
pub struct Panicked {
    pub message: String,
}

impl Panicked {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}
