//! Asynchronous vessel layered over a [`Completion`](crate::deferred::Completion).
//!
//! [`AsyncVessel`] mirrors the synchronous combinators, but a transformation
//! on a pending computation is registered and runs later, on the thread that
//! settles it. Only the extraction methods block:
//!
//! - [`AsyncVessel::unwrap`] and [`AsyncVessel::unwrap_timeout`] panic when
//!   no value is produced
//! - [`AsyncVessel::to_result`] and [`AsyncVessel::to_result_timeout`] return
//!   the outcome as a [`Vessel`](crate::Vessel)
//!
//! `.await` is the non-blocking counterpart of `to_result`.
//!
//! Whenever a failure surfaces, the caller sees the computation's own error,
//! never the [`Fault`](crate::deferred::Fault) envelope it travelled in.

mod error;
mod vessel;

pub use error::AsyncUnwrapError;
pub use vessel::{AsyncVessel, Settlement};
