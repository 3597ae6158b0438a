//! Synchronous vessel and its combinator algebra.
//!
//! This module is the pure core of the crate:
//! - [`Vessel`], the success/failure container and its instance combinators
//! - Multi-vessel merges: [`zip`], [`one_of`], [`sequence`], [`traverse`]
//! - Stream collection through [`Collector`] and `FromIterator`
//!
//! Nothing here blocks, spawns, or logs. Every operation runs to completion
//! on the calling thread.

mod collect;
mod combine;
mod error;
mod vessel;

pub use collect::Collector;
pub use combine::{one_of, sequence, traverse, try_zip, zip};
pub use error::{BoxError, CombineFailure, CombineReason, Panicked, UsageError};
pub use vessel::Vessel;
