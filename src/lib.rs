//! Vessel: a success/failure container with a composable combinator algebra.
//!
//! A [`Vessel`] holds either a success value or an error, and is built to be
//! transformed rather than inspected. Errors travel as data: combinators
//! route them around the functions you pass in, and only the explicit
//! extraction points (`unwrap`, `into_result`, `fold`) leave the container.
//!
//! # Core Concepts
//!
//! - **Vessel**: synchronous container with `map`, `flat_map`, `fold`,
//!   `filter`, `map_error`, `recover_with`
//! - **Combination**: [`zip`] and [`one_of`] merge two vessels and report
//!   failures as a [`CombineFailure`]; [`sequence`], [`traverse`] and
//!   `collect` turn many vessels into one
//! - **AsyncVessel**: the same algebra over a computation that settles
//!   later, with blocking and `.await` extraction
//! - **Deferred**: the [`Completion`] capability the async side composes on,
//!   plus a ready-made [`promise`]
//!
//! # Example
//!
//! ```rust
//! use vessel::{sequence, Vessel};
//!
//! fn parse(raw: &str) -> Vessel<u32, String> {
//!     Vessel::lift(|| raw.parse::<u32>()).map_error(|e| format!("{raw}: {e}"))
//! }
//!
//! let total = sequence(["3", "4", "5"].into_iter().map(parse))
//!     .map(|values| values.iter().sum::<u32>());
//! assert_eq!(total, Vessel::success(12));
//!
//! let label = parse("x").fold(|n| n.to_string(), |err| format!("invalid {err}"));
//! assert!(label.starts_with("invalid x"));
//! ```

pub mod async_vessel;
pub mod core;
pub mod deferred;
mod interop;
mod macros;

// Re-export commonly used types
pub use async_vessel::{AsyncUnwrapError, AsyncVessel};
pub use crate::core::{
    one_of, sequence, traverse, try_zip, zip, BoxError, Collector, CombineFailure, CombineReason,
    Panicked, UsageError, Vessel,
};
pub use deferred::{promise, Completion, Deferred, Fault, Promise, WaitError};
pub use interop::validate_all;
