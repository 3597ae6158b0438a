//! The future-like primitive that [`AsyncVessel`](crate::AsyncVessel) builds on.
//!
//! The async side of the crate never schedules work of its own. It composes
//! on top of a handle to a computation that something else drives to
//! completion. That handle is the [`Completion`] capability:
//!
//! - register a callback to run once the computation settles
//! - block, optionally with a timeout, until it settles
//! - peek, without blocking, whether it already has
//!
//! Hosts can wrap whatever they use for asynchrony (thread pools, runtimes,
//! mailboxes) behind this trait. The crate ships one implementation,
//! [`promise`], which it also uses for the wrappers it derives internally.
//!
//! # Example
//!
//! ```rust
//! use vessel::deferred::{promise, Completion};
//! use std::thread;
//!
//! let (producer, handle) = promise::<u32, String>();
//! thread::spawn(move || producer.complete(7));
//!
//! assert_eq!(Box::new(handle).wait(None), Ok(7));
//! ```

mod error;
mod promise;
mod timer;

pub use error::{Fault, WaitError};
pub use promise::{promise, Deferred, Promise};
pub use timer::{Delayer, DelayerBuilder, Scheduled, Timer, TimerTask};

use std::time::Duration;

/// What a settled computation resolved to.
pub type Outcome<T, E> = Result<T, Fault<E>>;

/// Callback registered with [`Completion::on_settle`].
pub type SettleCallback<T, E> = Box<dyn FnOnce(Outcome<T, E>) + Send + 'static>;

/// Handle to an externally driven computation that settles exactly once.
///
/// Consuming methods take `Box<Self>` so the trait stays usable as
/// `Box<dyn Completion<T, E>>`. A handle has a single consumer: whichever of
/// `on_settle` or `wait` is called receives the outcome.
pub trait Completion<T, E>: Send + 'static {
    /// Run `callback` with the outcome once the computation settles.
    ///
    /// When the computation has already settled, `callback` runs inline on
    /// the calling thread before this returns. Otherwise it runs later on
    /// whichever thread settles the computation.
    fn on_settle(self: Box<Self>, callback: SettleCallback<T, E>);

    /// Block the calling thread until the computation settles, or until
    /// `timeout` elapses. A timeout is reported as
    /// [`WaitError::TimedOut`] and does not stop the computation.
    fn wait(self: Box<Self>, timeout: Option<Duration>) -> Outcome<T, E>;

    /// Best-effort, non-blocking check for whether the computation settled.
    fn is_settled(&self) -> bool;
}
