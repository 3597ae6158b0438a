use super::error::AsyncUnwrapError;
use crate::core::{UsageError, Vessel};
use crate::deferred::{
    promise, Completion, Deferred, Delayer, Fault, Outcome, Promise, Scheduled, Timer, WaitError,
};
use parking_lot::Mutex;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// A vessel whose success value is still being computed elsewhere.
///
/// `Pending` wraps a [`Completion`] handle driven by something outside this
/// crate; `Failure` is an error that was known up front. An already-resolved
/// success is a `Pending` over a settled handle, so [`is_failure`] only ever
/// reports the up-front case.
///
/// Combinators never block. On `Pending` they register a continuation with
/// the handle and return a new `Pending` that settles once the continuation
/// has run, on whichever thread settled the source.
///
/// [`is_failure`]: AsyncVessel::is_failure
///
/// # Example
///
/// ```rust
/// use vessel::deferred::promise;
/// use vessel::AsyncVessel;
/// use std::thread;
///
/// let (producer, handle) = promise::<u32, String>();
/// let doubled = AsyncVessel::from_handle(handle).map_async(|n| n * 2);
///
/// thread::spawn(move || producer.complete(21));
/// assert_eq!(doubled.unwrap(), 42);
/// ```
#[must_use]
pub enum AsyncVessel<V, E> {
    Pending(Box<dyn Completion<V, E>>),
    Failure(E),
}

fn settled_vessel<V, E>(outcome: Outcome<V, E>) -> Vessel<V, E>
where
    E: From<WaitError>,
{
    match outcome {
        Ok(value) => Vessel::Success(value),
        Err(fault) => Vessel::Failure(fault.into_error()),
    }
}

fn derive<V, E, R, T, F>(handle: Box<dyn Completion<V, E>>, continuation: F) -> AsyncVessel<R, T>
where
    V: 'static,
    E: 'static,
    R: Send + 'static,
    T: Send + 'static,
    F: FnOnce(Outcome<V, E>, Promise<R, T>) + Send + 'static,
{
    let (producer, derived) = promise::<R, T>();
    handle.on_settle(Box::new(move |outcome: Outcome<V, E>| {
        continuation(outcome, producer)
    }));
    AsyncVessel::Pending(Box::new(derived))
}

// Shared between a timed vessel's source callback and its timer task.
// Whichever side takes `producer` first settles the derived vessel.
struct TimeoutRace<V, E, F> {
    producer: Option<Promise<V, E>>,
    error: Option<F>,
    scheduled: Option<Scheduled>,
}

impl<V, E> AsyncVessel<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    /// Call `supplier` right away to start a computation and wrap its handle.
    pub fn lift<C, F>(supplier: F) -> Self
    where
        F: FnOnce() -> C,
        C: Completion<V, E>,
    {
        Self::from_handle(supplier())
    }

    pub fn from_handle<C>(handle: C) -> Self
    where
        C: Completion<V, E>,
    {
        AsyncVessel::Pending(Box::new(handle))
    }

    pub fn success(value: V) -> Self {
        Self::from_handle(Deferred::resolved(value))
    }

    pub fn failure(err: E) -> Self {
        AsyncVessel::Failure(err)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncVessel::Pending(_))
    }

    /// True only for a failure known at construction. A pending vessel whose
    /// computation already failed still reports `false`.
    pub fn is_failure(&self) -> bool {
        matches!(self, AsyncVessel::Failure(_))
    }

    /// Whether an outcome is available without blocking.
    pub fn is_settled(&self) -> bool {
        match self {
            AsyncVessel::Pending(handle) => handle.is_settled(),
            AsyncVessel::Failure(_) => true,
        }
    }

    pub fn map_async<R, F>(self, f: F) -> AsyncVessel<R, E>
    where
        R: Send + 'static,
        F: FnOnce(V) -> R + Send + 'static,
    {
        match self {
            AsyncVessel::Pending(handle) => derive(handle, |outcome, producer| match outcome {
                Ok(value) => producer.complete(f(value)),
                Err(fault) => producer.settle(Err(fault)),
            }),
            AsyncVessel::Failure(err) => AsyncVessel::Failure(err),
        }
    }

    /// Transform the error. A known failure is mapped immediately; a pending
    /// one is mapped when its computation fails. Wait conditions pass through.
    pub fn map_error_async<T, F>(self, f: F) -> AsyncVessel<V, T>
    where
        T: Send + 'static,
        F: FnOnce(E) -> T + Send + 'static,
    {
        match self {
            AsyncVessel::Pending(handle) => derive(handle, |outcome, producer| match outcome {
                Ok(value) => producer.complete(value),
                Err(fault) => producer.settle(Err(fault.map(f))),
            }),
            AsyncVessel::Failure(err) => AsyncVessel::Failure(f(err)),
        }
    }

    /// Chain into another computation started from the success value.
    pub fn flat_map_async<R, C, F>(self, f: F) -> AsyncVessel<R, E>
    where
        R: Send + 'static,
        C: Completion<R, E>,
        F: FnOnce(V) -> C + Send + 'static,
    {
        match self {
            AsyncVessel::Pending(handle) => derive(handle, |outcome, producer| match outcome {
                Ok(value) => {
                    Box::new(f(value)).on_settle(Box::new(move |inner| producer.settle(inner)))
                }
                Err(fault) => producer.settle(Err(fault)),
            }),
            AsyncVessel::Failure(err) => AsyncVessel::Failure(err),
        }
    }

    pub fn flat_map<R, F>(self, f: F) -> AsyncVessel<R, E>
    where
        R: Send + 'static,
        F: FnOnce(V) -> AsyncVessel<R, E> + Send + 'static,
    {
        match self {
            AsyncVessel::Pending(handle) => derive(handle, |outcome, producer| match outcome {
                Ok(value) => f(value).forward(producer),
                Err(fault) => producer.settle(Err(fault)),
            }),
            AsyncVessel::Failure(err) => AsyncVessel::Failure(err),
        }
    }

    /// Replace a failure with a value computed from the error.
    ///
    /// Only the computation's own error is recovered. A handle that was
    /// abandoned stays failed.
    pub fn recover<F>(self, f: F) -> Self
    where
        F: FnOnce(E) -> V + Send + 'static,
    {
        match self {
            AsyncVessel::Pending(handle) => derive(handle, |outcome, producer| match outcome {
                Ok(value) => producer.complete(value),
                Err(Fault::Failed(err)) => producer.complete(f(err)),
                Err(Fault::Wait(wait)) => producer.settle(Err(wait.into())),
            }),
            AsyncVessel::Failure(err) => Self::success(f(err)),
        }
    }

    pub fn recover_with<F>(self, f: F) -> Self
    where
        F: FnOnce(E) -> AsyncVessel<V, E> + Send + 'static,
    {
        match self {
            AsyncVessel::Pending(handle) => derive(handle, |outcome, producer| match outcome {
                Ok(value) => producer.complete(value),
                Err(Fault::Failed(err)) => f(err).forward(producer),
                Err(Fault::Wait(wait)) => producer.settle(Err(wait.into())),
            }),
            AsyncVessel::Failure(err) => f(err),
        }
    }

    /// Fail with `error()` unless the computation settles within `timeout`.
    ///
    /// The clock is the process-wide [`Delayer`]. A timeout does not stop the
    /// computation; its eventual outcome is discarded.
    pub fn with_timeout<F>(self, timeout: Duration, error: F) -> Self
    where
        F: FnOnce() -> E + Send + 'static,
    {
        self.with_timeout_on(Delayer::global(), timeout, error)
    }

    /// [`with_timeout`](Self::with_timeout) against a caller-supplied timer.
    pub fn with_timeout_on<T, F>(self, timer: &T, timeout: Duration, error: F) -> Self
    where
        T: Timer + ?Sized,
        F: FnOnce() -> E + Send + 'static,
    {
        let handle = match self {
            AsyncVessel::Pending(handle) => handle,
            failure => return failure,
        };

        let (producer, derived) = promise::<V, E>();
        let race = Arc::new(Mutex::new(TimeoutRace {
            producer: Some(producer),
            error: Some(error),
            scheduled: None,
        }));

        let source = Arc::clone(&race);
        handle.on_settle(Box::new(move |outcome| {
            let (producer, scheduled) = {
                let mut race = source.lock();
                race.error = None;
                (race.producer.take(), race.scheduled.take())
            };
            if let Some(scheduled) = scheduled {
                scheduled.cancel();
            }
            if let Some(producer) = producer {
                producer.settle(outcome);
            }
        }));

        if race.lock().producer.is_none() {
            return AsyncVessel::Pending(Box::new(derived));
        }

        let clock = Arc::clone(&race);
        let scheduled = timer.schedule(
            timeout,
            Box::new(move || {
                let (producer, error) = {
                    let mut race = clock.lock();
                    (race.producer.take(), race.error.take())
                };
                if let (Some(producer), Some(error)) = (producer, error) {
                    tracing::debug!(?timeout, "pending vessel timed out");
                    producer.fail(error());
                }
            }),
        );

        // The source may have settled while the task was being scheduled.
        let mut guard = race.lock();
        if guard.producer.is_some() {
            guard.scheduled = Some(scheduled);
        } else {
            drop(guard);
            scheduled.cancel();
        }

        AsyncVessel::Pending(Box::new(derived))
    }

    /// Deliver the outcome to `callback` once known.
    ///
    /// A known failure, or a computation that already settled, is delivered
    /// inline before this returns. Otherwise `callback` runs exactly once on
    /// the thread that settles the computation.
    pub fn on_complete<F>(self, callback: F)
    where
        F: FnOnce(Vessel<V, E>) + Send + 'static,
        E: From<WaitError>,
    {
        match self {
            AsyncVessel::Pending(handle) => {
                handle.on_settle(Box::new(move |outcome| callback(settled_vessel(outcome))))
            }
            AsyncVessel::Failure(err) => callback(Vessel::Failure(err)),
        }
    }

    /// Block until the computation settles and return its value.
    ///
    /// # Panics
    ///
    /// Panics with "value not present" on a known failure. When the
    /// computation fails, the panic payload is the [`AsyncUnwrapError`]
    /// itself, so a caller that catches the unwind can downcast it and
    /// inspect the cause.
    #[track_caller]
    pub fn unwrap(self) -> V {
        self.unwrap_within(None)
    }

    /// [`unwrap`](Self::unwrap), giving up after `timeout`.
    #[track_caller]
    pub fn unwrap_timeout(self, timeout: Duration) -> V {
        self.unwrap_within(Some(timeout))
    }

    #[track_caller]
    fn unwrap_within(self, timeout: Option<Duration>) -> V {
        match self {
            AsyncVessel::Pending(handle) => match handle.wait(timeout) {
                Ok(value) => value,
                Err(fault) => panic::panic_any(AsyncUnwrapError::new(fault)),
            },
            AsyncVessel::Failure(_) => panic!("{}", UsageError::ValueNotPresent),
        }
    }

    /// Block until the computation settles and return its outcome as data.
    pub fn to_result(self) -> Vessel<V, E>
    where
        E: From<WaitError>,
    {
        self.settle_within(None)
    }

    /// [`to_result`](Self::to_result), failing with
    /// [`WaitError::TimedOut`] after `timeout`.
    pub fn to_result_timeout(self, timeout: Duration) -> Vessel<V, E>
    where
        E: From<WaitError>,
    {
        self.settle_within(Some(timeout))
    }

    fn settle_within(self, timeout: Option<Duration>) -> Vessel<V, E>
    where
        E: From<WaitError>,
    {
        match self {
            AsyncVessel::Pending(handle) => {
                let outcome = handle.wait(timeout);
                if let Err(Fault::Wait(wait)) = &outcome {
                    tracing::debug!(%wait, "blocking wait ended without an outcome");
                }
                settled_vessel(outcome)
            }
            AsyncVessel::Failure(err) => Vessel::Failure(err),
        }
    }

    fn forward(self, producer: Promise<V, E>) {
        match self {
            AsyncVessel::Pending(handle) => {
                handle.on_settle(Box::new(move |outcome| producer.settle(outcome)))
            }
            AsyncVessel::Failure(err) => producer.fail(err),
        }
    }
}

impl<V, E> From<Vessel<V, E>> for AsyncVessel<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    fn from(vessel: Vessel<V, E>) -> Self {
        match vessel {
            Vessel::Success(value) => AsyncVessel::success(value),
            Vessel::Failure(err) => AsyncVessel::failure(err),
        }
    }
}

impl<V, E> fmt::Debug for AsyncVessel<V, E>
where
    V: 'static,
    E: fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncVessel::Pending(handle) => f
                .debug_struct("Pending")
                .field("settled", &handle.is_settled())
                .finish(),
            AsyncVessel::Failure(err) => f.debug_tuple("Failure").field(err).finish(),
        }
    }
}

/// Future returned by `.await`ing an [`AsyncVessel`].
#[must_use = "futures do nothing unless polled"]
pub struct Settlement<V, E> {
    handle: Deferred<V, E>,
}

impl<V, E> Future for Settlement<V, E>
where
    E: From<WaitError>,
{
    type Output = Vessel<V, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(settled_vessel)
    }
}

impl<V, E> IntoFuture for AsyncVessel<V, E>
where
    V: Send + 'static,
    E: Send + 'static + From<WaitError>,
{
    type Output = Vessel<V, E>;
    type IntoFuture = Settlement<V, E>;

    fn into_future(self) -> Self::IntoFuture {
        let handle = match self {
            AsyncVessel::Pending(source) => {
                let (producer, handle) = promise::<V, E>();
                source.on_settle(Box::new(move |outcome| producer.settle(outcome)));
                handle
            }
            AsyncVessel::Failure(err) => Deferred::rejected(err),
        };
        Settlement { handle }
    }
}
