//! Single-shot promise: a producer that settles once and a handle that observes it.

use super::error::{Fault, WaitError};
use super::{Completion, Outcome, SettleCallback};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

enum Slot<T, E> {
    Waiting {
        callback: Option<SettleCallback<T, E>>,
        waker: Option<Waker>,
    },
    Ready(Outcome<T, E>),
    Taken,
}

struct Shared<T, E> {
    slot: Mutex<Slot<T, E>>,
    ready: Condvar,
}

impl<T, E> Shared<T, E> {
    fn with_slot(slot: Slot<T, E>) -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(slot),
            ready: Condvar::new(),
        })
    }

    fn settle(&self, outcome: Outcome<T, E>) {
        let mut slot = self.slot.lock();
        match mem::replace(&mut *slot, Slot::Taken) {
            Slot::Waiting {
                callback: Some(callback),
                ..
            } => {
                drop(slot);
                tracing::trace!(ok = outcome.is_ok(), "promise settled into registered callback");
                callback(outcome);
            }
            Slot::Waiting {
                callback: None,
                waker,
            } => {
                *slot = Slot::Ready(outcome);
                drop(slot);
                tracing::trace!("promise settled");
                self.ready.notify_all();
                if let Some(waker) = waker {
                    waker.wake();
                }
            }
            settled => *slot = settled,
        }
    }
}

/// Producer half of [`promise`]. Settling consumes it, so it settles at most
/// once; dropping it unsettled settles the handle as
/// [`WaitError::Abandoned`].
pub struct Promise<T, E> {
    shared: Option<Arc<Shared<T, E>>>,
}

impl<T, E> Promise<T, E> {
    pub fn complete(self, value: T) {
        self.settle(Ok(value));
    }

    pub fn fail(self, err: E) {
        self.settle(Err(Fault::Failed(err)));
    }

    pub fn settle(mut self, outcome: Outcome<T, E>) {
        if let Some(shared) = self.shared.take() {
            shared.settle(outcome);
        }
    }
}

impl<T, E> Drop for Promise<T, E> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            tracing::debug!("promise dropped before settling");
            shared.settle(Err(WaitError::Abandoned.into()));
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("settled", &self.shared.is_none())
            .finish()
    }
}

/// Consumer half of [`promise`].
///
/// Implements [`Completion`] and can also be `.await`ed directly.
pub struct Deferred<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Deferred<T, E> {
    /// A handle that is already settled with `value`.
    pub fn resolved(value: T) -> Self {
        Self::settled(Ok(value))
    }

    /// A handle that is already settled with `err`.
    pub fn rejected(err: E) -> Self {
        Self::settled(Err(Fault::Failed(err)))
    }

    pub fn settled(outcome: Outcome<T, E>) -> Self {
        Self {
            shared: Shared::with_slot(Slot::Ready(outcome)),
        }
    }

    fn register(&self, callback: SettleCallback<T, E>) {
        let mut slot = self.shared.slot.lock();
        match mem::replace(&mut *slot, Slot::Taken) {
            Slot::Waiting { waker, .. } => {
                *slot = Slot::Waiting {
                    callback: Some(callback),
                    waker,
                };
            }
            Slot::Ready(outcome) => {
                drop(slot);
                callback(outcome);
            }
            Slot::Taken => {
                drop(slot);
                callback(Err(WaitError::Abandoned.into()));
            }
        }
    }

    fn take_blocking(&self, timeout: Option<Duration>) -> Outcome<T, E> {
        let deadline =
            timeout.and_then(|limit| Instant::now().checked_add(limit).map(|at| (limit, at)));
        let mut slot = self.shared.slot.lock();

        loop {
            match mem::replace(&mut *slot, Slot::Taken) {
                Slot::Ready(outcome) => return outcome,
                Slot::Taken => return Err(WaitError::Abandoned.into()),
                waiting => *slot = waiting,
            }

            match deadline {
                Some((limit, at)) => {
                    let result = self.shared.ready.wait_until(&mut slot, at);
                    if result.timed_out() && !matches!(*slot, Slot::Ready(_)) {
                        return Err(WaitError::TimedOut(limit).into());
                    }
                }
                None => self.shared.ready.wait(&mut slot),
            }
        }
    }

    fn peek_settled(&self) -> bool {
        matches!(*self.shared.slot.lock(), Slot::Ready(_))
    }
}

impl<T, E> Completion<T, E> for Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn on_settle(self: Box<Self>, callback: SettleCallback<T, E>) {
        self.register(callback);
    }

    fn wait(self: Box<Self>, timeout: Option<Duration>) -> Outcome<T, E> {
        self.take_blocking(timeout)
    }

    fn is_settled(&self) -> bool {
        self.peek_settled()
    }
}

impl<T, E> Future for Deferred<T, E> {
    type Output = Outcome<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.shared.slot.lock();
        match mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(outcome) => Poll::Ready(outcome),
            Slot::Waiting { callback, .. } => {
                *slot = Slot::Waiting {
                    callback,
                    waker: Some(cx.waker().clone()),
                };
                Poll::Pending
            }
            Slot::Taken => Poll::Ready(Err(WaitError::Abandoned.into())),
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.peek_settled())
            .finish()
    }
}

/// Create a connected producer/handle pair.
pub fn promise<T, E>() -> (Promise<T, E>, Deferred<T, E>) {
    let shared = Shared::with_slot(Slot::Waiting {
        callback: None,
        waker: None,
    });
    (
        Promise {
            shared: Some(Arc::clone(&shared)),
        },
        Deferred { shared },
    )
}
