//! Delayed task execution used to race pending computations against a clock.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::io;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Task handed to a [`Timer`].
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run a task once a delay has elapsed.
///
/// Implementations decide which thread runs the task. A panicking task must
/// not stop later tasks from running.
pub trait Timer: Send + Sync {
    /// Run `task` once `delay` has elapsed. The returned handle can withdraw
    /// the task before it fires; dropping the handle leaves it scheduled.
    fn schedule(&self, delay: Duration, task: TimerTask) -> Scheduled;
}

/// Handle to a task handed to a [`Timer`].
pub struct Scheduled {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Scheduled {
    /// Handle whose [`cancel`](Self::cancel) runs `cancel`.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle for a timer that cannot withdraw tasks.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Withdraw the task if it has not fired yet, dropping it unrun.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Scheduled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduled")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

struct Entry {
    at: Instant,
    seq: u64,
    task: TimerTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap pops the earliest deadline, FIFO among equal ones.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct Queue {
    entries: BinaryHeap<Entry>,
    next_seq: u64,
    shutdown: bool,
}

#[derive(Default)]
struct Inner {
    queue: Mutex<Queue>,
    wake: Condvar,
}

impl Inner {
    fn run(&self) {
        let mut queue = self.queue.lock();
        loop {
            if queue.shutdown {
                break;
            }

            match queue.entries.peek().map(|entry| entry.at) {
                Some(at) if at <= Instant::now() => {
                    if let Some(Entry { seq, task, .. }) = queue.entries.pop() {
                        tracing::trace!(seq, "delayed task firing");
                        let fired = MutexGuard::unlocked(&mut queue, || {
                            panic::catch_unwind(AssertUnwindSafe(task))
                        });
                        if fired.is_err() {
                            tracing::warn!(seq, "delayed task panicked");
                        }
                    }
                }
                Some(at) => {
                    self.wake.wait_until(&mut queue, at);
                }
                None => self.wake.wait(&mut queue),
            }
        }

        let dropped = queue.entries.len();
        tracing::debug!(dropped, "delay thread stopped");
    }

    fn cancel(&self, seq: u64) {
        let mut queue = self.queue.lock();
        if !queue.entries.iter().any(|entry| entry.seq == seq) {
            return;
        }

        // Removed tasks are dropped after unlocking, their captures may
        // schedule again.
        let (removed, kept): (Vec<Entry>, Vec<Entry>) = mem::take(&mut queue.entries)
            .into_vec()
            .into_iter()
            .partition(|entry| entry.seq == seq);
        queue.entries = BinaryHeap::from(kept);
        drop(queue);

        tracing::trace!(seq, "delayed task cancelled");
        drop(removed);
    }
}

/// Timer backed by one dedicated thread that sleeps until the next deadline.
///
/// Tasks run on that thread, in deadline order. Dropping a `Delayer` stops
/// its thread; tasks that have not fired yet are dropped without running.
pub struct Delayer {
    inner: Arc<Inner>,
    thread: Option<JoinHandle<()>>,
}

impl Delayer {
    pub fn builder() -> DelayerBuilder {
        DelayerBuilder::new()
    }

    /// Process-wide delayer, started on first use.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to spawn the delay thread, the
    /// same way [`std::thread::spawn`] does.
    pub fn global() -> &'static Delayer {
        static GLOBAL: OnceLock<Delayer> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            Delayer::builder()
                .thread_name("vessel-delayer")
                .build()
                .expect("failed to spawn the vessel delay thread")
        })
    }

    /// Number of tasks waiting for their deadline.
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().entries.len()
    }
}

impl Timer for Delayer {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Scheduled {
        let Some(at) = Instant::now().checked_add(delay) else {
            tracing::debug!(?delay, "delay too large to schedule, task dropped");
            return Scheduled::detached();
        };

        let mut queue = self.inner.queue.lock();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.entries.push(Entry { at, seq, task });
        drop(queue);

        self.inner.wake.notify_one();

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        Scheduled::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.cancel(seq);
            }
        })
    }
}

impl Drop for Delayer {
    fn drop(&mut self) {
        self.inner.queue.lock().shutdown = true;
        self.inner.wake.notify_one();

        if let Some(handle) = self.thread.take() {
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                tracing::debug!("delay thread panicked while running a task");
            }
        }
    }
}

impl fmt::Debug for Delayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delayer")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Configuration for a [`Delayer`].
#[derive(Debug, Clone)]
pub struct DelayerBuilder {
    thread_name: String,
}

impl DelayerBuilder {
    pub fn new() -> Self {
        Self {
            thread_name: "vessel-delayer".to_string(),
        }
    }

    /// Name of the delay thread
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Spawn the delay thread.
    pub fn build(self) -> io::Result<Delayer> {
        let inner = Arc::new(Inner::default());
        let worker = Arc::clone(&inner);

        let thread = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || worker.run())?;

        tracing::debug!(name = %self.thread_name, "delay thread started");

        Ok(Delayer {
            inner,
            thread: Some(thread),
        })
    }
}

impl Default for DelayerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
