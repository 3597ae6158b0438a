//! Collecting a stream of vessels into a single vessel.

use super::vessel::Vessel;

/// Accumulator that folds vessels into `Vessel<Vec<V>, E>`.
///
/// Successes are appended in arrival order until the first failure. From then
/// on the accumulator is latched: later items are still accepted but ignored.
///
/// Partial accumulators built on separate threads can be merged with
/// [`combine`](Self::combine). When both partials already failed the left
/// error is kept; which error that is depends on how the caller split the
/// work, so it is not a stable choice across runs of a parallel driver.
///
/// # Example
///
/// ```rust
/// use vessel::{Collector, Vessel};
///
/// let mut left = Collector::new();
/// left.accumulate(Vessel::<i32, String>::success(1));
/// left.accumulate(Vessel::success(2));
///
/// let mut right = Collector::new();
/// right.accumulate(Vessel::success(3));
///
/// assert_eq!(left.combine(right).finish(), Vessel::success(vec![1, 2, 3]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Collector<V, E> {
    state: Vessel<Vec<V>, E>,
}

impl<V, E> Collector<V, E> {
    pub fn new() -> Self {
        Self {
            state: Vessel::Success(Vec::new()),
        }
    }

    /// Whether a failure has been seen.
    pub fn is_latched(&self) -> bool {
        self.state.is_failure()
    }

    /// Fold one more vessel in.
    pub fn accumulate(&mut self, next: Vessel<V, E>) {
        let Vessel::Success(values) = &mut self.state else {
            return;
        };

        match next {
            Vessel::Success(value) => values.push(value),
            Vessel::Failure(err) => self.state = Vessel::Failure(err),
        }
    }

    /// Merge a partial accumulator that covered later items.
    pub fn combine(self, other: Self) -> Self {
        let state = match (self.state, other.state) {
            (Vessel::Success(mut values), Vessel::Success(more)) => {
                values.extend(more);
                Vessel::Success(values)
            }
            (Vessel::Failure(err), _) => Vessel::Failure(err),
            (Vessel::Success(_), failure) => failure,
        };
        Self { state }
    }

    pub fn finish(self) -> Vessel<Vec<V>, E> {
        self.state
    }
}

impl<V, E> Default for Collector<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Extend<Vessel<V, E>> for Collector<V, E> {
    fn extend<I: IntoIterator<Item = Vessel<V, E>>>(&mut self, iter: I) {
        for item in iter {
            self.accumulate(item);
        }
    }
}

/// Collect with `.collect::<Vessel<Vec<_>, _>>()`.
///
/// Unlike [`sequence`](crate::sequence), this drains the whole iterator; items
/// after the first failure are consumed and ignored.
impl<V, E> FromIterator<Vessel<V, E>> for Vessel<Vec<V>, E> {
    fn from_iter<I: IntoIterator<Item = Vessel<V, E>>>(iter: I) -> Self {
        let mut collector = Collector::new();
        collector.extend(iter);
        collector.finish()
    }
}
