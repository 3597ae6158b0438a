//! Operations that merge several vessels into one.
//!
//! Two-operand merges ([`zip`], [`try_zip`], [`one_of`]) report failures as a
//! [`CombineFailure`], so their error type must be able to hold one. List-level
//! merges ([`sequence`], [`traverse`]) keep the caller's error type and stop at
//! the first failure, scanning left to right.

use super::error::{BoxError, CombineFailure};
use super::vessel::Vessel;

/// Split two failed-or-not operands into a combine failure, or hand back both
/// values when neither failed.
fn merge_failures<A, B, E>(first: Vessel<A, E>, second: Vessel<B, E>) -> Result<(A, B), E>
where
    E: From<CombineFailure> + Into<BoxError>,
{
    match (first, second) {
        (Vessel::Failure(e1), Vessel::Failure(e2)) => Err(CombineFailure::both(e1, e2).into()),
        (Vessel::Failure(e1), Vessel::Success(_)) => Err(CombineFailure::first(e1).into()),
        (Vessel::Success(_), Vessel::Failure(e2)) => Err(CombineFailure::second(e2).into()),
        (Vessel::Success(a), Vessel::Success(b)) => Ok((a, b)),
    }
}

/// Merge two vessels with `merger`.
///
/// | first   | second  | result                                   |
/// |---------|---------|------------------------------------------|
/// | failure | failure | `CombineFailure` "both failed" (e1, e2)  |
/// | failure | success | `CombineFailure` "first failed" (e1)     |
/// | success | failure | `CombineFailure` "second failed" (e2)    |
/// | success | success | `merger(v1, v2)`                         |
///
/// `merger` only runs when both operands succeeded.
///
/// # Example
///
/// ```rust
/// use vessel::{zip, BoxError, Vessel};
///
/// let a: Vessel<i32, BoxError> = Vessel::success(3);
/// let b: Vessel<i32, BoxError> = Vessel::success(4);
///
/// assert_eq!(zip(a, b, |x, y| x + y).ok(), Some(7));
/// ```
pub fn zip<A, B, R, E, F>(first: Vessel<A, E>, second: Vessel<B, E>, merger: F) -> Vessel<R, E>
where
    E: From<CombineFailure> + Into<BoxError>,
    F: FnOnce(A, B) -> R,
{
    merge_failures(first, second)
        .map(|(a, b)| merger(a, b))
        .into()
}

/// Like [`zip`], with a merger that can fail. Its error becomes the failure of
/// the result, the same way [`Vessel::lift`] captures one.
pub fn try_zip<A, B, R, E, F>(first: Vessel<A, E>, second: Vessel<B, E>, merger: F) -> Vessel<R, E>
where
    E: From<CombineFailure> + Into<BoxError>,
    F: FnOnce(A, B) -> Result<R, E>,
{
    match merge_failures(first, second) {
        Ok((a, b)) => Vessel::lift(|| merger(a, b)),
        Err(err) => Vessel::Failure(err),
    }
}

/// Pick the first success, left-biased.
///
/// A success in `first` is returned as is, whatever `second` holds. When both
/// failed, the result is a "both failed" [`CombineFailure`].
pub fn one_of<V, E>(first: Vessel<V, E>, second: Vessel<V, E>) -> Vessel<V, E>
where
    E: From<CombineFailure> + Into<BoxError>,
{
    match (first, second) {
        (Vessel::Failure(e1), Vessel::Failure(e2)) => {
            Vessel::Failure(CombineFailure::both(e1, e2).into())
        }
        (Vessel::Failure(_), second) => second,
        (first, _) => first,
    }
}

/// Turn a sequence of vessels into a vessel of values, preserving order.
///
/// Stops pulling from `items` at the first failure and returns its error;
/// values gathered before it are dropped.
///
/// # Example
///
/// ```rust
/// use vessel::{sequence, Vessel};
///
/// let all: Vec<Vessel<i32, String>> = vec![Vessel::success(1), Vessel::success(2)];
/// assert_eq!(sequence(all), Vessel::success(vec![1, 2]));
///
/// let broken = vec![
///     Vessel::success(1),
///     Vessel::failure("bad row".to_string()),
///     Vessel::failure("worse row".to_string()),
/// ];
/// assert_eq!(sequence(broken), Vessel::failure("bad row".to_string()));
/// ```
pub fn sequence<V, E, I>(items: I) -> Vessel<Vec<V>, E>
where
    I: IntoIterator<Item = Vessel<V, E>>,
{
    traverse(items, |item| item)
}

/// Map each item through `f` and sequence the results.
///
/// `f` is called for every item up to and including the first one whose
/// vessel is a failure, and for none after it.
pub fn traverse<T, R, E, I, F>(items: I, mut f: F) -> Vessel<Vec<R>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Vessel<R, E>,
{
    let mut values = Vec::new();

    for item in items {
        match f(item) {
            Vessel::Success(value) => values.push(value),
            Vessel::Failure(err) => return Vessel::Failure(err),
        }
    }

    Vessel::Success(values)
}
