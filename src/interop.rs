//! Bridges between [`Vessel`] and Stillwater's `Validation` and `Effect`.
//!
//! A vessel short-circuits on the first failure; a `Validation` keeps going
//! and accumulates. [`validate_all`] is the accumulating counterpart of
//! [`sequence`](crate::sequence).

use crate::core::Vessel;
use stillwater::effect::Effect;
use stillwater::validation::Validation;
use stillwater::{from_result, NonEmptyVec};

impl<V, E> From<Vessel<V, E>> for Validation<V, E> {
    fn from(vessel: Vessel<V, E>) -> Self {
        match vessel {
            Vessel::Success(value) => Validation::Success(value),
            Vessel::Failure(err) => Validation::Failure(err),
        }
    }
}

impl<V, E> From<Validation<V, E>> for Vessel<V, E> {
    fn from(validation: Validation<V, E>) -> Self {
        match validation {
            Validation::Success(value) => Vessel::Success(value),
            Validation::Failure(err) => Vessel::Failure(err),
        }
    }
}

/// Collect every success, or every failure when there is at least one.
///
/// Unlike [`sequence`](crate::sequence), this consumes the whole input and
/// reports all errors in input order.
///
/// # Example
///
/// ```rust
/// use vessel::{validate_all, Vessel};
/// use stillwater::Validation;
///
/// let fields = vec![
///     Vessel::success(1),
///     Vessel::failure("name is empty"),
///     Vessel::failure("age is negative"),
/// ];
///
/// match validate_all(fields) {
///     Validation::Failure(errors) => assert_eq!(errors.len(), 2),
///     Validation::Success(_) => unreachable!(),
/// }
/// ```
pub fn validate_all<V, E, I>(vessels: I) -> Validation<Vec<V>, NonEmptyVec<E>>
where
    I: IntoIterator<Item = Vessel<V, E>>,
{
    let checks: Vec<Validation<V, NonEmptyVec<E>>> = vessels
        .into_iter()
        .map(|vessel| match vessel {
            Vessel::Success(value) => Validation::success(value),
            Vessel::Failure(err) => Validation::fail(err),
        })
        .collect();

    Validation::all_vec(checks)
}

impl<V, E> Vessel<V, E>
where
    V: Send,
    E: Send,
{
    /// Lift into an effect that yields this outcome when run in any `Env`.
    pub fn into_effect<Env>(self) -> impl Effect<Output = V, Error = E, Env = Env>
    where
        Env: Clone + Send + Sync,
    {
        from_result(self.into_result())
    }
}
