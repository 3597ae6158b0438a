//! The synchronous success/failure container.
//!
//! Every operation here runs on the calling thread and never mutates a vessel
//! in place: combinators consume `self` and hand back a new vessel.

use super::error::{Panicked, UsageError};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

/// Outcome of a fallible computation: a success holding a value or a failure
/// holding an error. Never both, never neither.
///
/// # Example
///
/// ```rust
/// use vessel::Vessel;
///
/// let parsed: Vessel<i32, String> = Vessel::lift(|| "42".parse::<i32>().map_err(|e| e.to_string()));
///
/// let message = parsed
///     .map(|n| n * 2)
///     .filter(|n| *n > 50, || "too small".to_string())
///     .fold(|n| format!("got {n}"), |e| format!("error: {e}"));
///
/// assert_eq!(message, "got 84");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use = "a vessel may be a failure, which should be handled"]
pub enum Vessel<V, E> {
    /// The computation produced a value.
    Success(V),
    /// The computation failed with an error.
    Failure(E),
}

impl<V, E> Vessel<V, E> {
    pub fn success(value: V) -> Self {
        Vessel::Success(value)
    }

    pub fn failure(err: E) -> Self {
        Vessel::Failure(err)
    }

    /// Build a success from a payload that may be missing.
    ///
    /// A missing payload is a programming error and is reported as
    /// [`UsageError::InvalidArgument`] instead of producing a vessel.
    pub fn success_checked(value: Option<V>) -> Result<Self, UsageError> {
        value
            .map(Vessel::Success)
            .ok_or(UsageError::InvalidArgument("a success needs a value"))
    }

    /// Build a failure from an error that may be missing.
    pub fn failure_checked(err: Option<E>) -> Result<Self, UsageError> {
        err.map(Vessel::Failure)
            .ok_or(UsageError::InvalidArgument("a failure needs an error"))
    }

    /// Run a fallible computation on the calling thread and capture its outcome.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vessel::Vessel;
    ///
    /// let ok: Vessel<u8, _> = Vessel::lift(|| "7".parse::<u8>());
    /// let bad: Vessel<u8, _> = Vessel::lift(|| "seven".parse::<u8>());
    ///
    /// assert!(ok.is_success());
    /// assert!(bad.is_failure());
    /// ```
    pub fn lift<F>(computation: F) -> Self
    where
        F: FnOnce() -> Result<V, E>,
    {
        computation().into()
    }

    /// Like [`lift`](Self::lift), but also turns a panic inside `computation`
    /// into a failure. This is the only place the library catches an unwind.
    pub fn lift_unwind<F>(computation: F) -> Self
    where
        F: FnOnce() -> V,
        E: From<Panicked>,
    {
        match panic::catch_unwind(AssertUnwindSafe(computation)) {
            Ok(value) => Vessel::Success(value),
            Err(payload) => Vessel::Failure(Panicked::from_payload(payload).into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Vessel::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Vessel::Failure(_))
    }

    /// Borrow the success value, if any.
    pub fn value(&self) -> Option<&V> {
        match self {
            Vessel::Success(value) => Some(value),
            Vessel::Failure(_) => None,
        }
    }

    /// Borrow the error, if any.
    pub fn error(&self) -> Option<&E> {
        match self {
            Vessel::Success(_) => None,
            Vessel::Failure(err) => Some(err),
        }
    }

    pub fn as_ref(&self) -> Vessel<&V, &E> {
        match self {
            Vessel::Success(value) => Vessel::Success(value),
            Vessel::Failure(err) => Vessel::Failure(err),
        }
    }

    /// Transform the success value. A failure passes through and `f` is not called.
    pub fn map<R, F>(self, f: F) -> Vessel<R, E>
    where
        F: FnOnce(V) -> R,
    {
        match self {
            Vessel::Success(value) => Vessel::Success(f(value)),
            Vessel::Failure(err) => Vessel::Failure(err),
        }
    }

    /// Transform the success value with a fallible function.
    ///
    /// An error returned by `f` becomes the failure of the result, exactly as
    /// if the call had gone through [`lift`](Self::lift).
    pub fn try_map<R, F>(self, f: F) -> Vessel<R, E>
    where
        F: FnOnce(V) -> Result<R, E>,
    {
        self.flat_map(|value| Vessel::lift(|| f(value)))
    }

    /// Transform the error. A success passes through and `f` is not called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vessel::Vessel;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct ApiError(u16);
    ///
    /// let missing: Vessel<&str, &str> = Vessel::failure("user 123 not found");
    /// let api = missing.map_error(|_| ApiError(404));
    ///
    /// assert_eq!(api, Vessel::failure(ApiError(404)));
    /// ```
    pub fn map_error<T, F>(self, f: F) -> Vessel<V, T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Vessel::Success(value) => Vessel::Success(value),
            Vessel::Failure(err) => Vessel::Failure(f(err)),
        }
    }

    /// Chain another vessel-producing step. The result of `f` is returned as is.
    pub fn flat_map<R, F>(self, f: F) -> Vessel<R, E>
    where
        F: FnOnce(V) -> Vessel<R, E>,
    {
        match self {
            Vessel::Success(value) => f(value),
            Vessel::Failure(err) => Vessel::Failure(err),
        }
    }

    /// [`flat_map`](Self::flat_map) into a step with a wider error type.
    ///
    /// A failure of `self` is converted with `Into`, so a chain can move from
    /// a narrow error to the enum that wraps it without a separate
    /// [`map_error`](Self::map_error).
    ///
    /// ```
    /// use vessel::Vessel;
    ///
    /// #[derive(Debug, PartialEq)]
    /// enum ApiError {
    ///     BadId(String),
    ///     Missing(u32),
    /// }
    ///
    /// impl From<String> for ApiError {
    ///     fn from(raw: String) -> Self {
    ///         ApiError::BadId(raw)
    ///     }
    /// }
    ///
    /// let parse = |raw: &str| Vessel::lift(|| raw.parse::<u32>()).map_error(|_| raw.to_string());
    /// let load = |id: u32| -> Vessel<&'static str, ApiError> {
    ///     if id == 1 { Vessel::success("ada") } else { Vessel::failure(ApiError::Missing(id)) }
    /// };
    ///
    /// assert_eq!(parse("1").flat_map_into(load), Vessel::success("ada"));
    /// assert_eq!(parse("2").flat_map_into(load), Vessel::failure(ApiError::Missing(2)));
    /// assert_eq!(parse("x").flat_map_into(load), Vessel::failure(ApiError::BadId("x".into())));
    /// ```
    pub fn flat_map_into<R, T, F>(self, f: F) -> Vessel<R, T>
    where
        E: Into<T>,
        F: FnOnce(V) -> Vessel<R, T>,
    {
        match self {
            Vessel::Success(value) => f(value),
            Vessel::Failure(err) => Vessel::Failure(err.into()),
        }
    }

    /// Collapse both variants into one value. Exactly one of the two functions runs.
    pub fn fold<R, S, F>(self, on_success: S, on_error: F) -> R
    where
        S: FnOnce(V) -> R,
        F: FnOnce(E) -> R,
    {
        match self {
            Vessel::Success(value) => on_success(value),
            Vessel::Failure(err) => on_error(err),
        }
    }

    /// Keep a success only if `predicate` holds for its value.
    ///
    /// The predicate runs once, and only for a success. `error` runs only when
    /// the predicate rejects the value. The error type stays `E`; widen it
    /// first with [`map_error`](Self::map_error) when the rejection needs a
    /// different one.
    pub fn filter<P, F>(self, predicate: P, error: F) -> Self
    where
        P: FnOnce(&V) -> bool,
        F: FnOnce() -> E,
    {
        match self {
            Vessel::Success(value) => {
                if predicate(&value) {
                    Vessel::Success(value)
                } else {
                    Vessel::Failure(error())
                }
            }
            failure => failure,
        }
    }

    /// Replace a failure with the vessel produced by `f`.
    pub fn recover_with<F>(self, f: F) -> Self
    where
        F: FnOnce(E) -> Vessel<V, E>,
    {
        match self {
            Vessel::Success(value) => Vessel::Success(value),
            Vessel::Failure(err) => f(err),
        }
    }

    /// Turn a failure into a success by computing a value from the error.
    pub fn recover<T, F>(self, f: F) -> Vessel<V, T>
    where
        F: FnOnce(E) -> V,
    {
        match self {
            Vessel::Success(value) => Vessel::Success(value),
            Vessel::Failure(err) => Vessel::Success(f(err)),
        }
    }

    /// Observe the success value without consuming it.
    pub fn inspect<F>(self, f: F) -> Self
    where
        F: FnOnce(&V),
    {
        if let Vessel::Success(value) = &self {
            f(value);
        }
        self
    }

    /// Observe the error without consuming it.
    pub fn inspect_error<F>(self, f: F) -> Self
    where
        F: FnOnce(&E),
    {
        if let Vessel::Failure(err) = &self {
            f(err);
        }
        self
    }

    /// Extract the success value.
    ///
    /// # Panics
    ///
    /// Panics with [`UsageError::ValueNotPresent`] when called on a failure.
    /// Only call this where success has already been established.
    #[track_caller]
    pub fn unwrap(self) -> V {
        match self {
            Vessel::Success(value) => value,
            Vessel::Failure(_) => panic!("{}", UsageError::ValueNotPresent),
        }
    }

    pub fn unwrap_or(self, default: V) -> V {
        match self {
            Vessel::Success(value) => value,
            Vessel::Failure(_) => default,
        }
    }

    /// Extract the success value, computing a fallback from the error otherwise.
    pub fn unwrap_or_else<F>(self, f: F) -> V
    where
        F: FnOnce(E) -> V,
    {
        match self {
            Vessel::Success(value) => value,
            Vessel::Failure(err) => f(err),
        }
    }

    pub fn ok(self) -> Option<V> {
        match self {
            Vessel::Success(value) => Some(value),
            Vessel::Failure(_) => None,
        }
    }

    pub fn err(self) -> Option<E> {
        match self {
            Vessel::Success(_) => None,
            Vessel::Failure(err) => Some(err),
        }
    }

    /// Hand the outcome back to `?`-based code.
    pub fn into_result(self) -> Result<V, E> {
        self.into()
    }
}

impl<V, E> From<Result<V, E>> for Vessel<V, E> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => Vessel::Success(value),
            Err(err) => Vessel::Failure(err),
        }
    }
}

impl<V, E> From<Vessel<V, E>> for Result<V, E> {
    fn from(vessel: Vessel<V, E>) -> Self {
        match vessel {
            Vessel::Success(value) => Ok(value),
            Vessel::Failure(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Error)]
    enum AccountError {
        #[error("account {0} not found")]
        NotFound(String),
        #[error("account is inactive")]
        Inactive,
        #[error("invalid amount: {0}")]
        InvalidAmount(String),
        #[error(transparent)]
        Panicked(#[from] Panicked),
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Account {
        id: String,
        balance: i64,
        active: bool,
    }

    fn account(id: &str, balance: i64) -> Account {
        Account {
            id: id.to_string(),
            balance,
            active: true,
        }
    }

    #[derive(Debug, PartialEq)]
    struct BlankId;

    impl From<BlankId> for AccountError {
        fn from(_: BlankId) -> Self {
            AccountError::NotFound(String::new())
        }
    }

    fn account_id(raw: &str) -> Vessel<String, BlankId> {
        if raw.trim().is_empty() {
            Vessel::failure(BlankId)
        } else {
            Vessel::success(raw.trim().to_string())
        }
    }

    fn open_account(id: String) -> Vessel<Account, AccountError> {
        if id == "acc-1" {
            Vessel::success(account(&id, 100))
        } else {
            Vessel::failure(AccountError::NotFound(id))
        }
    }

    #[test]
    fn flat_map_into_widens_the_error() {
        assert_eq!(
            account_id(" acc-1 ").flat_map_into(open_account),
            Vessel::success(account("acc-1", 100))
        );
        assert_eq!(
            account_id("acc-9").flat_map_into(open_account),
            Vessel::failure(AccountError::NotFound("acc-9".to_string()))
        );

        let called = Cell::new(false);
        let blank = account_id("  ").flat_map_into(|id| {
            called.set(true);
            open_account(id)
        });
        assert_eq!(blank, Vessel::failure(AccountError::NotFound(String::new())));
        assert!(!called.get());
    }

    #[test]
    fn success_reports_its_variant() {
        let vessel: Vessel<i32, AccountError> = Vessel::success(5);

        assert!(vessel.is_success());
        assert!(!vessel.is_failure());
        assert_eq!(vessel.value(), Some(&5));
        assert_eq!(vessel.error(), None);
    }

    #[test]
    fn failure_reports_its_variant() {
        let vessel: Vessel<i32, AccountError> = Vessel::failure(AccountError::Inactive);

        assert!(vessel.is_failure());
        assert!(!vessel.is_success());
        assert_eq!(vessel.error(), Some(&AccountError::Inactive));
    }

    #[test]
    fn checked_constructors_reject_missing_payloads() {
        let missing_value = Vessel::<i32, AccountError>::success_checked(None);
        let missing_error = Vessel::<i32, AccountError>::failure_checked(None);

        assert!(matches!(
            missing_value,
            Err(UsageError::InvalidArgument(_))
        ));
        assert!(matches!(
            missing_error,
            Err(UsageError::InvalidArgument(_))
        ));
        assert_eq!(
            Vessel::<i32, AccountError>::success_checked(Some(1)),
            Ok(Vessel::Success(1))
        );
    }

    #[test]
    fn lift_captures_returned_error() {
        let parsed: Vessel<i32, AccountError> = Vessel::lift(|| {
            "12x"
                .parse::<i32>()
                .map_err(|e| AccountError::InvalidAmount(e.to_string()))
        });

        assert!(matches!(parsed, Vessel::Failure(AccountError::InvalidAmount(_))));
    }

    #[test]
    fn lift_unwind_captures_panics() {
        let vessel: Vessel<i32, AccountError> = Vessel::lift_unwind(|| panic!("ledger corrupted"));

        match vessel {
            Vessel::Failure(AccountError::Panicked(p)) => {
                assert_eq!(p.message, "ledger corrupted")
            }
            other => panic!("expected captured panic, got {other:?}"),
        }
    }

    #[test]
    fn map_skips_function_on_failure() {
        let calls = Cell::new(0);
        let vessel: Vessel<i32, AccountError> = Vessel::failure(AccountError::Inactive);

        let mapped = vessel.map(|n| {
            calls.set(calls.get() + 1);
            n + 1
        });

        assert_eq!(calls.get(), 0);
        assert_eq!(mapped, Vessel::failure(AccountError::Inactive));
    }

    #[test]
    fn try_map_turns_errors_into_failures() {
        let vessel: Vessel<&str, AccountError> = Vessel::success("abc");

        let mapped = vessel.try_map(|s| {
            s.parse::<i64>()
                .map_err(|_| AccountError::InvalidAmount(s.to_string()))
        });

        assert_eq!(
            mapped,
            Vessel::failure(AccountError::InvalidAmount("abc".into()))
        );
    }

    #[test]
    fn map_error_leaves_success_untouched() {
        let calls = Cell::new(0);
        let vessel: Vessel<i32, AccountError> = Vessel::success(3);

        let mapped = vessel.map_error(|e| {
            calls.set(calls.get() + 1);
            e.to_string()
        });

        assert_eq!(calls.get(), 0);
        assert_eq!(mapped, Vessel::success(3));
    }

    #[test]
    fn flat_map_returns_inner_vessel() {
        let find = |id: &str| -> Vessel<Account, AccountError> {
            if id == "acc-1" {
                Vessel::success(account(id, 100))
            } else {
                Vessel::failure(AccountError::NotFound(id.to_string()))
            }
        };

        let found = Vessel::<&str, AccountError>::success("acc-1").flat_map(find);
        let missing = Vessel::<&str, AccountError>::success("acc-9").flat_map(find);

        assert_eq!(found.map(|a| a.balance), Vessel::success(100));
        assert_eq!(
            missing,
            Vessel::failure(AccountError::NotFound("acc-9".into()))
        );
    }

    #[test]
    fn fold_runs_exactly_one_branch() {
        let success_calls = Cell::new(0);
        let error_calls = Cell::new(0);

        let vessel: Vessel<i32, AccountError> = Vessel::failure(AccountError::Inactive);
        let status = vessel.fold(
            |_| {
                success_calls.set(success_calls.get() + 1);
                200
            },
            |_| {
                error_calls.set(error_calls.get() + 1);
                404
            },
        );

        assert_eq!(status, 404);
        assert_eq!(success_calls.get(), 0);
        assert_eq!(error_calls.get(), 1);
    }

    #[test]
    fn filter_rejects_with_supplied_error() {
        let mut inactive = account("acc-2", 10);
        inactive.active = false;

        let vessel: Vessel<Account, AccountError> = Vessel::success(inactive);
        let filtered = vessel.filter(|a| a.active, || AccountError::Inactive);

        assert_eq!(filtered, Vessel::failure(AccountError::Inactive));
    }

    #[test]
    fn filter_evaluates_predicate_once_and_supplier_lazily() {
        let predicate_calls = Cell::new(0);
        let supplier_calls = Cell::new(0);

        let vessel: Vessel<i32, AccountError> = Vessel::success(10);
        let kept = vessel.filter(
            |n| {
                predicate_calls.set(predicate_calls.get() + 1);
                *n > 5
            },
            || {
                supplier_calls.set(supplier_calls.get() + 1);
                AccountError::Inactive
            },
        );

        assert_eq!(kept, Vessel::success(10));
        assert_eq!(predicate_calls.get(), 1);
        assert_eq!(supplier_calls.get(), 0);
    }

    #[test]
    fn filter_passes_failure_through() {
        let vessel: Vessel<i32, AccountError> = Vessel::failure(AccountError::Inactive);
        let filtered = vessel.filter(|_| panic!("predicate must not run"), || unreachable!());

        assert_eq!(filtered, Vessel::failure(AccountError::Inactive));
    }

    #[test]
    fn recover_with_can_fall_back_to_another_source() {
        let primary: Vessel<Account, AccountError> =
            Vessel::failure(AccountError::NotFound("acc-3".into()));

        let recovered = primary.recover_with(|_| Vessel::success(account("cached", 0)));

        assert_eq!(recovered.map(|a| a.id), Vessel::success("cached".to_string()));
    }

    #[test]
    fn recover_with_may_fail_again() {
        let primary: Vessel<i32, AccountError> = Vessel::failure(AccountError::Inactive);

        let recovered =
            primary.recover_with(|_| Vessel::failure(AccountError::NotFound("cache".into())));

        assert_eq!(
            recovered,
            Vessel::failure(AccountError::NotFound("cache".into()))
        );
    }

    #[test]
    fn recover_produces_success_from_error() {
        let vessel: Vessel<String, AccountError> = Vessel::failure(AccountError::Inactive);
        let recovered: Vessel<String, AccountError> = vessel.recover(|e| format!("guest ({e})"));

        assert_eq!(
            recovered,
            Vessel::success("guest (account is inactive)".to_string())
        );
    }

    #[test]
    fn inspect_hooks_see_the_matching_variant() {
        let seen = Cell::new(0);
        let errors = Cell::new(0);

        let _ = Vessel::<i32, AccountError>::success(7)
            .inspect(|n| seen.set(*n))
            .inspect_error(|_| errors.set(errors.get() + 1));

        assert_eq!(seen.get(), 7);
        assert_eq!(errors.get(), 0);
    }

    #[test]
    fn unwrap_returns_success_value() {
        let vessel: Vessel<&str, AccountError> = Vessel::success("hello");
        assert_eq!(vessel.unwrap(), "hello");
    }

    #[test]
    #[should_panic(expected = "value not present")]
    fn unwrap_on_failure_panics() {
        let vessel: Vessel<&str, AccountError> = Vessel::failure(AccountError::Inactive);
        let _ = vessel.unwrap();
    }

    #[test]
    fn fallback_extractors_use_defaults() {
        let failure: Vessel<i64, AccountError> = Vessel::failure(AccountError::Inactive);

        assert_eq!(failure.clone().unwrap_or(0), 0);
        assert_eq!(failure.unwrap_or_else(|_| -1), -1);
    }

    #[test]
    fn converts_to_and_from_result() {
        let from_ok: Vessel<i32, String> = Ok(1).into();
        let from_err: Vessel<i32, String> = Err("bad".to_string()).into();

        assert_eq!(from_ok, Vessel::success(1));
        assert_eq!(from_err.clone().into_result(), Err("bad".to_string()));
        assert_eq!(from_err.err(), Some("bad".to_string()));
    }

    #[test]
    fn serializes_externally_tagged() {
        let success: Vessel<i32, String> = Vessel::success(5);
        let failure: Vessel<i32, String> = Vessel::failure("nope".into());

        assert_eq!(serde_json::to_string(&success).unwrap(), r#"{"Success":5}"#);
        assert_eq!(
            serde_json::to_string(&failure).unwrap(),
            r#"{"Failure":"nope"}"#
        );

        let back: Vessel<i32, String> = serde_json::from_str(r#"{"Failure":"nope"}"#).unwrap();
        assert_eq!(back, failure);
    }
}
