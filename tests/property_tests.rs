//! Property-based tests for the vessel algebra.
//!
//! These tests use proptest to verify the combinator laws hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use thiserror::Error;
use vessel::{one_of, sequence, traverse, zip, Collector, CombineFailure, CombineReason, Vessel};

#[derive(Debug, Error)]
enum TestError {
    #[error("rejected {0}")]
    Rejected(i32),
    #[error(transparent)]
    Combine(#[from] CombineFailure),
}

fn reason_of<V>(vessel: &Vessel<V, TestError>) -> Option<CombineReason> {
    match vessel.error() {
        Some(TestError::Combine(failure)) => Some(failure.reason()),
        _ => None,
    }
}

fn half(n: i32) -> Vessel<i32, String> {
    if n % 2 == 0 {
        Vessel::success(n / 2)
    } else {
        Vessel::failure(format!("{n} is odd"))
    }
}

fn positive(n: i32) -> Vessel<i32, String> {
    if n > 0 {
        Vessel::success(n)
    } else {
        Vessel::failure(format!("{n} is not positive"))
    }
}

prop_compose! {
    fn arbitrary_vessel()(ok in any::<bool>(), n in -1000i32..1000) -> Vessel<i32, String> {
        if ok {
            Vessel::success(n)
        } else {
            Vessel::failure(format!("error {n}"))
        }
    }
}

prop_compose! {
    fn tagged_vessel()(ok in any::<bool>(), n in -1000i32..1000) -> Vessel<i32, TestError> {
        if ok {
            Vessel::success(n)
        } else {
            Vessel::failure(TestError::Rejected(n))
        }
    }
}

proptest! {
    #[test]
    fn map_identity(vessel in arbitrary_vessel()) {
        prop_assert_eq!(vessel.clone().map(|v| v), vessel);
    }

    #[test]
    fn map_composition(vessel in arbitrary_vessel()) {
        let f = |v: i32| v.wrapping_mul(3);
        let g = |v: i32| v - 7;
        prop_assert_eq!(vessel.clone().map(f).map(g), vessel.map(|v| g(f(v))));
    }

    #[test]
    fn flat_map_left_identity(n in -1000i32..1000) {
        prop_assert_eq!(Vessel::success(n).flat_map(half), half(n));
    }

    #[test]
    fn flat_map_right_identity(vessel in arbitrary_vessel()) {
        prop_assert_eq!(vessel.clone().flat_map(Vessel::success), vessel);
    }

    #[test]
    fn flat_map_associativity(vessel in arbitrary_vessel()) {
        let nested = vessel.clone().flat_map(|v| half(v).flat_map(positive));
        prop_assert_eq!(vessel.flat_map(half).flat_map(positive), nested);
    }

    #[test]
    fn failure_short_circuits_map_and_flat_map(err in ".{0,12}") {
        let failed: Vessel<i32, String> = Vessel::failure(err.clone());
        prop_assert_eq!(failed.clone().map(|v| v + 1), Vessel::failure(err.clone()));
        prop_assert_eq!(failed.flat_map(half), Vessel::failure(err));
    }

    #[test]
    fn fold_agrees_with_variant(vessel in arbitrary_vessel()) {
        let folded = vessel.clone().fold(|v| v.to_string(), |e| e);
        let expected = match vessel {
            Vessel::Success(v) => v.to_string(),
            Vessel::Failure(e) => e,
        };
        prop_assert_eq!(folded, expected);
    }

    #[test]
    fn filter_keeps_value_only_when_predicate_holds(n in -1000i32..1000) {
        let filtered = Vessel::<i32, String>::success(n)
            .filter(|v| *v >= 0, || format!("{n} is negative"));
        if n >= 0 {
            prop_assert_eq!(filtered, Vessel::success(n));
        } else {
            prop_assert_eq!(filtered, Vessel::failure(format!("{n} is negative")));
        }
    }

    #[test]
    fn sequence_collect_and_traverse_agree(items in prop::collection::vec(arbitrary_vessel(), 0..20)) {
        let sequenced = sequence(items.clone());
        let collected: Vessel<Vec<i32>, String> = items.clone().into_iter().collect();
        let traversed = traverse(items.clone(), |item| item);

        prop_assert_eq!(&sequenced, &collected);
        prop_assert_eq!(&sequenced, &traversed);

        let first_failure = items.iter().find_map(|item| item.error().cloned());
        match first_failure {
            Some(err) => prop_assert_eq!(sequenced, Vessel::failure(err)),
            None => {
                let values: Vec<i32> = items.into_iter().map(Vessel::unwrap).collect();
                prop_assert_eq!(sequenced, Vessel::success(values));
            }
        }
    }

    #[test]
    fn collector_combine_matches_sequential(
        left in prop::collection::vec(arbitrary_vessel(), 0..10),
        right in prop::collection::vec(arbitrary_vessel(), 0..10),
    ) {
        let mut first = Collector::new();
        first.extend(left.clone());
        let mut second = Collector::new();
        second.extend(right.clone());

        let split = first.combine(second).finish();
        let whole: Vessel<Vec<i32>, String> = left.into_iter().chain(right).collect();
        prop_assert_eq!(split, whole);
    }

    #[test]
    fn zip_classifies_failures(first in tagged_vessel(), second in tagged_vessel()) {
        let expected = match (first.is_failure(), second.is_failure()) {
            (true, true) => Some(CombineReason::BothFailed),
            (true, false) => Some(CombineReason::FirstFailed),
            (false, true) => Some(CombineReason::SecondFailed),
            (false, false) => None,
        };
        let both_ok = first.value().zip(second.value()).map(|(a, b)| a + b);

        let zipped = zip(first, second, |a, b| a + b);

        prop_assert_eq!(reason_of(&zipped), expected);
        prop_assert_eq!(zipped.value().copied(), both_ok);
    }

    #[test]
    fn one_of_prefers_first_success(first in tagged_vessel(), second in tagged_vessel()) {
        let expected = first.value().or(second.value()).copied();
        let both_failed = first.is_failure() && second.is_failure();

        let chosen = one_of(first, second);

        prop_assert_eq!(chosen.value().copied(), expected);
        prop_assert_eq!(
            reason_of(&chosen),
            both_failed.then_some(CombineReason::BothFailed)
        );
    }

    #[test]
    fn map_error_leaves_success_untouched(n in -1000i32..1000) {
        let vessel: Vessel<i32, String> = Vessel::success(n);
        prop_assert_eq!(vessel.map_error(|e| e.len()), Vessel::success(n));
    }
}
