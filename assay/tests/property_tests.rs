//! Property-based tests for the validation runner.
//!
//! Random integer columns (with nulls) are checked against independently
//! computed expectations:
//!
//! - result success is the conjunction of outcome successes, and the statistics add up
//! - running the same suite on the same batch twice gives equal results
//! - range, null and uniqueness counts match a direct count over the data
//! - samples are the first violating rows by index, bounded by the sample limit

use assay::core::{
    Batch, Expectation, ExpectationSuite, RunnerConfig, ValidationRunner, Value,
};
use proptest::prelude::*;
use std::collections::HashMap;

// ============================================================================
// Test Data Generation Utilities
// ============================================================================

fn column_strategy() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::weighted(0.8, -10i64..20), 0..200)
}

fn to_values(column: &[Option<i64>]) -> Vec<Value> {
    column.iter().map(|v| Value::from(*v)).collect()
}

fn batch_of(column: &[Option<i64>]) -> Batch {
    Batch::builder()
        .column("passenger_count", to_values(column))
        .build()
        .unwrap()
}

fn suite(lo: f64, hi: f64, mostly: f64) -> ExpectationSuite {
    ExpectationSuite::builder("property_suite")
        .expect(Expectation::not_null("passenger_count"))
        .try_expect(
            Expectation::in_range("passenger_count", Some(lo), Some(hi))
                .and_then(|e| e.with_mostly(mostly)),
        )
        .unwrap()
        .expect(Expectation::unique("passenger_count"))
        .build()
}

fn bounds() -> impl Strategy<Value = (f64, f64)> {
    (-10i64..20, 0i64..15).prop_map(|(lo, width)| (lo as f64, (lo + width) as f64))
}

// ============================================================================
// Aggregate properties
// ============================================================================

proptest! {
    #[test]
    fn test_success_is_conjunction_of_outcomes(
        column in column_strategy(),
        (lo, hi) in bounds(),
        mostly in 0.0..=1.0f64,
    ) {
        let result = ValidationRunner::default()
            .run(&batch_of(&column), &suite(lo, hi, mostly))
            .unwrap();

        prop_assert_eq!(result.outcomes.len(), 3);
        prop_assert_eq!(result.success, result.outcomes.iter().all(|o| o.success));

        let stats = &result.statistics;
        prop_assert_eq!(stats.evaluated, 3);
        prop_assert_eq!(stats.successful + stats.unsuccessful, stats.evaluated);
        prop_assert_eq!(
            stats.successful,
            result.outcomes.iter().filter(|o| o.success).count()
        );
    }

    #[test]
    fn test_runs_are_idempotent(
        column in column_strategy(),
        (lo, hi) in bounds(),
    ) {
        let batch = batch_of(&column);
        let suite = suite(lo, hi, 1.0);
        let runner = ValidationRunner::default();

        let first = runner.run(&batch, &suite).unwrap();
        let second = runner.run(&batch, &suite).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ============================================================================
// Count properties
// ============================================================================

proptest! {
    #[test]
    fn test_range_counts_match_direct_count(
        column in column_strategy(),
        (lo, hi) in bounds(),
    ) {
        let expected_unexpected = column
            .iter()
            .flatten()
            .filter(|&&v| (v as f64) < lo || (v as f64) > hi)
            .count();
        let non_null = column.iter().flatten().count();

        let outcome = Expectation::in_range("passenger_count", Some(lo), Some(hi))
            .unwrap()
            .evaluate(&to_values(&column), 20);

        prop_assert_eq!(outcome.detail.element_count, column.len());
        prop_assert_eq!(outcome.detail.missing_count, column.len() - non_null);
        prop_assert_eq!(outcome.detail.unexpected_count, expected_unexpected);
        prop_assert_eq!(outcome.success, expected_unexpected == 0);
        if non_null > 0 {
            let fraction = expected_unexpected as f64 / non_null as f64;
            prop_assert!((outcome.detail.unexpected_fraction - fraction).abs() < 1e-12);
        } else {
            prop_assert_eq!(outcome.detail.unexpected_fraction, 0.0);
        }
    }

    #[test]
    fn test_mostly_threshold(
        column in column_strategy(),
        (lo, hi) in bounds(),
        mostly in 0.0..=1.0f64,
    ) {
        let outcome = Expectation::in_range("passenger_count", Some(lo), Some(hi))
            .and_then(|e| e.with_mostly(mostly))
            .unwrap()
            .evaluate(&to_values(&column), 20);

        let d = &outcome.detail;
        let applicable = d.non_null_count();
        let expected = applicable == 0
            || (applicable - d.unexpected_count) as f64 / applicable as f64 >= mostly;
        prop_assert_eq!(outcome.success, expected);
    }

    #[test]
    fn test_not_null_counts_every_null(column in column_strategy()) {
        let nulls: Vec<usize> = column
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i)
            .collect();

        let outcome = Expectation::not_null("passenger_count").evaluate(&to_values(&column), 20);
        prop_assert_eq!(outcome.detail.unexpected_count, nulls.len());
        prop_assert_eq!(outcome.success, nulls.is_empty());
        prop_assert_eq!(
            outcome.detail.unexpected_indices(),
            nulls.into_iter().take(20).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_unique_marks_every_duplicate(column in column_strategy()) {
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for v in column.iter().flatten() {
            *counts.entry(*v).or_default() += 1;
        }
        let expected: usize = counts.values().filter(|&&c| c > 1).sum();

        let outcome = Expectation::unique("passenger_count").evaluate(&to_values(&column), 20);
        prop_assert_eq!(outcome.detail.unexpected_count, expected);
        prop_assert_eq!(outcome.success, expected == 0);
    }
}

// ============================================================================
// Sampling properties
// ============================================================================

proptest! {
    #[test]
    fn test_samples_are_bounded_ordered_prefix(
        column in column_strategy(),
        sample_limit in 0usize..30,
    ) {
        let batch = batch_of(&column);
        let suite = ExpectationSuite::builder("s")
            .try_expect(Expectation::in_range("passenger_count", Some(0.0), Some(6.0)))
            .unwrap()
            .build();

        let limited = ValidationRunner::new(RunnerConfig::default().with_sample_limit(sample_limit))
            .run(&batch, &suite)
            .unwrap();
        let unlimited = ValidationRunner::new(RunnerConfig::default().with_sample_limit(usize::MAX))
            .run(&batch, &suite)
            .unwrap();

        let sample = &limited.outcomes[0].detail.partial_unexpected_list;
        let all = &unlimited.outcomes[0].detail.partial_unexpected_list;

        prop_assert!(sample.len() <= sample_limit);
        prop_assert_eq!(sample.len(), sample_limit.min(all.len()));
        prop_assert_eq!(&all[..sample.len()], &sample[..]);
        prop_assert!(sample.windows(2).all(|w| w[0].index < w[1].index));
        prop_assert!(unlimited.outcomes[0].detail.sample_is_complete());
        for u in sample {
            prop_assert_eq!(&u.value, &batch_value(&column, u.index));
        }
    }
}

fn batch_value(column: &[Option<i64>], index: usize) -> Value {
    Value::from(column[index])
}

// ============================================================================
// Edge cases
// ============================================================================

#[cfg(test)]
mod edge_case_tests {
    use super::*;

    #[test]
    fn test_empty_column_is_vacuously_successful() {
        let result = ValidationRunner::default()
            .run(&batch_of(&[]), &suite(0.0, 6.0, 1.0))
            .unwrap();
        assert!(result.success);
        assert!(result.outcomes.iter().all(|o| o.detail.element_count == 0));
    }

    #[test]
    fn test_null_only_column() {
        let result = ValidationRunner::default()
            .run(&batch_of(&[None, None, None]), &suite(0.0, 6.0, 1.0))
            .unwrap();
        let flags: Vec<bool> = result.outcomes.iter().map(|o| o.success).collect();
        // not-null fails; range and uniqueness have no applicable rows
        assert_eq!(flags, vec![false, true, true]);
        assert_eq!(result.outcomes[0].detail.unexpected_fraction, 1.0);
    }
}
