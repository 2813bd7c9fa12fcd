//! The validation runner: evaluates a suite against a batch.

use super::{ColumnAccessor, ExpectationSuite, SuiteRegistry, ValidationResult};
use crate::logging::{truncate_field, LogConfig};
use crate::prelude::*;
use crate::{log_expectation, perf_debug};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Default number of violating rows kept per outcome.
pub const DEFAULT_SAMPLE_LIMIT: usize = 20;

/// Configuration for a [`ValidationRunner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of violating rows sampled per outcome
    pub sample_limit: usize,
    /// Logging behaviour during runs
    pub log: LogConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            log: LogConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Sets the maximum number of violating rows sampled per outcome.
    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

/// Executes expectation suites against batches.
///
/// A run evaluates every expectation in suite order and never stops early on a
/// failed expectation: the result is always exhaustive. A run aborts with
/// [`AssayError::UnknownColumn`] when an expectation references a column the
/// batch does not declare; no partial result is produced in that case.
///
/// Runs are deterministic. The runner holds no state between runs, and the
/// same batch and suite always produce equal results.
///
/// # Examples
///
/// ```rust
/// use assay::core::{Batch, Expectation, ExpectationSuite, ValidationRunner, Value};
///
/// let batch = Batch::builder()
///     .column("passenger_count", vec![Value::Int(1), Value::Int(7), Value::Null])
///     .build()
///     .unwrap();
///
/// let suite = ExpectationSuite::builder("yellowtaxi_suite")
///     .expect(Expectation::not_null("passenger_count"))
///     .try_expect(Expectation::in_range("passenger_count", Some(0.0), Some(6.0)))
///     .unwrap()
///     .build();
///
/// let result = ValidationRunner::default().run(&batch, &suite).unwrap();
/// assert!(!result.success);
/// assert_eq!(result.outcomes.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationRunner {
    config: RunnerConfig,
}

impl ValidationRunner {
    /// Creates a runner with the given configuration.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Returns the runner configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs a suite against a batch.
    #[instrument(skip(self, batch, suite), fields(
        suite.name = %suite.name(),
        suite.expectations = suite.len(),
        batch.rows = batch.num_rows()
    ))]
    pub fn run<A>(&self, batch: &A, suite: &ExpectationSuite) -> Result<ValidationResult>
    where
        A: ColumnAccessor + ?Sized,
    {
        info!(
            suite.name = %suite.name(),
            suite.expectations = suite.len(),
            batch.rows = batch.num_rows(),
            "Starting validation run"
        );
        let start_time = Instant::now();

        // Resolve every column up front so a misconfigured suite aborts before any evaluation.
        let columns = suite
            .list()
            .iter()
            .enumerate()
            .map(|(index, expectation)| {
                batch.get_column(expectation.column()).map_err(|e| {
                    warn!(
                        suite.name = %suite.name(),
                        expectation.index = index,
                        expectation.column = %expectation.column(),
                        "Aborting run: expectation references an unknown column"
                    );
                    e.at_expectation(index)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut outcomes = Vec::with_capacity(suite.len());
        for (index, (expectation, values)) in suite.list().iter().zip(columns).enumerate() {
            perf_debug!(
                self.config.log,
                expectation.index = index,
                expectation.kind = expectation.kind().tag(),
                expectation.column = %expectation.column(),
                "Evaluating expectation"
            );

            let outcome = expectation.evaluate(values, self.config.sample_limit);

            if outcome.success {
                log_expectation!(
                    self.config.log,
                    expectation.index = index,
                    expectation.kind = expectation.kind().tag(),
                    expectation.column = %expectation.column(),
                    "Expectation met"
                );
            } else {
                warn!(
                    suite.name = %suite.name(),
                    expectation.index = index,
                    expectation.kind = expectation.kind().tag(),
                    expectation.column = %expectation.column(),
                    outcome.unexpected_count = outcome.detail.unexpected_count,
                    outcome.unexpected_fraction = outcome.detail.unexpected_fraction,
                    outcome.samples = %truncate_field(
                        &outcome.detail.sample_text(),
                        self.config.log.max_field_length
                    ),
                    "Expectation failed"
                );
            }
            outcomes.push(outcome);
        }

        let result = ValidationResult::new(suite.name(), outcomes);

        if self.config.log.log_metrics {
            info!(
                suite.name = %suite.name(),
                statistics.evaluated = result.statistics.evaluated,
                statistics.successful = result.statistics.successful,
                statistics.unsuccessful = result.statistics.unsuccessful,
                statistics.success_percent = %format!("{:.2}%", result.statistics.success_percent),
                duration_ms = start_time.elapsed().as_millis() as u64,
                suite.result = %if result.success { "passed" } else { "failed" },
                "Validation run completed"
            );
        }

        Ok(result)
    }

    /// Looks up a suite in a registry and runs it against a batch.
    pub fn run_registered<A>(
        &self,
        registry: &SuiteRegistry,
        suite_name: &str,
        batch: &A,
    ) -> Result<ValidationResult>
    where
        A: ColumnAccessor + ?Sized,
    {
        let suite = registry.get(suite_name)?;
        self.run(batch, &suite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Batch, Expectation, Value};

    fn batch() -> Batch {
        Batch::builder()
            .column(
                "store_and_fwd_flag",
                vec![Value::from("a"), Value::Null, Value::from("b"), Value::Null],
            )
            .column(
                "passenger_count",
                vec![Value::Int(0), Value::Int(3), Value::Int(6), Value::Int(7)],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_is_exhaustive_and_ordered() {
        let suite = ExpectationSuite::builder("s")
            .expect(Expectation::not_null("store_and_fwd_flag"))
            .expect(Expectation::not_null("passenger_count"))
            .try_expect(Expectation::in_range("passenger_count", Some(0.0), Some(6.0)))
            .unwrap()
            .build();

        let result = ValidationRunner::default().run(&batch(), &suite).unwrap();
        assert!(!result.success);
        let flags: Vec<bool> = result.outcomes.iter().map(|o| o.success).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert_eq!(result.outcomes[0].detail.unexpected_indices(), vec![1, 3]);
        assert_eq!(result.outcomes[2].column(), "passenger_count");
    }

    #[test]
    fn test_unknown_column_aborts_with_index() {
        let suite = ExpectationSuite::builder("s")
            .expect(Expectation::not_null("passenger_count"))
            .expect(Expectation::not_null("nonexistent"))
            .build();

        let err = ValidationRunner::default().run(&batch(), &suite).unwrap_err();
        match err {
            AssayError::UnknownColumn { column, expectation } => {
                assert_eq!(column, "nonexistent");
                assert_eq!(expectation, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_suite_succeeds() {
        let result = ValidationRunner::default()
            .run(&batch(), &ExpectationSuite::new("empty"))
            .unwrap();
        assert!(result.success);
        assert!(result.outcomes.is_empty());
    }

    #[test]
    fn test_sample_limit_is_applied() {
        let batch = Batch::builder()
            .column("c", vec![Value::Null; 10])
            .build()
            .unwrap();
        let suite = ExpectationSuite::builder("s")
            .expect(Expectation::not_null("c"))
            .build();
        let runner = ValidationRunner::new(RunnerConfig::default().with_sample_limit(3));
        let result = runner.run(&batch, &suite).unwrap();
        assert_eq!(result.outcomes[0].detail.unexpected_indices(), vec![0, 1, 2]);
        assert_eq!(result.outcomes[0].detail.unexpected_count, 10);
    }

    #[test]
    fn test_run_registered() {
        let registry = SuiteRegistry::new();
        registry.create("taxi").unwrap();
        registry
            .add_expectation("taxi", Expectation::not_null("passenger_count"))
            .unwrap();

        let runner = ValidationRunner::default();
        assert!(runner.run_registered(&registry, "taxi", &batch()).unwrap().success);
        assert!(matches!(
            runner.run_registered(&registry, "missing", &batch()),
            Err(AssayError::SuiteNotFound(_))
        ));
    }
}
