//! Checkpoints: load a batch, run a registered suite against it, then act on the result.
//!
//! A [`Checkpoint`] ties a [`DataSource`] to a suite name and a list of
//! [`CheckpointAction`]s. Running it produces a [`CheckpointRun`], which stamps
//! the [`ValidationResult`] with a run id and a run time.
//!
//! # Examples
//!
//! ```rust,no_run
//! use assay::checkpoint::{Checkpoint, LogSummaryAction, WriteReportAction};
//! use assay::core::{SuiteRegistry, ValidationRunner};
//! use assay::formatters::JsonFormatter;
//! use assay::sources::CsvSource;
//!
//! # async fn example(registry: SuiteRegistry) -> assay::prelude::Result<()> {
//! let checkpoint = Checkpoint::builder("yellowtaxi_checkpoint")
//!     .suite("yellowtaxi_suite")
//!     .source(CsvSource::new("data/yellow_tripdata_2019-01.csv")?)
//!     .action(LogSummaryAction)
//!     .action(WriteReportAction::new(JsonFormatter::new(), "reports/yellowtaxi.json"))
//!     .build()?;
//!
//! let run = checkpoint.run(&registry, &ValidationRunner::default()).await?;
//! println!("{} -> {}", run.run_id, run.result.success);
//! # Ok(())
//! # }
//! ```

use crate::core::{SuiteRegistry, ValidationResult, ValidationRunner};
use crate::formatters::ResultFormatter;
use crate::log_data_op;
use crate::prelude::*;
use crate::sources::DataSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The outcome of one checkpoint run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckpointRun {
    /// Name of the checkpoint that ran
    pub checkpoint_name: String,
    /// Unique id of this run
    pub run_id: Uuid,
    /// When the run started
    pub run_time: DateTime<Utc>,
    /// The validation result
    pub result: ValidationResult,
}

/// Something to do with a finished checkpoint run.
pub trait CheckpointAction: fmt::Debug + Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Performs the action.
    fn run(&self, run: &CheckpointRun) -> Result<()>;
}

/// Logs a one-line summary of the run, plus one line per failed expectation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSummaryAction;

impl CheckpointAction for LogSummaryAction {
    fn name(&self) -> &str {
        "log_summary"
    }

    fn run(&self, run: &CheckpointRun) -> Result<()> {
        let stats = &run.result.statistics;
        info!(
            checkpoint.name = %run.checkpoint_name,
            checkpoint.run_id = %run.run_id,
            suite.name = %run.result.suite_name,
            suite.result = %if run.result.success { "passed" } else { "failed" },
            statistics.evaluated = stats.evaluated,
            statistics.successful = stats.successful,
            statistics.unsuccessful = stats.unsuccessful,
            "Checkpoint run summary"
        );
        for outcome in run.result.failed_outcomes() {
            warn!(checkpoint.run_id = %run.run_id, "{}", outcome.summary());
        }
        Ok(())
    }
}

/// Renders the result with a formatter and writes it to a file.
///
/// Parent directories are created as needed; an existing file is overwritten.
pub struct WriteReportAction {
    formatter: Box<dyn ResultFormatter>,
    path: PathBuf,
}

impl WriteReportAction {
    /// Creates an action writing `formatter`'s output to `path`.
    pub fn new(formatter: impl ResultFormatter + 'static, path: impl Into<PathBuf>) -> Self {
        Self {
            formatter: Box::new(formatter),
            path: path.into(),
        }
    }

    /// Returns the report path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, run: &CheckpointRun) -> Result<()> {
        let rendered = self.formatter.format(&run.result)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, rendered)?;
        Ok(())
    }
}

impl fmt::Debug for WriteReportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteReportAction")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl CheckpointAction for WriteReportAction {
    fn name(&self) -> &str {
        "write_report"
    }

    fn run(&self, run: &CheckpointRun) -> Result<()> {
        self.write(run).map_err(|e| AssayError::Action {
            action: self.name().to_string(),
            message: format!("{}: {e}", self.path.display()),
        })?;
        info!(path = %self.path.display(), "Wrote validation report");
        Ok(())
    }
}

/// A data source bound to a registered suite and a list of actions.
#[derive(Debug)]
pub struct Checkpoint {
    name: String,
    suite_name: String,
    source: Box<dyn DataSource>,
    actions: Vec<Box<dyn CheckpointAction>>,
}

impl Checkpoint {
    /// Starts building a checkpoint.
    pub fn builder(name: impl Into<String>) -> CheckpointBuilder {
        CheckpointBuilder {
            name: name.into(),
            suite_name: None,
            source: None,
            actions: Vec::new(),
        }
    }

    /// Returns the checkpoint name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the suite this checkpoint runs.
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Returns the number of configured actions.
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Loads the source, runs the suite and invokes every action in order.
    ///
    /// Source and suite errors abort the run. Every action runs even if an
    /// earlier one fails; the first action error is then returned inside
    /// [`AssayError::CheckpointActions`] together with the completed run.
    #[instrument(skip(self, registry, runner), fields(
        checkpoint.name = %self.name,
        suite.name = %self.suite_name
    ))]
    pub async fn run(
        &self,
        registry: &SuiteRegistry,
        runner: &ValidationRunner,
    ) -> Result<CheckpointRun> {
        let run_id = Uuid::new_v4();
        let run_time = Utc::now();
        log_data_op!(
            runner.config().log,
            checkpoint.run_id = %run_id,
            source = %self.source.description(),
            "Loading checkpoint data"
        );

        let batch = self.source.load().await?;
        let suite = registry.get(&self.suite_name)?;
        let result = runner.run(&batch, &suite)?;

        let run = CheckpointRun {
            checkpoint_name: self.name.clone(),
            run_id,
            run_time,
            result,
        };

        let mut first_error = None;
        for action in &self.actions {
            if let Err(e) = action.run(&run) {
                warn!(action = action.name(), error = %e, "Checkpoint action failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(AssayError::CheckpointActions {
                run: Box::new(run),
                source: Box::new(e),
            }),
            None => Ok(run),
        }
    }
}

/// Builder for [`Checkpoint`].
#[derive(Debug)]
pub struct CheckpointBuilder {
    name: String,
    suite_name: Option<String>,
    source: Option<Box<dyn DataSource>>,
    actions: Vec<Box<dyn CheckpointAction>>,
}

impl CheckpointBuilder {
    /// Sets the registered suite to run.
    pub fn suite(mut self, suite_name: impl Into<String>) -> Self {
        self.suite_name = Some(suite_name.into());
        self
    }

    /// Sets the data source.
    pub fn source(mut self, source: impl DataSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Sets an already boxed data source.
    pub fn boxed_source(mut self, source: Box<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Appends an action.
    pub fn action(mut self, action: impl CheckpointAction + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Builds the checkpoint; the suite and the source are required.
    pub fn build(self) -> Result<Checkpoint> {
        let suite_name = self.suite_name.ok_or_else(|| {
            AssayError::Configuration(format!("Checkpoint '{}' has no suite", self.name))
        })?;
        let source = self.source.ok_or_else(|| {
            AssayError::Configuration(format!("Checkpoint '{}' has no data source", self.name))
        })?;
        Ok(Checkpoint {
            name: self.name,
            suite_name,
            source,
            actions: self.actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Expectation;
    use crate::formatters::{JsonFormatter, MarkdownFormatter};
    use crate::sources::MemorySource;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn source(values: Vec<Option<i64>>) -> MemorySource {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "passenger_count",
            DataType::Int64,
            true,
        )]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap();
        MemorySource::from_batches(vec![batch]).unwrap()
    }

    fn registry() -> SuiteRegistry {
        let registry = SuiteRegistry::new();
        registry.create("taxi").unwrap();
        registry
            .add_expectation("taxi", Expectation::not_null("passenger_count"))
            .unwrap();
        registry
    }

    #[derive(Debug, Default)]
    struct Recording(Arc<Mutex<Vec<Uuid>>>);

    impl CheckpointAction for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn run(&self, run: &CheckpointRun) -> Result<()> {
            self.0.lock().unwrap().push(run.run_id);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl CheckpointAction for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn run(&self, _run: &CheckpointRun) -> Result<()> {
            Err(AssayError::Action {
                action: "failing".to_string(),
                message: "boom".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_run_invokes_actions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let checkpoint = Checkpoint::builder("cp")
            .suite("taxi")
            .source(source(vec![Some(1), None]))
            .action(LogSummaryAction)
            .action(Recording(seen.clone()))
            .build()
            .unwrap();

        let run = checkpoint
            .run(&registry(), &ValidationRunner::default())
            .await
            .unwrap();
        assert_eq!(run.checkpoint_name, "cp");
        assert!(!run.result.success);
        assert_eq!(*seen.lock().unwrap(), vec![run.run_id]);
    }

    #[tokio::test]
    async fn test_write_report_creates_directories() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("reports/nested/taxi.json");
        let md_path = dir.path().join("reports/taxi.md");

        let checkpoint = Checkpoint::builder("cp")
            .suite("taxi")
            .source(source(vec![Some(1), Some(2)]))
            .action(WriteReportAction::new(JsonFormatter::new(), &json_path))
            .action(WriteReportAction::new(MarkdownFormatter::new(), &md_path))
            .build()
            .unwrap();

        let run = checkpoint
            .run(&registry(), &ValidationRunner::default())
            .await
            .unwrap();
        assert!(run.result.success);

        let written: ValidationResult =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(written, run.result);
        assert!(std::fs::read_to_string(&md_path)
            .unwrap()
            .contains("Validation Report - PASSED"));
    }

    #[tokio::test]
    async fn test_action_error_after_all_actions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let checkpoint = Checkpoint::builder("cp")
            .suite("taxi")
            .source(source(vec![Some(1), None]))
            .action(Failing)
            .action(Recording(seen.clone()))
            .build()
            .unwrap();

        let err = checkpoint
            .run(&registry(), &ValidationRunner::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Checkpoint 'cp' ran but an action failed");
        assert_eq!(
            err.checkpoint_run().map(|r| r.checkpoint_name.as_str()),
            Some("cp")
        );

        let (run, source) = match err {
            AssayError::CheckpointActions { run, source } => (run, source),
            other => panic!("expected an action failure, got {other:?}"),
        };
        assert!(matches!(*source, AssayError::Action { ref action, .. } if action == "failing"));
        assert!(!run.result.success);
        assert_eq!(run.result.outcomes[0].detail.unexpected_indices(), vec![1]);
        assert_eq!(*seen.lock().unwrap(), vec![run.run_id]);
    }

    #[tokio::test]
    async fn test_missing_suite_aborts() {
        let checkpoint = Checkpoint::builder("cp")
            .suite("missing")
            .source(source(vec![Some(1)]))
            .build()
            .unwrap();
        let err = checkpoint
            .run(&registry(), &ValidationRunner::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AssayError::SuiteNotFound(_)));
    }

    #[test]
    fn test_builder_requires_suite_and_source() {
        assert!(Checkpoint::builder("cp").build().is_err());
        assert!(Checkpoint::builder("cp").suite("taxi").build().is_err());
    }
}
