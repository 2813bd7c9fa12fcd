//! File configuration for checkpoint runs.
//!
//! A checkpoint file names the suite store, the suite, the data source and the
//! reports to write:
//!
//! ```json
//! {
//!   "name": "yellowtaxi_checkpoint",
//!   "suite_store": "suites",
//!   "suite": "yellowtaxi_suite",
//!   "source": { "type": "csv", "path": "data/yellow_tripdata_2019-01.csv" },
//!   "sample_limit": 20,
//!   "reports": [
//!     { "format": "json", "path": "reports/yellowtaxi.json" },
//!     { "format": "markdown", "path": "reports/yellowtaxi.md" }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use crate::checkpoint::{Checkpoint, LogSummaryAction, WriteReportAction};
use crate::core::{RunnerConfig, SuiteRegistry, DEFAULT_SAMPLE_LIMIT};
use crate::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter};
use crate::logging::LogConfig;
use crate::prelude::*;
use crate::sources::{CsvOptions, CsvSource, DataSource, ParquetSource};
use crate::store::{validate_suite_name, FileSuiteStore, SuiteStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Configuration of a checkpoint run, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpointConfig {
    /// Checkpoint name, used in logs
    pub name: String,
    /// Directory of the suite store
    pub suite_store: PathBuf,
    /// Name of the suite to run
    pub suite: String,
    /// Where the data comes from
    pub source: SourceConfig,
    /// Maximum number of violating rows sampled per outcome
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,
    /// Reports written after the run
    #[serde(default)]
    pub reports: Vec<ReportConfig>,
}

fn default_sample_limit() -> usize {
    DEFAULT_SAMPLE_LIMIT
}

fn default_has_header() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

/// Data source section of a [`CheckpointConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum SourceConfig {
    /// CSV file or glob pattern
    Csv {
        path: String,
        #[serde(default = "default_has_header")]
        has_header: bool,
        #[serde(default = "default_delimiter")]
        delimiter: char,
    },
    /// Parquet file or glob pattern
    Parquet { path: String },
}

impl SourceConfig {
    fn path(&self) -> &str {
        match self {
            SourceConfig::Csv { path, .. } | SourceConfig::Parquet { path } => path,
        }
    }

    fn path_mut(&mut self) -> &mut String {
        match self {
            SourceConfig::Csv { path, .. } | SourceConfig::Parquet { path } => path,
        }
    }

    /// Builds the configured data source.
    pub fn build(&self) -> Result<Box<dyn DataSource>> {
        let path = self.path();
        let is_glob = path.contains(['*', '?', '[']);
        match self {
            SourceConfig::Csv {
                has_header,
                delimiter,
                ..
            } => {
                let options = CsvOptions {
                    has_header: *has_header,
                    delimiter: delimiter_byte(*delimiter)?,
                    ..Default::default()
                };
                let source = if is_glob {
                    CsvSource::from_glob(path)?.with_custom_options(options)
                } else {
                    CsvSource::with_options(path, options)?
                };
                Ok(Box::new(source))
            }
            SourceConfig::Parquet { .. } => {
                let source = if is_glob {
                    ParquetSource::from_glob(path)?
                } else {
                    ParquetSource::new(path)?
                };
                Ok(Box::new(source))
            }
        }
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            AssayError::Configuration(format!(
                "CSV delimiter must be a single ASCII character, got '{delimiter}'"
            ))
        })
}

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Human,
    Markdown,
}

/// A report written after a checkpoint run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub path: PathBuf,
}

impl ReportConfig {
    fn action(&self) -> WriteReportAction {
        // files never get ANSI colors
        let config = FormatterConfig::default().with_colors(false);
        match self.format {
            ReportFormat::Json => {
                WriteReportAction::new(JsonFormatter::with_config(config), &self.path)
            }
            ReportFormat::Human => {
                WriteReportAction::new(HumanFormatter::with_config(config), &self.path)
            }
            ReportFormat::Markdown => {
                WriteReportAction::new(MarkdownFormatter::with_config(config), &self.path)
            }
        }
    }
}

impl CheckpointConfig {
    /// Reads and validates a configuration file.
    #[instrument(skip_all)]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AssayError::Configuration(format!(
                "Checkpoint config file '{}' does not exist",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&json).map_err(|e| {
            AssayError::Configuration(format!("{}: {e}", path.display()))
        })?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        debug!(checkpoint.name = %config.name, "Loaded checkpoint config");
        Ok(config)
    }

    /// Parses a configuration from JSON without touching the filesystem.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Makes relative paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &Path| -> PathBuf {
            if p.is_relative() {
                base.join(p)
            } else {
                p.to_path_buf()
            }
        };

        self.suite_store = resolve(&self.suite_store);
        let source_path = self.source.path_mut();
        *source_path = resolve(Path::new(source_path.as_str()))
            .to_string_lossy()
            .into_owned();
        for report in &mut self.reports {
            report.path = resolve(&report.path);
        }
    }

    /// Checks that the prerequisites of a run are in place.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AssayError::Configuration(
                "Checkpoint name must not be empty".to_string(),
            ));
        }
        validate_suite_name(&self.suite)?;

        if !self.suite_store.is_dir() {
            return Err(AssayError::Configuration(format!(
                "Suite store directory '{}' does not exist",
                self.suite_store.display()
            )));
        }

        let source_path = self.source.path();
        if !source_path.contains(['*', '?', '[']) && !Path::new(source_path).is_file() {
            return Err(AssayError::Configuration(format!(
                "Data file '{source_path}' does not exist"
            )));
        }
        if let SourceConfig::Csv { delimiter, .. } = &self.source {
            delimiter_byte(*delimiter)?;
        }
        Ok(())
    }

    /// Returns the runner configuration for this checkpoint.
    pub fn runner_config(&self, log: LogConfig) -> RunnerConfig {
        RunnerConfig::default()
            .with_sample_limit(self.sample_limit)
            .with_log_config(log)
    }

    /// Opens the suite store and registers the configured suite.
    pub fn load_registry(&self) -> Result<SuiteRegistry> {
        let store = FileSuiteStore::open(&self.suite_store)?;
        let registry = SuiteRegistry::new();
        registry.register(store.load(&self.suite)?)?;
        Ok(registry)
    }

    /// Builds the checkpoint: the configured source, a log summary and one
    /// report action per configured report.
    pub fn build_checkpoint(&self) -> Result<Checkpoint> {
        self.reports
            .iter()
            .fold(
                Checkpoint::builder(&self.name)
                    .suite(&self.suite)
                    .boxed_source(self.source.build()?)
                    .action(LogSummaryAction),
                |builder, report| builder.action(report.action()),
            )
            .build()
    }
}
