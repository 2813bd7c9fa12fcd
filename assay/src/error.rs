//! Error types for the assay validation engine.
//!
//! All fallible operations return [`AssayError`]. The variants fall into three
//! families that callers are expected to treat differently:
//!
//! - configuration errors, raised eagerly while building expectations, suites
//!   and registries;
//! - data-access errors, which abort a validation run;
//! - infrastructure errors from data sources, serialization and I/O.
//!
//! A failed expectation is *not* an error. It is reported through
//! [`crate::core::ExpectationOutcome::success`].

use crate::checkpoint::CheckpointRun;
use thiserror::Error;

/// The main error type for the assay library.
#[derive(Error, Debug)]
pub enum AssayError {
    /// A column referenced by an expectation is not present in the batch.
    #[error("Column '{column}' not found in batch{}", expectation_suffix(.expectation))]
    UnknownColumn {
        /// Name of the missing column
        column: String,
        /// Position of the expectation in its suite, when raised by a run
        expectation: Option<usize>,
    },

    /// An expectation was declared with an unknown kind or malformed parameters.
    #[error("Invalid expectation config for kind '{kind}': {reason}")]
    InvalidExpectationConfig {
        /// The declared kind tag
        kind: String,
        /// What is wrong with the declaration
        reason: String,
    },

    /// A suite with the same name is already registered.
    #[error("Expectation suite '{0}' already exists")]
    DuplicateSuiteName(String),

    /// No suite is registered under the requested name.
    #[error("Expectation suite '{0}' not found")]
    SuiteNotFound(String),

    /// An expectation index is outside the suite bounds.
    #[error("Expectation index {index} out of range for suite of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A batch could not be assembled because its columns are inconsistent.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// Error from data source operations.
    #[error("Data source error ({source_type}): {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Parquet", "Query")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration files or options.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A checkpoint action failed after the validation result was produced.
    #[error("Checkpoint action '{action}' failed: {message}")]
    Action { action: String, message: String },

    /// A checkpoint validated its data, then at least one of its actions failed.
    ///
    /// Carries the completed run so the validation status is not lost.
    #[error("Checkpoint '{}' ran but an action failed", .run.checkpoint_name)]
    CheckpointActions {
        /// The completed run
        run: Box<CheckpointRun>,
        /// The first action error
        #[source]
        source: Box<AssayError>,
    },

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn expectation_suffix(expectation: &Option<usize>) -> String {
    match expectation {
        Some(index) => format!(" (expectation #{index})"),
        None => String::new(),
    }
}

/// A type alias for `Result<T, AssayError>`.
pub type Result<T> = std::result::Result<T, AssayError>;

impl AssayError {
    /// Creates an unknown column error that is not tied to an expectation.
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            expectation: None,
        }
    }

    /// Creates an invalid expectation config error.
    pub fn invalid_config(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidExpectationConfig {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Attaches the index of the expectation that triggered an unknown column error.
    ///
    /// Other variants are returned unchanged.
    pub fn at_expectation(self, index: usize) -> Self {
        match self {
            Self::UnknownColumn { column, .. } => Self::UnknownColumn {
                column,
                expectation: Some(index),
            },
            other => other,
        }
    }

    /// Returns the completed checkpoint run carried by a failed action.
    pub fn checkpoint_run(&self) -> Option<&CheckpointRun> {
        match self {
            Self::CheckpointActions { run, .. } => Some(run.as_ref()),
            _ => None,
        }
    }

    /// Returns true for caller mistakes detected while declaring expectations and suites.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidExpectationConfig { .. }
                | Self::DuplicateSuiteName(_)
                | Self::SuiteNotFound(_)
                | Self::IndexOutOfRange { .. }
                | Self::Configuration(_)
        )
    }

    /// Returns true for errors that abort a run because data could not be accessed.
    pub fn is_data_access_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownColumn { .. } | Self::InvalidBatch(_) | Self::DataSource { .. }
        )
    }
}

impl From<serde_json::Error> for AssayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
