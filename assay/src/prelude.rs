//! Prelude for commonly used types and traits in assay.

pub use crate::core::{
    Batch, ColumnAccessor, Expectation, ExpectationSuite, SuiteRegistry, ValidationResult,
    ValidationRunner, Value,
};
pub use crate::error::{AssayError, Result};
pub use crate::formatters::{FormatterConfig, ResultFormatter};
pub use crate::logging::LogConfig;
