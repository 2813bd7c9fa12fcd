//! Core validation types: batches, expectations, suites and the runner.
//!
//! ## Overview
//!
//! - **[`Batch`]**: an immutable snapshot of tabular data, read through the
//!   [`ColumnAccessor`] trait
//! - **[`Expectation`]**: a rule over one column, one of the [`ExpectationKind`] variants
//! - **[`ExpectationSuite`]**: a named, ordered collection of expectations
//! - **[`SuiteRegistry`]**: a caller-owned, lock-guarded map of suites by name
//! - **[`ValidationRunner`]**: evaluates a suite against a batch and returns a
//!   [`ValidationResult`]
//!
//! ## Architecture
//!
//! ```text
//! SuiteRegistry ── get(name) ──> ExpectationSuite
//!                                   ├── Expectation 0 (column a)
//!                                   └── Expectation 1 (column b)
//!                                              │
//! Batch ── ColumnAccessor::get_column ──> ValidationRunner::run
//!                                              │
//!                                   ValidationResult
//!                                   ├── ExpectationOutcome 0
//!                                   └── ExpectationOutcome 1
//! ```
//!
//! ## Outcomes vs. errors
//!
//! A violated expectation is routine output: `success == false` on its outcome
//! and on the result. Errors are reserved for configuration mistakes (bad
//! parameters, duplicate or missing suites, bad indices) and for unknown
//! columns, which abort the whole run.

mod batch;
mod expectation;
mod outcome;
mod registry;
mod result;
mod runner;
mod suite;
mod value;

pub use batch::{Batch, BatchBuilder, ColumnAccessor};
pub use expectation::{Expectation, ExpectationConfig, ExpectationKind, Pattern};
pub use outcome::{ExpectationOutcome, OutcomeDetail, UnexpectedValue};
pub use registry::SuiteRegistry;
pub use result::{ValidationResult, ValidationStatistics};
pub use runner::{RunnerConfig, ValidationRunner, DEFAULT_SAMPLE_LIMIT};
pub use suite::{ExpectationSuite, ExpectationSuiteBuilder};
pub use value::Value;
