//! # Assay - Rule-Based Data Validation for Rust
//!
//! Assay validates tabular data against declarative, column-level rules called
//! *expectations*. Expectations are grouped into named *suites*; a runner
//! evaluates a suite against a batch of data and returns a structured,
//! machine-readable result.
//!
//! ## Quick Start
//!
//! ```rust
//! use assay::prelude::*;
//! use assay::core::{Batch, Expectation, SuiteRegistry, ValidationRunner, Value};
//!
//! # fn main() -> assay::prelude::Result<()> {
//! let registry = SuiteRegistry::new();
//! registry.create("yellowtaxi_suite")?;
//! registry.add_expectation("yellowtaxi_suite", Expectation::not_null("vendor_id"))?;
//! registry.add_expectation(
//!     "yellowtaxi_suite",
//!     Expectation::in_range("passenger_count", Some(0.0), Some(6.0))?,
//! )?;
//!
//! let batch = Batch::builder()
//!     .column("vendor_id", vec![Value::Int(1), Value::Int(2), Value::Int(1)])
//!     .column("passenger_count", vec![Value::Int(1), Value::Int(9), Value::Null])
//!     .build()?;
//!
//! let result = ValidationRunner::default().run_registered(&registry, "yellowtaxi_suite", &batch)?;
//! assert!(!result.success);
//! assert!(result.outcomes[0].success);
//! assert_eq!(result.outcomes[1].detail.unexpected_count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Expectation kinds
//!
//! - **not-null**: no value in the column is null
//! - **in-range**: every non-null value lies within inclusive numeric bounds
//! - **in-set**: every non-null value is one of a fixed set
//! - **match-regex**: every non-null text value matches a pattern
//! - **unique**: no non-null value appears twice
//!
//! Any expectation can be relaxed with `mostly`, the minimum share of applicable
//! rows that must pass.
//!
//! ## Where data comes from
//!
//! The runner reads columns through the [`core::ColumnAccessor`] trait. The
//! [`sources`] module loads CSV files, Parquet files, in-memory Arrow batches and
//! SQL queries through DataFusion into a [`core::Batch`].
//!
//! ## Checkpoints
//!
//! A [`checkpoint::Checkpoint`] loads a source, runs a registered suite and
//! hands the result to actions such as writing JSON or Markdown reports. The
//! `assay-checkpoint` binary runs a checkpoint described by a
//! [`config::CheckpointConfig`] file.
//!
//! ## Logging
//!
//! Assay emits structured events through `tracing`. Install a subscriber with
//! [`logging::setup::init_logging`] or your own.

pub mod checkpoint;
pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod sources;
pub mod store;
