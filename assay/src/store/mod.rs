//! Persistence for expectation suites.
//!
//! A [`SuiteStore`] saves and reloads suites in their declarative form (name,
//! description, ordered `{kind, column, parameters}` entries). The registry
//! itself is in-memory; a store is how suites outlive a process.
//!
//! # Example
//!
//! ```rust,no_run
//! use assay::core::{Expectation, SuiteRegistry};
//! use assay::store::FileSuiteStore;
//!
//! # fn example() -> assay::prelude::Result<()> {
//! let store = FileSuiteStore::new("gx/expectations")?;
//!
//! let registry = SuiteRegistry::new();
//! registry.create("yellowtaxi_suite")?;
//! registry.add_expectation("yellowtaxi_suite", Expectation::not_null("vendor_id"))?;
//! registry.persist_to(&store)?;
//!
//! let reloaded = SuiteRegistry::new();
//! reloaded.load_from(&store)?;
//! # Ok(())
//! # }
//! ```

use crate::core::ExpectationSuite;
use crate::prelude::*;
use std::fmt::Debug;

mod file;

pub use file::FileSuiteStore;

/// Durable storage for expectation suites.
pub trait SuiteStore: Debug + Send + Sync {
    /// Saves a suite, replacing any stored suite with the same name.
    fn save(&self, suite: &ExpectationSuite) -> Result<()>;

    /// Loads a suite by name.
    ///
    /// Fails with [`AssayError::SuiteNotFound`] when nothing is stored under `name`.
    fn load(&self, name: &str) -> Result<ExpectationSuite>;

    /// Lists the stored suite names, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// Deletes a stored suite.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Checks that a suite name can be used as a storage key.
///
/// Names are limited to ASCII letters, digits, `_`, `-` and `.`, and may not
/// start with `.`.
pub fn validate_suite_name(name: &str) -> Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if name.is_empty() || name.starts_with('.') || !valid_chars {
        return Err(AssayError::Configuration(format!(
            "Invalid suite name '{name}': use letters, digits, '_', '-' or '.'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_suite_name() {
        assert!(validate_suite_name("yellowtaxi_suite").is_ok());
        assert!(validate_suite_name("taxi-2024.v1").is_ok());

        assert!(validate_suite_name("").is_err());
        assert!(validate_suite_name(".hidden").is_err());
        assert!(validate_suite_name("../escape").is_err());
        assert!(validate_suite_name("with space").is_err());
    }
}
