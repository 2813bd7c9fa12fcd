//! Expectation suites: named, ordered groups of expectations.

use super::Expectation;
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// A named, ordered collection of expectations.
///
/// Order is preserved and determines the order of outcomes in a
/// [`ValidationResult`](super::ValidationResult). It carries no evaluation
/// dependency: every expectation is evaluated on its own.
///
/// # Examples
///
/// ```rust
/// use assay::core::{Expectation, ExpectationSuite};
///
/// let suite = ExpectationSuite::builder("yellowtaxi_suite")
///     .description("Basic checks on yellow taxi trips")
///     .expect(Expectation::not_null("vendor_id"))
///     .try_expect(Expectation::in_range("passenger_count", Some(0.0), Some(6.0)))
///     .unwrap()
///     .build();
///
/// assert_eq!(suite.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSuite {
    /// The name of the suite
    name: String,
    /// Optional description of the suite's purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// The expectations in evaluation and report order
    #[serde(default)]
    expectations: Vec<Expectation>,
}

impl ExpectationSuite {
    /// Creates an empty suite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            expectations: Vec::new(),
        }
    }

    /// Creates a new builder for constructing a suite.
    pub fn builder(name: impl Into<String>) -> ExpectationSuiteBuilder {
        ExpectationSuiteBuilder::new(name)
    }

    /// Returns the name of the suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description of the suite if available.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Appends an expectation. Duplicates are allowed.
    pub fn add(&mut self, expectation: Expectation) {
        self.expectations.push(expectation);
    }

    /// Removes and returns the expectation at `index`.
    ///
    /// Fails with [`AssayError::IndexOutOfRange`] and leaves the suite unchanged
    /// when `index` is not a valid position.
    pub fn remove(&mut self, index: usize) -> Result<Expectation> {
        if index >= self.expectations.len() {
            return Err(AssayError::IndexOutOfRange {
                index,
                len: self.expectations.len(),
            });
        }
        Ok(self.expectations.remove(index))
    }

    /// Returns the expectations in order.
    pub fn list(&self) -> &[Expectation] {
        &self.expectations
    }

    /// Returns the expectation at `index`.
    pub fn get(&self, index: usize) -> Result<&Expectation> {
        self.expectations
            .get(index)
            .ok_or(AssayError::IndexOutOfRange {
                index,
                len: self.expectations.len(),
            })
    }

    /// Returns the number of expectations.
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Returns true if the suite has no expectations.
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Returns the distinct columns referenced by the suite, in first-use order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for expectation in &self.expectations {
            if !columns.contains(&expectation.column()) {
                columns.push(expectation.column());
            }
        }
        columns
    }
}

/// Builder for constructing [`ExpectationSuite`] instances.
#[derive(Debug)]
pub struct ExpectationSuiteBuilder {
    name: String,
    description: Option<String>,
    expectations: Vec<Expectation>,
}

impl ExpectationSuiteBuilder {
    /// Creates a new suite builder with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            expectations: Vec::new(),
        }
    }

    /// Sets the description for the suite.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an expectation.
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Adds an expectation from a fallible constructor, propagating its error.
    ///
    /// ```rust
    /// use assay::core::{Expectation, ExpectationSuite};
    ///
    /// let built = ExpectationSuite::builder("s")
    ///     .try_expect(Expectation::in_range("fare", Some(10.0), Some(1.0)));
    /// assert!(built.is_err());
    /// ```
    pub fn try_expect(self, expectation: Result<Expectation>) -> Result<Self> {
        Ok(self.expect(expectation?))
    }

    /// Adds multiple expectations.
    pub fn expectations<I>(mut self, expectations: I) -> Self
    where
        I: IntoIterator<Item = Expectation>,
    {
        self.expectations.extend(expectations);
        self
    }

    /// Builds the suite.
    pub fn build(self) -> ExpectationSuite {
        ExpectationSuite {
            name: self.name,
            description: self.description,
            expectations: self.expectations,
        }
    }
}
