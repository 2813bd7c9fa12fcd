//! Validation result types.

use super::ExpectationOutcome;
use serde::{Deserialize, Serialize};

/// Counts summarizing a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    /// Number of expectations evaluated
    pub evaluated: usize,
    /// Number of expectations that succeeded
    pub successful: usize,
    /// Number of expectations that failed
    pub unsuccessful: usize,
    /// Share of successful expectations as a percentage (0.0 to 100.0)
    pub success_percent: f64,
}

impl ValidationStatistics {
    /// Computes statistics over a list of outcomes.
    ///
    /// An empty list yields 100% success.
    pub fn from_outcomes(outcomes: &[ExpectationOutcome]) -> Self {
        let evaluated = outcomes.len();
        let successful = outcomes.iter().filter(|o| o.success).count();
        let success_percent = if evaluated == 0 {
            100.0
        } else {
            (successful as f64 / evaluated as f64) * 100.0
        };
        Self {
            evaluated,
            successful,
            unsuccessful: evaluated - successful,
            success_percent,
        }
    }
}

/// The result of running an expectation suite against a batch.
///
/// `success` is the conjunction of every outcome's `success`, so a suite with
/// no expectations succeeds. Outcomes are in suite order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The name of the suite that was run
    pub suite_name: String,
    /// True when every expectation succeeded
    pub success: bool,
    /// Summary counts
    pub statistics: ValidationStatistics,
    /// One outcome per expectation, in suite order
    pub outcomes: Vec<ExpectationOutcome>,
}

impl ValidationResult {
    /// Assembles a result, deriving `success` and statistics from the outcomes.
    pub fn new(suite_name: impl Into<String>, outcomes: Vec<ExpectationOutcome>) -> Self {
        Self {
            suite_name: suite_name.into(),
            success: outcomes.iter().all(|o| o.success),
            statistics: ValidationStatistics::from_outcomes(&outcomes),
            outcomes,
        }
    }

    /// Returns true if every expectation succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the outcomes that failed, in suite order.
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &ExpectationOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Formats the result as pretty-printed JSON.
    ///
    /// This is a convenience method over [`JsonFormatter`](crate::formatters::JsonFormatter).
    ///
    /// ```rust
    /// # use assay::core::ValidationResult;
    /// let result = ValidationResult::new("empty", vec![]);
    /// let json = result.to_json().unwrap();
    /// assert!(json.contains("\"success\": true"));
    /// ```
    pub fn to_json(&self) -> crate::prelude::Result<String> {
        use crate::formatters::{JsonFormatter, ResultFormatter};
        JsonFormatter::new().format(self)
    }

    /// Formats the result as a human-readable text summary.
    pub fn to_human(&self) -> crate::prelude::Result<String> {
        use crate::formatters::{HumanFormatter, ResultFormatter};
        HumanFormatter::new().format(self)
    }

    /// Formats the result as a Markdown report.
    pub fn to_markdown(&self) -> crate::prelude::Result<String> {
        use crate::formatters::{MarkdownFormatter, ResultFormatter};
        MarkdownFormatter::new().format(self)
    }
}
