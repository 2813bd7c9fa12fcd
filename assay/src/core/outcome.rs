//! Per-expectation outcomes produced by a validation run.

use super::{ExpectationConfig, Value};
use serde::{Deserialize, Serialize};

/// A violating cell captured in an outcome sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnexpectedValue {
    /// Row index of the violating cell
    pub index: usize,
    /// The violating value
    pub value: Value,
}

/// Counts and samples describing how a column measured up against an expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDetail {
    /// Number of rows in the column
    pub element_count: usize,
    /// Number of null values in the column
    pub missing_count: usize,
    /// Number of rows that violated the expectation
    pub unexpected_count: usize,
    /// `unexpected_count` over the rows the rule applies to
    ///
    /// For `not-null` this is every row, for the other kinds only non-null rows.
    /// Zero when no row applies.
    pub unexpected_fraction: f64,
    /// The first violating rows by index, bounded by the runner's sample limit
    pub partial_unexpected_list: Vec<UnexpectedValue>,
}

impl OutcomeDetail {
    /// Returns the number of non-null values in the column.
    pub fn non_null_count(&self) -> usize {
        self.element_count.saturating_sub(self.missing_count)
    }

    /// Returns the row indices held in the sample.
    pub fn unexpected_indices(&self) -> Vec<usize> {
        self.partial_unexpected_list.iter().map(|u| u.index).collect()
    }

    /// Returns true if the sample holds every violating row.
    pub fn sample_is_complete(&self) -> bool {
        self.partial_unexpected_list.len() == self.unexpected_count
    }

    /// Renders the sampled rows as `row <index>: <value>`, comma separated.
    pub fn sample_text(&self) -> String {
        self.partial_unexpected_list
            .iter()
            .map(|u| format!("row {}: {}", u.index, u.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The result of evaluating one expectation against one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationOutcome {
    /// The expectation that produced this outcome, in its declarative form
    pub expectation: ExpectationConfig,
    /// Whether the column satisfied the expectation
    pub success: bool,
    /// Kind-specific counts and samples
    pub detail: OutcomeDetail,
}

impl ExpectationOutcome {
    /// Returns the kind tag of the originating expectation.
    pub fn kind(&self) -> &str {
        &self.expectation.kind
    }

    /// Returns the column the originating expectation checked.
    pub fn column(&self) -> &str {
        self.expectation.column.as_deref().unwrap_or_default()
    }

    /// Returns a one-line description of the outcome for logs and reports.
    pub fn summary(&self) -> String {
        let d = &self.detail;
        if self.success {
            format!(
                "{} on '{}' passed ({} rows checked)",
                self.kind(),
                self.column(),
                d.element_count
            )
        } else {
            format!(
                "{} on '{}' failed: {} unexpected of {} rows ({:.2}%)",
                self.kind(),
                self.column(),
                d.unexpected_count,
                d.element_count,
                d.unexpected_fraction * 100.0
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(unexpected: &[usize]) -> OutcomeDetail {
        OutcomeDetail {
            element_count: 4,
            missing_count: 1,
            unexpected_count: unexpected.len(),
            unexpected_fraction: unexpected.len() as f64 / 3.0,
            partial_unexpected_list: unexpected
                .iter()
                .map(|&index| UnexpectedValue {
                    index,
                    value: Value::Int(99),
                })
                .collect(),
        }
    }

    #[test]
    fn test_detail_helpers() {
        let d = detail(&[0, 2]);
        assert_eq!(d.non_null_count(), 3);
        assert_eq!(d.unexpected_indices(), vec![0, 2]);
        assert!(d.sample_is_complete());
        assert_eq!(d.sample_text(), "row 0: 99, row 2: 99");
        assert_eq!(detail(&[]).sample_text(), "");
    }

    #[test]
    fn test_outcome_summary() {
        let outcome = ExpectationOutcome {
            expectation: ExpectationConfig::new("in-range", "fare_amount"),
            success: false,
            detail: detail(&[1]),
        };
        assert_eq!(outcome.kind(), "in-range");
        assert_eq!(outcome.column(), "fare_amount");
        assert!(outcome.summary().starts_with("in-range on 'fare_amount' failed: 1 unexpected"));
    }
}
