//! Result formatting and reporting for validation results.
//!
//! Formatters render a [`ValidationResult`] as JSON for machines, plain text for
//! terminals and logs, or Markdown for reports and pull requests.
//!
//! # Examples
//!
//! ```rust
//! use assay::core::{Batch, Expectation, ExpectationSuite, ValidationRunner, Value};
//! use assay::formatters::{HumanFormatter, FormatterConfig, ResultFormatter};
//!
//! let batch = Batch::builder()
//!     .column("vendor_id", vec![Value::Int(1), Value::Null])
//!     .build()
//!     .unwrap();
//! let suite = ExpectationSuite::builder("taxi")
//!     .expect(Expectation::not_null("vendor_id"))
//!     .build();
//! let result = ValidationRunner::default().run(&batch, &suite).unwrap();
//!
//! let formatter = HumanFormatter::with_config(FormatterConfig::default().with_colors(false));
//! let output = formatter.format(&result).unwrap();
//! assert!(output.contains("Validation FAILED"));
//! ```

use crate::core::{ExpectationOutcome, ValidationResult};
use crate::prelude::*;
use std::fmt::{self, Write};

/// Configuration options for formatting validation results.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include per-expectation details (counts and samples)
    pub include_details: bool,
    /// Maximum number of sampled rows shown per outcome (`None` for all)
    pub max_samples: Option<usize>,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_details: true,
            max_samples: None,
            use_colors: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the summary.
    pub fn minimal() -> Self {
        Self {
            include_details: false,
            max_samples: Some(0),
            use_colors: false,
        }
    }

    /// Creates a configuration suitable for CI environments.
    pub fn ci() -> Self {
        Self {
            include_details: true,
            max_samples: Some(5),
            use_colors: false,
        }
    }

    /// Sets whether to include per-expectation details.
    pub fn with_details(mut self, include: bool) -> Self {
        self.include_details = include;
        self
    }

    /// Sets the maximum number of sampled rows shown per outcome.
    pub fn with_max_samples(mut self, max: usize) -> Self {
        self.max_samples = Some(max);
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn samples<'a>(&self, outcome: &'a ExpectationOutcome) -> &'a [crate::core::UnexpectedValue] {
        let list = &outcome.detail.partial_unexpected_list;
        match self.max_samples {
            Some(max) => &list[..max.min(list.len())],
            None => list,
        }
    }
}

/// Trait for formatting validation results into different output formats.
///
/// # Examples
///
/// ```rust
/// use assay::formatters::ResultFormatter;
/// use assay::core::ValidationResult;
///
/// struct OneLine;
///
/// impl ResultFormatter for OneLine {
///     fn format(&self, result: &ValidationResult) -> assay::prelude::Result<String> {
///         Ok(format!("{}: {}", result.suite_name, result.success))
///     }
/// }
///
/// let result = ValidationResult::new("empty", vec![]);
/// assert_eq!(OneLine.format(&result).unwrap(), "empty: true");
/// ```
pub trait ResultFormatter: Send + Sync {
    /// Formats a validation result into a string representation.
    fn format(&self, result: &ValidationResult) -> Result<String>;

    /// Formats a validation result with custom configuration.
    fn format_with_config(
        &self,
        result: &ValidationResult,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(result)
    }
}

fn render_error(e: fmt::Error) -> AssayError {
    AssayError::Internal(format!("Failed to render report: {e}"))
}

/// Formats validation results as structured JSON.
///
/// The document has the same shape as [`ValidationResult`]'s serde form, with
/// samples trimmed according to the configuration.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, result: &ValidationResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(
        &self,
        result: &ValidationResult,
        config: &FormatterConfig,
    ) -> Result<String> {
        let filtered = filter_result_for_config(result, config);
        let json = if self.pretty {
            serde_json::to_string_pretty(&filtered)?
        } else {
            serde_json::to_string(&filtered)?
        };
        Ok(json)
    }
}

/// Formats validation results in a human-readable format suitable for console output.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a new human formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    /// Creates a new human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn render(
        &self,
        out: &mut String,
        result: &ValidationResult,
        config: &FormatterConfig,
    ) -> fmt::Result {
        let paint = |code: &str, text: &str| {
            if config.use_colors {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text.to_string()
            }
        };

        writeln!(out)?;
        if result.is_success() {
            writeln!(out, "✅ {}", paint("32", "Validation PASSED"))?;
        } else {
            writeln!(out, "❌ {}", paint("31", "Validation FAILED"))?;
        }
        writeln!(out)?;
        writeln!(out, "Suite: {}", result.suite_name)?;

        let stats = &result.statistics;
        writeln!(out)?;
        writeln!(out, "📊 Summary Statistics:")?;
        writeln!(out, "   Evaluated: {}", stats.evaluated)?;
        writeln!(out, "   ✅ Successful: {}", paint("32", &stats.successful.to_string()))?;
        writeln!(out, "   ❌ Unsuccessful: {}", paint("31", &stats.unsuccessful.to_string()))?;
        writeln!(out, "   Success Rate: {:.1}%", stats.success_percent)?;

        if !config.include_details || result.outcomes.is_empty() {
            writeln!(out)?;
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "🔍 Expectations:")?;
        for (i, outcome) in result.outcomes.iter().enumerate() {
            let mark = if outcome.success {
                paint("32", "PASS")
            } else {
                paint("31", "FAIL")
            };
            writeln!(out)?;
            writeln!(out, "   [{mark}] #{} {} on '{}'", i + 1, outcome.kind(), outcome.column())?;
            if outcome.success {
                continue;
            }

            let d = &outcome.detail;
            writeln!(
                out,
                "      Unexpected: {} of {} rows ({:.2}%)",
                d.unexpected_count,
                d.element_count,
                d.unexpected_fraction * 100.0
            )?;
            writeln!(out, "      Missing: {}", d.missing_count)?;

            let samples = config.samples(outcome);
            if !samples.is_empty() {
                let shown: Vec<String> = samples
                    .iter()
                    .map(|u| format!("row {}: {}", u.index, u.value))
                    .collect();
                writeln!(out, "      Samples: {}", shown.join(", "))?;
            }
            let hidden = d.unexpected_count.saturating_sub(samples.len());
            if hidden > 0 {
                writeln!(out, "      ... and {hidden} more unexpected rows")?;
            }
        }

        writeln!(out)?;
        Ok(())
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, result: &ValidationResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(
        &self,
        result: &ValidationResult,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        self.render(&mut output, result, config)
            .map_err(render_error)?;
        Ok(output)
    }
}

/// Formats validation results as Markdown suitable for documentation.
///
/// Outcomes are rendered as a table; failed expectations additionally get a
/// section listing their sampled rows.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a new Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    /// Creates a new Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }

    fn render(
        &self,
        out: &mut String,
        result: &ValidationResult,
        config: &FormatterConfig,
    ) -> fmt::Result {
        let h = "#".repeat(self.heading_level as usize);

        if result.is_success() {
            writeln!(out, "{h} ✅ Validation Report - PASSED")?;
        } else {
            writeln!(out, "{h} ❌ Validation Report - FAILED")?;
        }
        writeln!(out)?;
        writeln!(out, "**Suite:** {}", result.suite_name)?;

        let stats = &result.statistics;
        writeln!(out)?;
        writeln!(out, "{h}# Summary")?;
        writeln!(out)?;
        writeln!(out, "| Metric | Value |")?;
        writeln!(out, "|--------|-------|")?;
        writeln!(out, "| Evaluated | {} |", stats.evaluated)?;
        writeln!(out, "| Successful | {} |", stats.successful)?;
        writeln!(out, "| Unsuccessful | {} |", stats.unsuccessful)?;
        writeln!(out, "| Success Rate | {:.1}% |", stats.success_percent)?;

        if !config.include_details || result.outcomes.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "{h}# Expectations")?;
        writeln!(out)?;
        writeln!(out, "| # | Kind | Column | Status | Unexpected | Fraction |")?;
        writeln!(out, "|---|------|--------|--------|------------|----------|")?;
        for (i, outcome) in result.outcomes.iter().enumerate() {
            writeln!(
                out,
                "| {} | {} | `{}` | {} | {} | {:.2}% |",
                i + 1,
                outcome.kind(),
                escape_cell(outcome.column()),
                if outcome.success { "✅" } else { "❌" },
                outcome.detail.unexpected_count,
                outcome.detail.unexpected_fraction * 100.0
            )?;
        }

        for (i, outcome) in result.outcomes.iter().enumerate() {
            let samples = config.samples(outcome);
            if outcome.success || samples.is_empty() {
                continue;
            }
            writeln!(out)?;
            writeln!(
                out,
                "{h}## 🚨 #{}: {} on `{}`",
                i + 1,
                outcome.kind(),
                escape_cell(outcome.column())
            )?;
            writeln!(out)?;
            for u in samples {
                writeln!(out, "- row {}: `{}`", u.index, u.value)?;
            }
            let hidden = outcome.detail.unexpected_count.saturating_sub(samples.len());
            if hidden > 0 {
                writeln!(out)?;
                writeln!(out, "> **Note:** {hidden} additional unexpected rows not shown.")?;
            }
        }

        Ok(())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for MarkdownFormatter {
    fn format(&self, result: &ValidationResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(
        &self,
        result: &ValidationResult,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        self.render(&mut output, result, config)
            .map_err(render_error)?;
        Ok(output)
    }
}

/// Trims samples in a copy of the result according to the configuration.
fn filter_result_for_config(
    result: &ValidationResult,
    config: &FormatterConfig,
) -> ValidationResult {
    let mut filtered = result.clone();
    for outcome in &mut filtered.outcomes {
        let keep = if config.include_details {
            config.samples(outcome).len()
        } else {
            0
        };
        outcome.detail.partial_unexpected_list.truncate(keep);
    }
    filtered
}
