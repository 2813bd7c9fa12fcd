//! Expectations: declarative rules checked against a single column.
//!
//! The supported rules form the closed [`ExpectationKind`] enum. Adding a rule
//! means adding one variant, one arm to [`ExpectationKind::tag`], one arm to the
//! parameter parser and one arm to the evaluator.
//!
//! | kind          | parameters             | applies to        |
//! |---------------|------------------------|-------------------|
//! | `not-null`    |                        | every row         |
//! | `in-range`    | `min`, `max` (numbers) | non-null rows     |
//! | `in-set`      | `values` (array)       | non-null rows     |
//! | `match-regex` | `pattern` (string)     | non-null rows     |
//! | `unique`      |                        | non-null rows     |
//!
//! Every kind also accepts `mostly`, the minimum fraction of applicable rows
//! that must conform (default `1.0`).

use super::{ExpectationOutcome, OutcomeDetail, UnexpectedValue, Value};
use crate::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

const PARAM_MOSTLY: &str = "mostly";

/// A compiled regular expression compared by its source pattern.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles a pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| AssayError::invalid_config("match-regex", format!("invalid pattern: {e}")))
    }

    /// Returns the source pattern.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// The rule an expectation applies, with its kind-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectationKind {
    /// No value may be null.
    NotNull,
    /// Every non-null value must be numeric and within the inclusive bounds.
    InRange { min: Option<f64>, max: Option<f64> },
    /// Every non-null value must equal one of the listed values.
    InSet { values: Vec<Value> },
    /// Every non-null value must be text matching the pattern.
    MatchRegex { pattern: Pattern },
    /// No non-null value may appear more than once.
    Unique,
}

impl ExpectationKind {
    /// Returns the kind tag used in configs and reports.
    pub fn tag(&self) -> &'static str {
        match self {
            ExpectationKind::NotNull => "not-null",
            ExpectationKind::InRange { .. } => "in-range",
            ExpectationKind::InSet { .. } => "in-set",
            ExpectationKind::MatchRegex { .. } => "match-regex",
            ExpectationKind::Unique => "unique",
        }
    }

    /// Returns the kind-specific parameters as JSON.
    pub fn parameters(&self) -> Map<String, serde_json::Value> {
        let mut params = Map::new();
        match self {
            ExpectationKind::NotNull | ExpectationKind::Unique => {}
            ExpectationKind::InRange { min, max } => {
                if let Some(min) = min {
                    params.insert("min".to_string(), json!(min));
                }
                if let Some(max) = max {
                    params.insert("max".to_string(), json!(max));
                }
            }
            ExpectationKind::InSet { values } => {
                params.insert("values".to_string(), json!(values));
            }
            ExpectationKind::MatchRegex { pattern } => {
                params.insert("pattern".to_string(), json!(pattern.as_str()));
            }
        }
        params
    }

    /// Parses a kind tag and its parameters, rejecting unknown tags and malformed values.
    ///
    /// `mostly` is ignored here; it is common to every kind.
    pub fn from_parameters(tag: &str, params: &Map<String, serde_json::Value>) -> Result<Self> {
        let allowed = allowed_parameters(tag)
            .ok_or_else(|| AssayError::invalid_config(tag, "unrecognized expectation kind"))?;
        if let Some(key) = params
            .keys()
            .find(|k| k.as_str() != PARAM_MOSTLY && !allowed.contains(&k.as_str()))
        {
            return Err(AssayError::invalid_config(
                tag,
                format!("unexpected parameter '{key}'"),
            ));
        }

        match tag {
            "in-range" => {
                let min = numeric_param(tag, params, "min")?;
                let max = numeric_param(tag, params, "max")?;
                Self::in_range(min, max)
            }
            "in-set" => {
                let raw = params
                    .get("values")
                    .ok_or_else(|| AssayError::invalid_config(tag, "missing parameter 'values'"))?;
                let values: Vec<Value> = serde_json::from_value(raw.clone()).map_err(|_| {
                    AssayError::invalid_config(tag, "'values' must be an array of scalars")
                })?;
                Self::in_set(values)
            }
            "match-regex" => {
                let pattern = params
                    .get("pattern")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| {
                        AssayError::invalid_config(tag, "parameter 'pattern' must be a string")
                    })?;
                Ok(ExpectationKind::MatchRegex {
                    pattern: Pattern::new(pattern)?,
                })
            }
            "unique" => Ok(ExpectationKind::Unique),
            "not-null" => Ok(ExpectationKind::NotNull),
            other => Err(AssayError::invalid_config(
                other,
                "unrecognized expectation kind",
            )),
        }
    }

    fn in_range(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        let tag = "in-range";
        if min.is_none() && max.is_none() {
            return Err(AssayError::invalid_config(
                tag,
                "at least one of 'min' or 'max' is required",
            ));
        }
        // JSON cannot represent non-finite numbers
        if min.is_some_and(|v| !v.is_finite()) || max.is_some_and(|v| !v.is_finite()) {
            return Err(AssayError::invalid_config(
                tag,
                "bounds must be finite; omit a bound to leave that side open",
            ));
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(AssayError::invalid_config(
                    tag,
                    format!("min ({lo}) is greater than max ({hi})"),
                ));
            }
        }
        Ok(ExpectationKind::InRange { min, max })
    }

    fn in_set(values: Vec<Value>) -> Result<Self> {
        if values.is_empty() {
            return Err(AssayError::invalid_config(
                "in-set",
                "'values' must not be empty",
            ));
        }
        if values
            .iter()
            .any(|v| matches!(v, Value::Float(f) if !f.is_finite()))
        {
            return Err(AssayError::invalid_config(
                "in-set",
                "'values' must not contain NaN or infinite numbers",
            ));
        }
        Ok(ExpectationKind::InSet { values })
    }

    /// Returns true if the rule counts null values as violations.
    fn checks_nulls(&self) -> bool {
        matches!(self, ExpectationKind::NotNull)
    }

    /// Collects the indices of every row violating the rule, in row order.
    fn unexpected_rows(&self, values: &[Value]) -> Vec<usize> {
        let present = || values.iter().enumerate().filter(|(_, v)| !v.is_null());
        match self {
            ExpectationKind::NotNull => values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_null())
                .map(|(i, _)| i)
                .collect(),
            ExpectationKind::InRange { min, max } => present()
                .filter(|(_, v)| match v.as_f64() {
                    Some(n) => {
                        !(min.map_or(true, |lo| lo <= n) && max.map_or(true, |hi| n <= hi))
                    }
                    None => true,
                })
                .map(|(i, _)| i)
                .collect(),
            ExpectationKind::InSet { values: allowed } => present()
                .filter(|(_, v)| !allowed.iter().any(|a| a.loosely_eq(v)))
                .map(|(i, _)| i)
                .collect(),
            ExpectationKind::MatchRegex { pattern } => present()
                .filter(|(_, v)| !v.as_str().is_some_and(|s| pattern.is_match(s)))
                .map(|(i, _)| i)
                .collect(),
            ExpectationKind::Unique => {
                let mut counts: HashMap<String, usize> = HashMap::new();
                for (_, v) in present() {
                    *counts.entry(v.identity_key()).or_default() += 1;
                }
                present()
                    .filter(|(_, v)| counts.get(&v.identity_key()).is_some_and(|&c| c > 1))
                    .map(|(i, _)| i)
                    .collect()
            }
        }
    }
}

impl fmt::Display for ExpectationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectationKind::InRange { min, max } => {
                let lo = min.map_or("-inf".to_string(), |v| v.to_string());
                let hi = max.map_or("+inf".to_string(), |v| v.to_string());
                write!(f, "in-range [{lo}, {hi}]")
            }
            ExpectationKind::InSet { values } => write!(f, "in-set ({} values)", values.len()),
            ExpectationKind::MatchRegex { pattern } => write!(f, "match-regex /{}/", pattern.as_str()),
            other => f.write_str(other.tag()),
        }
    }
}

fn allowed_parameters(tag: &str) -> Option<&'static [&'static str]> {
    match tag {
        "not-null" | "unique" => Some(&[]),
        "in-range" => Some(&["min", "max"]),
        "in-set" => Some(&["values"]),
        "match-regex" => Some(&["pattern"]),
        _ => None,
    }
}

fn numeric_param(
    tag: &str,
    params: &Map<String, serde_json::Value>,
    key: &str,
) -> Result<Option<f64>> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| {
            AssayError::invalid_config(tag, format!("non-numeric bound '{key}': {v}"))
        }),
    }
}

/// The declarative form of an expectation: what suites persist and outcomes echo.
///
/// ```json
/// { "kind": "in-range", "column": "passenger_count", "parameters": { "min": 0, "max": 6 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationConfig {
    /// Kind tag, e.g. `not-null`
    pub kind: String,
    /// Column the rule applies to
    #[serde(default)]
    pub column: Option<String>,
    /// Kind-specific parameters
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, serde_json::Value>,
    /// Free-form notes carried through to reports
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl ExpectationConfig {
    /// Creates a config with no parameters.
    pub fn new(kind: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            column: Some(column.into()),
            parameters: Map::new(),
            meta: BTreeMap::new(),
        }
    }

    /// Adds a parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// A validated rule bound to one column.
///
/// Expectations are immutable: builder-style methods consume and return a new
/// value, and a suite only ever stores finished expectations.
///
/// # Examples
///
/// ```rust
/// use assay::core::{Expectation, Value};
///
/// let passengers = Expectation::in_range("passenger_count", Some(0.0), Some(6.0)).unwrap();
/// let outcome = passengers.evaluate(&[Value::Int(2), Value::Int(9), Value::Null], 20);
/// assert!(!outcome.success);
/// assert_eq!(outcome.detail.unexpected_count, 1);
///
/// assert!(Expectation::in_range("passenger_count", Some(6.0), Some(0.0)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExpectationConfig", into = "ExpectationConfig")]
pub struct Expectation {
    column: String,
    kind: ExpectationKind,
    mostly: f64,
    meta: BTreeMap<String, String>,
}

impl Expectation {
    /// Creates an expectation from an already validated kind.
    pub fn new(column: impl Into<String>, kind: ExpectationKind) -> Self {
        Self {
            column: column.into(),
            kind,
            mostly: 1.0,
            meta: BTreeMap::new(),
        }
    }

    /// Expects the column to contain no nulls.
    pub fn not_null(column: impl Into<String>) -> Self {
        Self::new(column, ExpectationKind::NotNull)
    }

    /// Expects every non-null value to lie within `[min, max]`.
    ///
    /// Either bound may be omitted, but not both.
    pub fn in_range(column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        Ok(Self::new(column, ExpectationKind::in_range(min, max)?))
    }

    /// Expects every non-null value to be one of `values`.
    pub fn in_set<I, V>(column: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Ok(Self::new(column, ExpectationKind::in_set(values)?))
    }

    /// Expects every non-null value to be text matching `pattern`.
    pub fn matches_regex(column: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self::new(
            column,
            ExpectationKind::MatchRegex {
                pattern: Pattern::new(pattern)?,
            },
        ))
    }

    /// Expects non-null values to be distinct.
    pub fn unique(column: impl Into<String>) -> Self {
        Self::new(column, ExpectationKind::Unique)
    }

    /// Builds an expectation from its declarative form.
    pub fn from_config(config: &ExpectationConfig) -> Result<Self> {
        let column = match config.column.as_deref() {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => {
                return Err(AssayError::invalid_config(
                    &config.kind,
                    "missing 'column'",
                ))
            }
        };
        let kind = ExpectationKind::from_parameters(&config.kind, &config.parameters)?;
        let mut expectation = Self::new(column, kind);
        expectation.meta = config.meta.clone();

        match config.parameters.get(PARAM_MOSTLY) {
            None | Some(serde_json::Value::Null) => Ok(expectation),
            Some(v) => {
                let mostly = v.as_f64().ok_or_else(|| {
                    AssayError::invalid_config(&config.kind, format!("non-numeric 'mostly': {v}"))
                })?;
                expectation.with_mostly(mostly)
            }
        }
    }

    /// Returns the declarative form of this expectation.
    pub fn to_config(&self) -> ExpectationConfig {
        let mut parameters = self.kind.parameters();
        if self.mostly < 1.0 {
            parameters.insert(PARAM_MOSTLY.to_string(), json!(self.mostly));
        }
        ExpectationConfig {
            kind: self.kind.tag().to_string(),
            column: Some(self.column.clone()),
            parameters,
            meta: self.meta.clone(),
        }
    }

    /// Sets the minimum fraction of applicable rows that must conform.
    pub fn with_mostly(mut self, mostly: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&mostly) {
            return Err(AssayError::invalid_config(
                self.kind.tag(),
                format!("'mostly' must be between 0 and 1, got {mostly}"),
            ));
        }
        self.mostly = mostly;
        Ok(self)
    }

    /// Attaches a note that is carried into outcomes.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Returns the column this expectation checks.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the rule.
    pub fn kind(&self) -> &ExpectationKind {
        &self.kind
    }

    /// Returns the minimum conforming fraction.
    pub fn mostly(&self) -> f64 {
        self.mostly
    }

    /// Evaluates the rule over a column's values.
    ///
    /// At most `sample_limit` violating rows are kept, always the first ones by
    /// row index, so repeated evaluations produce identical outcomes.
    pub fn evaluate(&self, values: &[Value], sample_limit: usize) -> ExpectationOutcome {
        let element_count = values.len();
        let missing_count = values.iter().filter(|v| v.is_null()).count();
        let applicable = if self.kind.checks_nulls() {
            element_count
        } else {
            element_count - missing_count
        };

        let unexpected = self.kind.unexpected_rows(values);
        let unexpected_count = unexpected.len();
        let unexpected_fraction = if applicable == 0 {
            0.0
        } else {
            unexpected_count as f64 / applicable as f64
        };
        let success = if applicable == 0 {
            true
        } else {
            (applicable - unexpected_count) as f64 / applicable as f64 >= self.mostly
        };

        let partial_unexpected_list = unexpected
            .into_iter()
            .take(sample_limit)
            .map(|index| UnexpectedValue {
                index,
                value: values[index].clone(),
            })
            .collect();

        ExpectationOutcome {
            expectation: self.to_config(),
            success,
            detail: OutcomeDetail {
                element_count,
                missing_count,
                unexpected_count,
                unexpected_fraction,
                partial_unexpected_list,
            },
        }
    }
}

impl TryFrom<ExpectationConfig> for Expectation {
    type Error = AssayError;

    fn try_from(config: ExpectationConfig) -> Result<Self> {
        Expectation::from_config(&config)
    }
}

impl From<Expectation> for ExpectationConfig {
    fn from(expectation: Expectation) -> Self {
        expectation.to_config()
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on '{}'", self.kind, self.column)?;
        if self.mostly < 1.0 {
            write!(f, " (mostly {})", self.mostly)?;
        }
        Ok(())
    }
}
