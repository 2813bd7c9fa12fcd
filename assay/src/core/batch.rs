//! Immutable tabular batches and the column accessor used by the runner.

use super::Value;
use crate::prelude::*;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use std::collections::HashMap;

/// Read access to the columns of a tabular dataset.
///
/// The validation runner only talks to data through this trait, so any
/// column-oriented container can be validated once it can hand out value slices.
pub trait ColumnAccessor {
    /// Returns the declared column names in order.
    fn column_names(&self) -> Vec<&str>;

    /// Returns the number of rows shared by every column.
    fn num_rows(&self) -> usize;

    /// Returns the values of the named column.
    ///
    /// Fails with [`AssayError::UnknownColumn`] when the column is not declared.
    fn get_column(&self, name: &str) -> Result<&[Value]>;

    /// Returns true if the column is declared.
    fn has_column(&self, name: &str) -> bool {
        self.column_names().contains(&name)
    }
}

/// An immutable snapshot of tabular data submitted for validation.
///
/// Every column holds exactly [`Batch::num_rows`] values and rows are aligned by
/// position. A batch exposes no mutating methods once built.
///
/// # Examples
///
/// ```rust
/// use assay::core::{Batch, ColumnAccessor, Value};
///
/// let batch = Batch::builder()
///     .column("vendor_id", vec![Value::Int(1), Value::Int(2)])
///     .column("store_and_fwd_flag", vec![Value::from("N"), Value::Null])
///     .build()
///     .unwrap();
///
/// assert_eq!(batch.num_rows(), 2);
/// assert_eq!(batch.get_column("vendor_id").unwrap()[1], Value::Int(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
    index: HashMap<String, usize>,
    num_rows: usize,
}

impl Batch {
    /// Creates a builder for assembling a batch column by column.
    pub fn builder() -> BatchBuilder {
        BatchBuilder::default()
    }

    /// Creates an empty batch with no columns.
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            index: HashMap::new(),
            num_rows: 0,
        }
    }

    /// Builds a batch from row-oriented data.
    ///
    /// Every row must have one value per column name.
    pub fn from_rows<S: Into<String>>(names: Vec<S>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); names.len()];

        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(AssayError::InvalidBatch(format!(
                    "row {row_index} has {} values, expected {}",
                    row.len(),
                    names.len()
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        names
            .into_iter()
            .zip(columns)
            .fold(Batch::builder(), |builder, (name, values)| {
                builder.column(name, values)
            })
            .build()
    }

    /// Converts Arrow record batches into a single batch.
    ///
    /// Integer columns become [`Value::Int`], floating point and decimal columns
    /// become [`Value::Float`], string columns become [`Value::Text`] and booleans
    /// become [`Value::Bool`]. Any other type (dates, timestamps, ...) is rendered
    /// to text with Arrow's display formatting.
    pub fn try_from_record_batches(batches: &[RecordBatch]) -> Result<Self> {
        match batches.first() {
            Some(first) => Self::try_from_arrow(&first.schema(), batches),
            None => Ok(Self::empty()),
        }
    }

    /// Converts Arrow record batches sharing `schema` into a single batch.
    ///
    /// Unlike [`Batch::try_from_record_batches`], the columns are declared even
    /// when `batches` is empty.
    pub fn try_from_arrow(schema: &Schema, batches: &[RecordBatch]) -> Result<Self> {
        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); schema.fields().len()];
        for batch in batches {
            if batch.num_columns() != columns.len() {
                return Err(AssayError::InvalidBatch(format!(
                    "record batch has {} columns, expected {}",
                    batch.num_columns(),
                    columns.len()
                )));
            }
            for (values, array) in columns.iter_mut().zip(batch.columns()) {
                values.extend(array_to_values(array)?);
            }
        }

        schema
            .fields()
            .iter()
            .zip(columns)
            .fold(Batch::builder(), |builder, (field, values)| {
                builder.column(field.name().clone(), values)
            })
            .build()
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.names.len()
    }

    /// Iterates over `(name, values)` pairs in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }
}

impl ColumnAccessor for Batch {
    fn column_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn get_column(&self, name: &str) -> Result<&[Value]> {
        self.index
            .get(name)
            .map(|&i| self.columns[i].as_slice())
            .ok_or_else(|| AssayError::unknown_column(name))
    }

    fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

/// Builder for [`Batch`].
#[derive(Debug, Default)]
pub struct BatchBuilder {
    columns: Vec<(String, Vec<Value>)>,
}

impl BatchBuilder {
    /// Appends a column.
    pub fn column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.columns
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Builds the batch, checking that column names are unique and lengths agree.
    pub fn build(self) -> Result<Batch> {
        let num_rows = self.columns.first().map_or(0, |(_, v)| v.len());
        let mut names = Vec::with_capacity(self.columns.len());
        let mut columns = Vec::with_capacity(self.columns.len());
        let mut index = HashMap::with_capacity(self.columns.len());

        for (name, values) in self.columns {
            if values.len() != num_rows {
                return Err(AssayError::InvalidBatch(format!(
                    "column '{name}' has {} rows, expected {num_rows}",
                    values.len()
                )));
            }
            if index.insert(name.clone(), names.len()).is_some() {
                return Err(AssayError::InvalidBatch(format!(
                    "duplicate column '{name}'"
                )));
            }
            names.push(name);
            columns.push(values);
        }

        Ok(Batch {
            names,
            columns,
            index,
            num_rows,
        })
    }
}

fn array_to_values(array: &ArrayRef) -> Result<Vec<Value>> {
    let values = match array.data_type() {
        DataType::Null => vec![Value::Null; array.len()],
        DataType::Boolean => array.as_boolean().iter().map(Value::from).collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let cast = cast(array.as_ref(), &DataType::Int64)?;
            cast.as_primitive::<Int64Type>()
                .iter()
                .map(Value::from)
                .collect()
        }
        // u64 may not fit an i64
        DataType::UInt64
        | DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => {
            let cast = cast(array.as_ref(), &DataType::Float64)?;
            cast.as_primitive::<Float64Type>()
                .iter()
                .map(Value::from)
                .collect()
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let cast = cast(array.as_ref(), &DataType::Utf8)?;
            cast.as_string::<i32>().iter().map(Value::from).collect()
        }
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
            (0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        Value::Null
                    } else {
                        Value::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, Date32Array, Float32Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    #[test]
    fn test_get_column_unknown() {
        let batch = Batch::builder()
            .column("a", vec![Value::Int(1)])
            .build()
            .unwrap();
        let err = batch.get_column("nonexistent").unwrap_err();
        assert!(matches!(
            err,
            AssayError::UnknownColumn { ref column, expectation: None } if column == "nonexistent"
        ));
        assert!(!batch.has_column("nonexistent"));
    }

    #[test]
    fn test_builder_rejects_ragged_columns() {
        let err = Batch::builder()
            .column("a", vec![1i64, 2])
            .column("b", vec![1i64])
            .build()
            .unwrap_err();
        assert!(matches!(err, AssayError::InvalidBatch(_)));
    }

    #[test]
    fn test_builder_rejects_duplicate_columns() {
        let err = Batch::builder()
            .column("a", vec![1i64])
            .column("a", vec![2i64])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate column 'a'"));
    }

    #[test]
    fn test_from_rows() {
        let batch = Batch::from_rows(
            vec!["id", "flag"],
            vec![
                vec![Value::Int(1), Value::from("Y")],
                vec![Value::Int(2), Value::Null],
            ],
        )
        .unwrap();
        assert_eq!(batch.column_names(), vec!["id", "flag"]);
        assert_eq!(batch.get_column("flag").unwrap(), &[Value::from("Y"), Value::Null]);

        let err = Batch::from_rows(vec!["id"], vec![vec![Value::Int(1), Value::Int(2)]]);
        assert!(err.is_err());
    }

    #[test]
    fn test_from_record_batches() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("passenger_count", DataType::Int32, true),
            Field::new("tip_amount", DataType::Float32, true),
            Field::new("store_and_fwd_flag", DataType::Utf8, true),
            Field::new("paid", DataType::Boolean, true),
            Field::new("pickup_date", DataType::Date32, true),
        ]));
        let record_batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![Some(1), None])),
                Arc::new(Float32Array::from(vec![Some(1.5), Some(0.0)])),
                Arc::new(StringArray::from(vec![Some("N"), None])),
                Arc::new(BooleanArray::from(vec![Some(true), Some(false)])),
                Arc::new(Date32Array::from(vec![Some(0), None])),
            ],
        )
        .unwrap();

        let batch =
            Batch::try_from_record_batches(&[record_batch.clone(), record_batch]).unwrap();
        assert_eq!(batch.num_rows(), 4);
        assert_eq!(
            batch.get_column("passenger_count").unwrap(),
            &[Value::Int(1), Value::Null, Value::Int(1), Value::Null]
        );
        assert_eq!(batch.get_column("tip_amount").unwrap()[0], Value::Float(1.5));
        assert_eq!(batch.get_column("store_and_fwd_flag").unwrap()[1], Value::Null);
        assert_eq!(batch.get_column("paid").unwrap()[1], Value::Bool(false));
        assert_eq!(
            batch.get_column("pickup_date").unwrap()[0],
            Value::from("1970-01-01")
        );
    }

    #[test]
    fn test_empty_record_batches() {
        let batch = Batch::try_from_record_batches(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 0);
    }

    #[test]
    fn test_schema_without_batches_declares_columns() {
        let schema = Schema::new(vec![Field::new("vendor_id", DataType::Int32, true)]);
        let batch = Batch::try_from_arrow(&schema, &[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert!(batch.has_column("vendor_id"));
        assert!(batch.get_column("vendor_id").unwrap().is_empty());
    }
}
