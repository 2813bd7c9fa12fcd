//! CSV file source implementation.

use super::{expand_globs, file_extension, DataSource};
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::{CsvReadOptions, SessionContext};
use tracing::{info, instrument};

/// Options for reading CSV files.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first line holds column names
    pub has_header: bool,
    /// Field delimiter
    pub delimiter: u8,
    /// Quote character
    pub quote: u8,
    /// Number of records read to infer the schema
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 1000,
        }
    }
}

/// A CSV data source backed by one or more files.
///
/// # Examples
///
/// ```rust,no_run
/// use assay::sources::{CsvOptions, CsvSource};
///
/// # fn example() -> assay::prelude::Result<()> {
/// let source = CsvSource::new("data/yellow_tripdata_2019-01.csv")?;
///
/// let tsv = CsvSource::with_options(
///     "data/trips.tsv",
///     CsvOptions { delimiter: b'\t', ..Default::default() },
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    paths: Vec<String>,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a CSV source for a single file with default options.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a CSV source for a single file with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Result<Self> {
        Ok(Self {
            paths: vec![path.into()],
            options,
        })
    }

    /// Creates a CSV source from multiple files sharing one schema.
    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        if paths.is_empty() {
            return Err(AssayError::Configuration(
                "At least one path must be provided".to_string(),
            ));
        }
        Ok(Self {
            paths,
            options: CsvOptions::default(),
        })
    }

    /// Creates a CSV source from a glob pattern.
    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        let paths = expand_globs(&[pattern.into()])?;
        Self::from_paths(paths)
    }

    /// Replaces the read options.
    pub fn with_custom_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the files this source reads.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "csv",
        source.files = self.paths.len(),
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(
            table.name = %table_name,
            source.paths = ?self.paths,
            "Registering CSV data source"
        );

        for path in &self.paths {
            if !std::path::Path::new(path).is_file() {
                return Err(AssayError::data_source(
                    "csv",
                    format!("File not found: {path}"),
                ));
            }
        }

        let extension = file_extension(&self.paths);
        let options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);

        let df = ctx.read_csv(self.paths.clone(), options).await.map_err(|e| {
            AssayError::data_source_with_source("csv", "Failed to read CSV files", Box::new(e))
        })?;
        ctx.register_table(table_name, df.into_view())?;
        Ok(())
    }

    fn description(&self) -> String {
        match self.paths.as_slice() {
            [path] => format!("CSV file: {path}"),
            paths => format!("CSV files: {} files", paths.len()),
        }
    }
}
