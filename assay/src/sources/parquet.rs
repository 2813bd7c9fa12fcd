//! Parquet file source implementation.

use super::{expand_globs, file_extension, DataSource};
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::{ParquetReadOptions, SessionContext};
use tracing::{info, instrument};

/// A Parquet data source backed by one or more files.
#[derive(Debug, Clone)]
pub struct ParquetSource {
    paths: Vec<String>,
}

impl ParquetSource {
    /// Creates a Parquet source for a single file.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Ok(Self {
            paths: vec![path.into()],
        })
    }

    /// Creates a Parquet source from multiple files sharing one schema.
    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        if paths.is_empty() {
            return Err(AssayError::Configuration(
                "At least one path must be provided".to_string(),
            ));
        }
        Ok(Self { paths })
    }

    /// Creates a Parquet source from a glob pattern.
    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        let paths = expand_globs(&[pattern.into()])?;
        Self::from_paths(paths)
    }

    /// Returns the files this source reads.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

#[async_trait]
impl DataSource for ParquetSource {
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "parquet",
        source.files = self.paths.len()
    ))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(
            table.name = %table_name,
            source.paths = ?self.paths,
            "Registering Parquet data source"
        );

        for path in &self.paths {
            if !std::path::Path::new(path).is_file() {
                return Err(AssayError::data_source(
                    "parquet",
                    format!("File not found: {path}"),
                ));
            }
        }

        let extension = file_extension(&self.paths);
        let options = ParquetReadOptions::default().file_extension(&extension);
        let df = ctx
            .read_parquet(self.paths.clone(), options)
            .await
            .map_err(|e| {
                AssayError::data_source_with_source(
                    "parquet",
                    "Failed to read Parquet files",
                    Box::new(e),
                )
            })?;
        ctx.register_table(table_name, df.into_view())?;
        Ok(())
    }

    fn description(&self) -> String {
        match self.paths.as_slice() {
            [path] => format!("Parquet file: {path}"),
            paths => format!("Parquet files: {} files", paths.len()),
        }
    }
}
