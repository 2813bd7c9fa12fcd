//! Data source connectors that produce [`Batch`]es for validation.
//!
//! Every source registers itself as a table in a DataFusion [`SessionContext`];
//! [`DataSource::load`] then materializes that table into a [`Batch`]. File
//! sources accept glob patterns.

use crate::core::Batch;
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::fmt::Debug;
use tracing::debug;

mod csv;
mod memory;
mod parquet;
mod query;

pub use csv::{CsvOptions, CsvSource};
pub use memory::MemorySource;
pub use parquet::ParquetSource;
pub use query::QuerySource;

/// Table name used when a source is loaded on its own.
pub const SOURCE_TABLE: &str = "data";

/// A source of tabular data.
///
/// # Examples
///
/// ```rust,no_run
/// use assay::sources::{CsvSource, DataSource};
///
/// # async fn example() -> assay::prelude::Result<()> {
/// let source = CsvSource::new("data/yellow_tripdata_2019-01.csv")?;
/// let batch = source.load().await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Registers this source as `table_name` in the given context.
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()>;

    /// Loads the full contents of the source into a batch.
    async fn load(&self) -> Result<Batch> {
        let ctx = SessionContext::new();
        self.register(&ctx, SOURCE_TABLE).await?;
        let df = ctx.table(SOURCE_TABLE).await?;
        let schema = df.schema().inner().clone();
        let batches = df.collect().await?;
        let batch = Batch::try_from_arrow(&schema, &batches)?;
        debug!(
            source = %self.description(),
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "Loaded data source"
        );
        Ok(batch)
    }

    /// Returns a human-readable description of the source.
    fn description(&self) -> String;
}

/// Expands glob patterns into a list of files.
pub(crate) fn expand_globs(patterns: &[String]) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|e| {
            AssayError::Configuration(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        for entry in matches {
            let path = entry.map_err(|e| AssayError::Io(std::io::Error::other(e)))?;
            if path.is_file() {
                if let Some(path_str) = path.to_str() {
                    paths.push(path_str.to_string());
                }
            }
        }
    }

    if paths.is_empty() {
        return Err(AssayError::data_source(
            "file",
            "No files found matching glob patterns",
        ));
    }

    paths.sort();
    Ok(paths)
}

/// Returns the dotted extension of the first path, e.g. `.tsv`.
pub(crate) fn file_extension(paths: &[String]) -> String {
    paths
        .first()
        .and_then(|p| std::path::Path::new(p).extension())
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}
