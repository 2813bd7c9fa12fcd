//! In-memory Arrow source.

use super::DataSource;
use crate::prelude::*;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use std::sync::Arc;
use tracing::debug;

/// A source over Arrow record batches already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MemorySource {
    /// Creates a source from a schema and batches that match it.
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        if let Some(bad) = batches.iter().find(|b| b.schema() != schema) {
            return Err(AssayError::InvalidBatch(format!(
                "record batch schema {:?} does not match source schema {:?}",
                bad.schema(),
                schema
            )));
        }
        Ok(Self { schema, batches })
    }

    /// Creates a source from non-empty batches, taking the schema from the first.
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let schema = batches
            .first()
            .map(RecordBatch::schema)
            .ok_or_else(|| {
                AssayError::Configuration(
                    "At least one record batch must be provided".to_string(),
                )
            })?;
        Self::try_new(schema, batches)
    }

    /// Returns the total number of rows across batches.
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        debug!(
            table.name = %table_name,
            source.type = "memory",
            source.batches = self.batches.len(),
            "Registering in-memory data source"
        );
        let table = MemTable::try_new(self.schema.clone(), vec![self.batches.clone()])?;
        ctx.register_table(table_name, Arc::new(table))?;
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "In-memory data: {} batches, {} rows",
            self.batches.len(),
            self.num_rows()
        )
    }
}
