//! SQL query source over a caller-provided session.

use super::DataSource;
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::{info, instrument};

/// A source defined by a SQL query against tables registered in a session.
///
/// This is how database-backed assets are validated: the caller registers
/// whatever table providers it has in a [`SessionContext`] and the query
/// selects the rows to check.
///
/// ```rust
/// use assay::core::ColumnAccessor;
/// use assay::sources::{DataSource, QuerySource};
/// use datafusion::prelude::SessionContext;
///
/// # #[tokio::main]
/// # async fn main() -> assay::prelude::Result<()> {
/// let source = QuerySource::new(SessionContext::new(), "SELECT 1 AS vendor_id");
/// let batch = source.load().await?;
/// assert_eq!(batch.num_rows(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QuerySource {
    ctx: SessionContext,
    sql: String,
}

impl QuerySource {
    /// Creates a source that runs `sql` in `ctx`.
    pub fn new(ctx: SessionContext, sql: impl Into<String>) -> Self {
        Self {
            ctx,
            sql: sql.into(),
        }
    }

    /// Returns the query text.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl std::fmt::Debug for QuerySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySource")
            .field("session_id", &self.ctx.session_id())
            .field("sql", &self.sql)
            .finish()
    }
}

#[async_trait]
impl DataSource for QuerySource {
    #[instrument(skip(self, ctx), fields(table.name = %table_name, source.type = "query"))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(sql = %self.sql, "Registering query data source");
        let df = self.ctx.sql(&self.sql).await.map_err(|e| {
            AssayError::data_source_with_source("query", "Failed to plan query", Box::new(e))
        })?;
        ctx.register_table(table_name, df.into_view())?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("SQL query: {}", self.sql)
    }
}
