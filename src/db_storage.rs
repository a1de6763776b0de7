use crate::errors::AppError;
use crate::reconciler::TabularBackend;
use crate::result_item::ResultItem;
use crate::schema::Statement;
use serde_json::Value;
use sqlx::PgPool;
use std::time::Duration;

/// Postgres-backed tabular source for profile lookups.
///
/// Statements are expected to select a single JSON column per row (see
/// `SourceSchema::select_statement`); each value is classified into a
/// [`ResultItem`] so the decoder can handle arrays, objects or pairs alike.
#[derive(Clone)]
pub struct PgTabularBackend {
    pool: PgPool,
    timeout: Duration,
}

impl PgTabularBackend {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

impl TabularBackend for PgTabularBackend {
    async fn query(&self, statement: &Statement) -> Result<Vec<ResultItem>, AppError> {
        let mut query = sqlx::query_scalar::<_, Value>(&statement.sql);
        for param in &statement.params {
            query = query.bind(param);
        }

        let rows = tokio::time::timeout(self.timeout, query.fetch_all(&self.pool))
            .await
            .map_err(|_| {
                tracing::error!("Query timed out after {:?}: {}", self.timeout, statement.sql);
                AppError::BackendError(format!("query timed out after {:?}", self.timeout))
            })??;

        Ok(rows.into_iter().map(ResultItem::from_value).collect())
    }
}
