//! Two-tier person profile lookup.
//!
//! The curated primary table is tried first. Only an empty answer (not a
//! failed query) moves the lookup on to the legacy secondary table. Whichever
//! table answers, its row is decoded against that table's native column order
//! and renamed into the canonical profile.
use crate::decoder::RowShapeDecoder;
use crate::errors::{AppError, ResultExt};
use crate::models::{ProfileResponse, ProfileSource};
use crate::result_item::ResultItem;
use crate::schema::{SourceSchema, Statement, PRIMARY_SCHEMA, SECONDARY_SCHEMA};
use std::future::Future;

/// Executes parameterized statements against the tabular store.
///
/// Implementations return `Ok(vec![])` when no row matches and reserve `Err`
/// for queries that could not be executed.
pub trait TabularBackend: Send + Sync {
    fn query(
        &self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Vec<ResultItem>, AppError>> + Send;
}

/// A backing table and the schema its rows follow.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub table: String,
    pub schema: &'static SourceSchema,
}

impl SourceTable {
    pub fn new(table: impl Into<String>, schema: &'static SourceSchema) -> Self {
        Self {
            table: table.into(),
            schema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupState {
    TryPrimary,
    TrySecondary,
    NotFound,
}

pub struct SchemaReconciler<B> {
    backend: B,
    primary: SourceTable,
    secondary: SourceTable,
    decoder: RowShapeDecoder,
}

impl<B: TabularBackend> SchemaReconciler<B> {
    pub fn new(backend: B, primary_table: &str, secondary_table: &str) -> Self {
        Self::with_sources(
            backend,
            SourceTable::new(primary_table, &PRIMARY_SCHEMA),
            SourceTable::new(secondary_table, &SECONDARY_SCHEMA),
        )
    }

    pub fn with_sources(backend: B, primary: SourceTable, secondary: SourceTable) -> Self {
        Self {
            backend,
            primary,
            secondary,
            decoder: RowShapeDecoder::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Looks a person up by key.
    ///
    /// # Errors
    ///
    /// * `NotFound` when neither table has a row for `key`.
    /// * `BadRequest` for a blank key.
    /// * Whatever the backend reports when a query fails; the secondary table
    ///   is never consulted after a primary failure.
    pub async fn lookup(&self, key: &str) -> Result<ProfileResponse, AppError> {
        // The key is opaque and bound exactly as given.
        if key.trim().is_empty() {
            return Err(AppError::BadRequest("Lookup key cannot be empty".to_string()));
        }

        let mut state = LookupState::TryPrimary;
        loop {
            state = match state {
                LookupState::TryPrimary => {
                    match self.fetch_first(&self.primary, key).await? {
                        Some(item) => {
                            return Ok(self.translate(&self.primary, &item, ProfileSource::Primary))
                        }
                        None => LookupState::TrySecondary,
                    }
                }
                LookupState::TrySecondary => {
                    match self.fetch_first(&self.secondary, key).await? {
                        Some(item) => {
                            return Ok(self.translate(
                                &self.secondary,
                                &item,
                                ProfileSource::Secondary,
                            ))
                        }
                        None => LookupState::NotFound,
                    }
                }
                LookupState::NotFound => {
                    tracing::info!("No profile found for key {} in either source", key);
                    return Err(AppError::NotFound(format!(
                        "No person found with id {}",
                        key
                    )));
                }
            };
        }
    }

    async fn fetch_first(
        &self,
        source: &SourceTable,
        key: &str,
    ) -> Result<Option<ResultItem>, AppError> {
        let statement = source.schema.select_statement(&source.table, key);
        tracing::debug!("Querying {} source {}: {}", source.schema.name, source.table, statement.sql);

        let rows = self
            .backend
            .query(&statement)
            .await
            .with_context(|| format!("{} source query on {}", source.schema.name, source.table))?;

        tracing::info!(
            "{} source {} returned {} row(s) for key {}",
            source.schema.name,
            source.table,
            rows.len(),
            key
        );
        Ok(rows.into_iter().next())
    }

    fn translate(
        &self,
        source: &SourceTable,
        item: &ResultItem,
        origin: ProfileSource,
    ) -> ProfileResponse {
        let columns = source.schema.native_columns();
        let record = self.decoder.decode(item, &columns);
        if record.is_empty() {
            tracing::warn!(
                "{} source row for {} could not be decoded ({})",
                source.schema.name,
                source.table,
                item.kind()
            );
        }

        ProfileResponse {
            source: origin,
            profile: source.schema.to_profile(&record),
        }
    }
}
