//! Utility to compare the live profile tables against the native column
//! layouts the lookup expects.

use benefits360_api::config::{Config, DEFAULT_PRIMARY_TABLE, DEFAULT_SECONDARY_TABLE};
use benefits360_api::db::Database;
use benefits360_api::schema::{SourceSchema, PRIMARY_SCHEMA, SECONDARY_SCHEMA};
use sqlx::PgPool;

/// Splits `catalog.schema.table` / `schema.table` / `table` into (schema, table).
fn split_table(name: &str) -> (Option<&str>, &str) {
    let mut parts: Vec<&str> = name.rsplitn(3, '.').collect();
    parts.reverse();
    match parts.as_slice() {
        [.., schema, table] => (Some(*schema), *table),
        [table] => (None, *table),
        _ => (None, name),
    }
}

async fn inspect(pool: &PgPool, table_name: &str, schema: &SourceSchema) -> anyhow::Result<()> {
    let (table_schema, table) = split_table(table_name);

    let columns: Vec<(String, String)> = sqlx::query_as(
        "SELECT column_name, data_type FROM information_schema.columns \
         WHERE table_name = $1 AND ($2::text IS NULL OR table_schema = $2) \
         ORDER BY ordinal_position",
    )
    .bind(table)
    .bind(table_schema)
    .fetch_all(pool)
    .await?;

    println!("{} source: {}", schema.name, table_name);
    if columns.is_empty() {
        println!("  (table not found)");
        println!();
        return Ok(());
    }

    for (col, type_) in &columns {
        println!("  - {}: {}", col, type_);
    }

    let missing: Vec<&str> = schema
        .columns
        .iter()
        .map(|(native, _)| *native)
        .filter(|native| !columns.iter().any(|(col, _)| col.as_str() == *native))
        .collect();
    if missing.is_empty() {
        println!("  ok: all {} expected columns present", schema.columns.len());
    } else {
        println!("  ✗ missing expected columns: {}", missing.join(", "));
    }
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;

    if config.primary_profile_table != DEFAULT_PRIMARY_TABLE
        || config.secondary_profile_table != DEFAULT_SECONDARY_TABLE
    {
        println!("Using configured profile tables (non-default)\n");
    }

    inspect(&db.pool, &config.primary_profile_table, &PRIMARY_SCHEMA).await?;
    inspect(&db.pool, &config.secondary_profile_table, &SECONDARY_SCHEMA).await?;

    Ok(())
}
