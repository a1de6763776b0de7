use std::env;
use std::time::Duration;

use benefits360_api::config::is_valid_table_name;
use benefits360_api::integrations::postgres::PgTabularBackend;
use benefits360_api::models::ProfileSource;
use benefits360_api::reconciler::SchemaReconciler;
use sqlx::postgres::PgPoolOptions;

/// Integration smoke test for the two-tier lookup against Postgres.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn two_tier_lookup_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL to run this test"))?;

    // Temp tables are per-connection, so keep the pool to a single connection.
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    sqlx::query(
        "CREATE TEMP TABLE person_profile (person_id text, name text, dob date, first_nm text, \
         last_nm text, med_id text, snap_no bigint, asst_id text)",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "CREATE TEMP TABLE matched_people (person_id text, full_name text, first_name text, \
         last_name text, birthdate date, medical_id text, snap_id text, assistance_id text)",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO person_profile (person_id, name, med_id, snap_no) \
         VALUES ('P1', 'Ann Lee', 'M1', 5512)",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO matched_people (person_id, full_name, birthdate, medical_id) \
         VALUES ('X1', 'Jane Doe', '1980-01-01', 'M9')",
    )
    .execute(&pool)
    .await?;

    let primary = "pg_temp.person_profile";
    let secondary = "pg_temp.matched_people";
    assert!(is_valid_table_name(primary) && is_valid_table_name(secondary));

    let backend = PgTabularBackend::new(pool.clone(), Duration::from_secs(10));
    let reconciler = SchemaReconciler::new(backend, primary, secondary);

    let from_primary = reconciler.lookup("P1").await?;
    assert_eq!(from_primary.source, ProfileSource::Primary);
    assert_eq!(from_primary.profile.medical_id.as_deref(), Some("M1"));
    assert_eq!(from_primary.profile.snap_id.as_deref(), Some("5512"));

    let from_secondary = reconciler.lookup("X1").await?;
    assert_eq!(from_secondary.source, ProfileSource::Secondary);
    assert_eq!(from_secondary.profile.medical_id.as_deref(), Some("M9"));
    assert_eq!(from_secondary.profile.birthdate.as_deref(), Some("1980-01-01"));

    let missing = reconciler.lookup("ZZZ").await.unwrap_err();
    assert!(missing.is_not_found());

    Ok(())
}
