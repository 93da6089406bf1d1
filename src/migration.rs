//! Database bootstrap: create the database and the objects table when missing.

use crate::sql::{quoted, OBJECTS_TABLE};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("invalid DATABASE_URL: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), MigrationError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| MigrationError::InvalidUrl(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Admin URL (same server and query string, `postgres` database) and database name.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), MigrationError> {
    let mut admin = Url::parse(url).map_err(|e| MigrationError::InvalidUrl(e.to_string()))?;
    if admin.cannot_be_a_base() {
        return Err(MigrationError::InvalidUrl("no path".into()));
    }
    let db_name = admin.path().trim_matches('/').trim().to_string();
    admin.set_path("/postgres");
    Ok((admin.into(), db_name))
}

/// Create the objects table. Ids and timestamps default on the server.
pub async fn ensure_objects_table(pool: &PgPool) -> Result<(), MigrationError> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            data TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        quoted(OBJECTS_TABLE)
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}
