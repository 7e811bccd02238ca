//! Database configuration module for `SafiWash`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables and indexes are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models
//! (including the unique phone constraint and the visit foreign keys).

use crate::entities::{Customer, Service, Visit};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Default database location used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/safiwash.sqlite?mode=rwc";

/// Returns the file path of a `SQLite` URL, or `None` for in-memory databases
/// and other backends.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path))
}

/// Creates the directory a `SQLite` database file lives in, if it is missing.
pub fn ensure_database_dir(database_url: &str) -> Result<()> {
    let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent) else {
        return Ok(());
    };
    if !parent.as_os_str().is_empty() && !parent.exists() {
        info!("Creating database directory {}", parent.display());
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {database_url}");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes that do not exist yet.
///
/// Customers and services are created before visits so the foreign keys
/// resolve. Safe to call on every start-up.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table_for(db, &schema, Customer).await?;
    create_table_for(db, &schema, Service).await?;
    create_table_for(db, &schema, Visit).await?;

    for mut index in schema.create_index_from_entity(Visit) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }

    info!("Database tables ensured (customers, services, visits).");
    Ok(())
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(db.get_database_backend().build(&table)).await?;
    Ok(())
}
