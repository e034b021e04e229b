use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};
use std::error::Error;
use tracing::{error, info};

use crate::config::DatabaseConfig;

/// Execute the create command
pub async fn execute(name: Option<String>) -> Result<(), Box<dyn Error>> {
    let config = DatabaseConfig::from_env()?;

    // Use provided name or default from config
    let db_name = name.unwrap_or(config.name);
    if !is_valid_identifier(&db_name) {
        return Err(format!("invalid database name '{}'", db_name).into());
    }

    info!("Creating database: {}", db_name);

    // CREATE DATABASE has to run from another database
    let maintenance_url = format!(
        "postgres://{}:{}@{}:{}/postgres",
        config.user, config.password, config.host, config.port
    );
    let connection = Database::connect(&maintenance_url).await.map_err(|e| {
        error!("Failed to connect to maintenance database: {}", e);
        e
    })?;

    let existing = connection
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT 1 FROM pg_database WHERE datname = $1",
            [sea_orm::Value::from(db_name.clone())],
        ))
        .await?;

    if existing.is_some() {
        info!("Database '{}' already exists", db_name);
        return Ok(());
    }

    connection
        .execute_unprepared(&format!("CREATE DATABASE \"{}\"", db_name))
        .await
        .map_err(|e| {
            error!("Failed to create database: {}", e);
            e
        })?;

    info!("Database '{}' created successfully", db_name);
    Ok(())
}

/// Database names are interpolated into DDL, so only plain identifiers are accepted
fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
