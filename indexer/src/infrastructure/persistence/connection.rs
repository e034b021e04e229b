use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::config::AppConfig;
use crate::infrastructure::persistence::error::DbError;
use crate::utils::logging;

/// Manages database connection pool
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    /// Creates a new database connection pool
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        logging::log_database_connection_details(&config.database.url);

        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(10)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        match Database::connect(options).await {
            Ok(connection) => {
                logging::log_info("Database connection established successfully");
                Ok(DbPool { connection })
            }
            Err(e) => {
                logging::log_error(&format!("Failed to connect to database: {}", e));
                Err(DbError::ConnectionError(format!(
                    "Failed to connect to database: {}",
                    e
                )))
            }
        }
    }

    /// Returns the database connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
