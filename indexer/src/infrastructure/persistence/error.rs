use thiserror::Error;

/// Error type for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SeaORM
    #[error("Database error: {0}")]
    SeaOrmError(#[from] sea_orm::DbErr),
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// Query error
    #[error("Query error: {0}")]
    QueryError(String),
    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl DbError {
    /// The database could not be reached at all
    ///
    /// A batch write stops on these instead of moving on to the next chunk.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            DbError::ConnectionError(_) => true,
            DbError::SeaOrmError(err) => {
                matches!(err, sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_))
            }
            _ => false,
        }
    }

    /// Worth retrying the same statement (lost connection, deadlock, serialization conflict)
    pub fn is_transient(&self) -> bool {
        self.is_connection_failure() || matches!(self, DbError::SeaOrmError(sea_orm::DbErr::Exec(_)))
    }
}
