use thiserror::Error;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::rusqlite;

/// Unified error type for the appender.
///
/// Driver errors pass through transparently; everything the appender
/// detects itself (bad configuration, unsupported command shapes) gets
/// its own variant. The first error aborts the remainder of a batch; there
/// is no retry and no partial-success reporting.
#[derive(Debug, Error)]
pub enum SqlAppenderError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    PoolErrorSqlite(#[from] deadpool_sqlite::PoolError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Other database error: {0}")]
    Other(String),
}

#[cfg(feature = "sqlite")]
impl From<deadpool_sqlite::InteractError> for SqlAppenderError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        SqlAppenderError::Other(format!("SQLite interact error: {err}"))
    }
}
