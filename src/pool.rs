//! Connection pooling for hosts that do not bring their own.
//!
//! The sender itself never touches a pool; it is handed connections.
//! These helpers exist so host frameworks and tests can hold
//! connections the same way, via deadpool.

use crate::error::SqlAppenderError;

#[cfg(feature = "postgres")]
use deadpool_postgres::{Config as PgConfig, Pool as PostgresPool};
#[cfg(feature = "postgres")]
use tokio_postgres::NoTls;
#[cfg(feature = "sqlite")]
use deadpool_sqlite::{
    Config as SqliteConfig, Object as SqliteObject, Pool as SqlitePool, Runtime,
};

/// The database type a pool talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    /// PostgreSQL database
    #[cfg(feature = "postgres")]
    Postgres,
    /// SQLite database
    #[cfg(feature = "sqlite")]
    Sqlite,
}

/// Connection pool for database access.
#[derive(Debug, Clone)]
pub enum AppenderPool {
    /// PostgreSQL connection pool
    #[cfg(feature = "postgres")]
    Postgres(PostgresPool),
    /// SQLite connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

/// A checked-out connection.
#[derive(Debug)]
pub enum AppenderPoolConnection {
    #[cfg(feature = "postgres")]
    Postgres(deadpool_postgres::Object),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteObject),
}

/// Configuration and connection pool for a database.
#[derive(Debug, Clone)]
pub struct ConfigAndPool {
    /// The connection pool
    pub pool: AppenderPool,
    /// The database type
    pub db_type: DatabaseType,
}

impl ConfigAndPool {
    /// Asynchronous initializer for Postgres via deadpool.
    ///
    /// # Errors
    ///
    /// Returns `SqlAppenderError::ConfigError` when a required field is
    /// missing or the pool cannot be created.
    #[cfg(feature = "postgres")]
    pub async fn new_postgres(pg_config: PgConfig) -> Result<Self, SqlAppenderError> {
        for (field, present) in [
            ("dbname", pg_config.dbname.is_some()),
            ("host", pg_config.host.is_some()),
            ("port", pg_config.port.is_some()),
            ("user", pg_config.user.is_some()),
            ("password", pg_config.password.is_some()),
        ] {
            if !present {
                return Err(SqlAppenderError::ConfigError(format!(
                    "{field} is required"
                )));
            }
        }

        let pool = pg_config
            .create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
            .map_err(|e| {
                SqlAppenderError::ConfigError(format!("failed to create Postgres pool: {e}"))
            })?;

        Ok(ConfigAndPool {
            pool: AppenderPool::Postgres(pool),
            db_type: DatabaseType::Postgres,
        })
    }

    /// Asynchronous initializer for SQLite via deadpool_sqlite.
    ///
    /// Switches the database to WAL mode, which suits frequent small
    /// log writes.
    ///
    /// # Errors
    ///
    /// Returns `SqlAppenderError` if the pool cannot be created or the
    /// initial pragma fails.
    #[cfg(feature = "sqlite")]
    pub async fn new_sqlite(db_path: String) -> Result<Self, SqlAppenderError> {
        let cfg = SqliteConfig::new(db_path);
        let pool = cfg.create_pool(Runtime::Tokio1).map_err(|e| {
            SqlAppenderError::ConfigError(format!("failed to create SQLite pool: {e}"))
        })?;

        {
            let conn = pool
                .get()
                .await
                .map_err(SqlAppenderError::PoolErrorSqlite)?;
            conn.interact(|conn| {
                conn.execute_batch("PRAGMA journal_mode = WAL;")
                    .map_err(SqlAppenderError::SqliteError)
            })
            .await??;
        }

        Ok(ConfigAndPool {
            pool: AppenderPool::Sqlite(pool),
            db_type: DatabaseType::Sqlite,
        })
    }
}

impl AppenderPool {
    /// Check a connection out of the pool.
    ///
    /// # Errors
    ///
    /// Returns the pool's error if no connection can be obtained.
    pub async fn get_connection(&self) -> Result<AppenderPoolConnection, SqlAppenderError> {
        match self {
            #[cfg(feature = "postgres")]
            AppenderPool::Postgres(pool) => {
                let conn = pool
                    .get()
                    .await
                    .map_err(SqlAppenderError::PoolErrorPostgres)?;
                Ok(AppenderPoolConnection::Postgres(conn))
            }
            #[cfg(feature = "sqlite")]
            AppenderPool::Sqlite(pool) => {
                let conn = pool
                    .get()
                    .await
                    .map_err(SqlAppenderError::PoolErrorSqlite)?;
                Ok(AppenderPoolConnection::Sqlite(conn))
            }
        }
    }
}
