use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use diesel::result::DatabaseErrorKind;
use std::sync::Arc;
use thiserror::Error;

/// Type alias for PostgreSQL connection pool
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Type alias for pooled connection
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Database pools container holding the coins registry and kline store pools
///
/// The two stores live in separate databases; each service concern gets its
/// own pool.
#[derive(Clone)]
pub struct DatabasePools {
    /// Connection pool for the coins registry (coins, trading pairs)
    pub coins_pool: Arc<PgPool>,

    /// Connection pool for the kline store (candlestick rows)
    pub kline_pool: Arc<PgPool>,
}

impl DatabasePools {
    /// Create new database pools from existing pool instances
    pub fn new(coins_pool: PgPool, kline_pool: PgPool) -> Self {
        Self {
            coins_pool: Arc::new(coins_pool),
            kline_pool: Arc::new(kline_pool),
        }
    }

    /// Get a connection from the coins registry pool
    pub fn get_coins_conn(&self) -> Result<PgPooledConnection, DatabaseError> {
        self.coins_pool
            .get()
            .map_err(|e| DatabaseError::ConnectionPoolError(e.to_string()))
    }

    /// Get a connection from the kline store pool
    pub fn get_kline_conn(&self) -> Result<PgPooledConnection, DatabaseError> {
        self.kline_pool
            .get()
            .map_err(|e| DatabaseError::ConnectionPoolError(e.to_string()))
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Insert violates a uniqueness constraint (duplicate key)
    #[error("Conflict: {0}")]
    UniqueViolation(String),

    /// Insert references a row that does not exist
    #[error("Invalid reference: {0}")]
    ForeignKeyViolation(String),

    #[error("Record not found")]
    NotFound,

    #[error("Diesel error: {0}")]
    DieselError(diesel::result::Error),
}

impl From<diesel::result::Error> for DatabaseError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => DatabaseError::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DatabaseError::UniqueViolation(info.message().to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DatabaseError::ForeignKeyViolation(info.message().to_string())
            }
            other => DatabaseError::DieselError(other),
        }
    }
}

/// Establish connection pools for both databases
///
/// # Arguments
/// * `coins_url` - PostgreSQL connection URL for the coins registry database
/// * `kline_url` - PostgreSQL connection URL for the kline store database
/// * `pool_size` - Maximum number of connections per pool
pub fn establish_connection_pools(
    coins_url: &str,
    kline_url: &str,
    pool_size: u32,
) -> Result<DatabasePools, DatabaseError> {
    tracing::info!("Establishing database connection pools...");

    let coins_manager = ConnectionManager::<PgConnection>::new(coins_url);
    let coins_pool = r2d2::Pool::builder()
        .max_size(pool_size)
        .build(coins_manager)
        .map_err(|e| DatabaseError::ConnectionPoolError(format!("Coins pool: {}", e)))?;

    // Test the registry connection
    let _ = coins_pool
        .get()
        .map_err(|e| DatabaseError::ConnectionFailed(format!("Coins database: {}", e)))?;

    tracing::info!("Coins registry pool created with max size: {}", pool_size);

    let kline_manager = ConnectionManager::<PgConnection>::new(kline_url);
    let kline_pool = r2d2::Pool::builder()
        .max_size(pool_size)
        .build(kline_manager)
        .map_err(|e| DatabaseError::ConnectionPoolError(format!("Kline pool: {}", e)))?;

    // Test the kline store connection
    let _ = kline_pool
        .get()
        .map_err(|e| DatabaseError::ConnectionFailed(format!("Kline database: {}", e)))?;

    tracing::info!("Kline store pool created with max size: {}", pool_size);

    Ok(DatabasePools::new(coins_pool, kline_pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err: DatabaseError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, DatabaseError::NotFound));
    }

    #[test]
    fn test_database_pools_creation() {
        // Requires live databases - skip when not configured
        let (Ok(coins_url), Ok(kline_url)) = (
            std::env::var("COINS_DATABASE_URL"),
            std::env::var("KLINE_DATABASE_URL"),
        ) else {
            return;
        };

        let result = establish_connection_pools(&coins_url, &kline_url, 5);
        assert!(result.is_ok(), "Failed to create database pools");
    }
}
