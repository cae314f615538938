use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::KlineData;
use crate::database::schema::kline_data;
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Kline store repository trait
///
/// Rows are keyed by (id_trade_pair, open_time); re-inserting an existing
/// candle surfaces as a unique violation.
pub trait KlineRepository: Send + Sync {
    /// Insert a single candle
    fn insert_kline(&self, kline: KlineData) -> Result<(), DatabaseError>;

    /// Insert a batch of candles atomically
    fn insert_klines(&self, klines: Vec<KlineData>) -> Result<usize, DatabaseError>;

    /// Get all candles grouped by trading pair, ordered by open time within
    /// each group
    fn get_all_klines(&self) -> Result<HashMap<i32, Vec<KlineData>>, DatabaseError>;

    /// Get candles for one trading pair ordered by open time
    fn get_klines_for_trading_pair(
        &self,
        id_trade_pair: i32,
    ) -> Result<Vec<KlineData>, DatabaseError>;

    /// Delete all candles for one trading pair, returning the number removed
    fn delete_klines_for_trading_pair(&self, id_trade_pair: i32) -> Result<usize, DatabaseError>;

    /// Atomically replace the entire store with the given candles
    fn replace_all_klines(&self, klines: Vec<KlineData>) -> Result<usize, DatabaseError>;
}

/// Concrete implementation of KlineRepository over a PostgreSQL pool
pub struct KlineRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl KlineRepositoryImpl {
    /// Create new kline repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

// Postgres caps bind parameters at 65535; 8 columns per row
const INSERT_CHUNK_SIZE: usize = 4096;

impl KlineRepository for KlineRepositoryImpl {
    fn insert_kline(&self, kline: KlineData) -> Result<(), DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(kline_data::table)
            .values(&kline)
            .execute(&mut conn)?;
        Ok(())
    }

    fn insert_klines(&self, klines: Vec<KlineData>) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            let mut inserted = 0;
            for chunk in klines.chunks(INSERT_CHUNK_SIZE) {
                inserted += diesel::insert_into(kline_data::table)
                    .values(chunk)
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }

    fn get_all_klines(&self) -> Result<HashMap<i32, Vec<KlineData>>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let rows = kline_data::table
            .order((kline_data::id_trade_pair.asc(), kline_data::open_time.asc()))
            .load::<KlineData>(&mut conn)?;

        let mut grouped: HashMap<i32, Vec<KlineData>> = HashMap::new();
        for row in rows {
            grouped.entry(row.id_trade_pair).or_default().push(row);
        }
        Ok(grouped)
    }

    fn get_klines_for_trading_pair(
        &self,
        id_trade_pair: i32,
    ) -> Result<Vec<KlineData>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        kline_data::table
            .filter(kline_data::id_trade_pair.eq(id_trade_pair))
            .order(kline_data::open_time.asc())
            .load::<KlineData>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn delete_klines_for_trading_pair(&self, id_trade_pair: i32) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::delete(kline_data::table.filter(kline_data::id_trade_pair.eq(id_trade_pair)))
            .execute(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn replace_all_klines(&self, klines: Vec<KlineData>) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            diesel::delete(kline_data::table).execute(conn)?;

            let mut inserted = 0;
            for chunk in klines.chunks(INSERT_CHUNK_SIZE) {
                inserted += diesel::insert_into(kline_data::table)
                    .values(chunk)
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }
}
