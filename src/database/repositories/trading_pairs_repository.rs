use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::enums::Exchange;
use crate::database::models::{NewTradingPair, TradingPair, TradingPairExchange, TradingPairWithExchanges};
use crate::database::schema::{trading_pair_exchanges, trading_pairs};
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Trading pairs repository trait
pub trait TradingPairsRepository: Send + Sync {
    /// Get all trading pairs with their exchange associations
    fn get_all_trading_pairs(&self) -> Result<Vec<TradingPairWithExchanges>, DatabaseError>;

    /// Look up a pair by (main, quote) coin IDs. Order is significant.
    fn find_trading_pair(
        &self,
        id_coin_main: i32,
        id_coin_quote: i32,
    ) -> Result<Option<TradingPair>, DatabaseError>;

    /// Insert a trading pair with its exchange associations, returning the
    /// assigned pair ID
    fn insert_trading_pair(
        &self,
        new_pair: NewTradingPair,
        exchanges: &[Exchange],
    ) -> Result<i32, DatabaseError>;
}

/// Concrete implementation of TradingPairsRepository over a PostgreSQL pool
pub struct TradingPairsRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl TradingPairsRepositoryImpl {
    /// Create new trading pairs repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl TradingPairsRepository for TradingPairsRepositoryImpl {
    fn get_all_trading_pairs(&self) -> Result<Vec<TradingPairWithExchanges>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let pairs = trading_pairs::table
            .order(trading_pairs::id.asc())
            .load::<TradingPair>(&mut conn)?;

        let exchange_rows = trading_pair_exchanges::table
            .load::<TradingPairExchange>(&mut conn)?;

        let mut by_pair: HashMap<i32, Vec<Exchange>> = HashMap::new();
        for row in exchange_rows {
            by_pair.entry(row.id_trading_pair).or_default().push(row.exchange);
        }

        Ok(pairs
            .into_iter()
            .map(|pair| TradingPairWithExchanges {
                id: pair.id,
                id_coin_main: pair.id_coin_main,
                id_coin_quote: pair.id_coin_quote,
                exchanges: by_pair.remove(&pair.id).unwrap_or_default(),
            })
            .collect())
    }

    fn find_trading_pair(
        &self,
        id_coin_main: i32,
        id_coin_quote: i32,
    ) -> Result<Option<TradingPair>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        trading_pairs::table
            .filter(trading_pairs::id_coin_main.eq(id_coin_main))
            .filter(trading_pairs::id_coin_quote.eq(id_coin_quote))
            .first::<TradingPair>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn insert_trading_pair(
        &self,
        new_pair: NewTradingPair,
        exchanges: &[Exchange],
    ) -> Result<i32, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            let pair: TradingPair = diesel::insert_into(trading_pairs::table)
                .values(&new_pair)
                .get_result(conn)?;

            let exchange_rows: Vec<TradingPairExchange> = exchanges
                .iter()
                .map(|&exchange| TradingPairExchange {
                    id_trading_pair: pair.id,
                    exchange,
                })
                .collect();

            diesel::insert_into(trading_pair_exchanges::table)
                .values(&exchange_rows)
                .execute(conn)?;

            Ok(pair.id)
        })
    }
}
