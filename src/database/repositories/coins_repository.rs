use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{
    Coin, CoinMarketDataUpdate, CoinRef, CoinSymbolNamePair, NewCoin, NewTradingPair, TradingPair,
    TradingPairExchange, TradingPairSpec,
};
use crate::database::schema::{coins, trading_pair_exchanges, trading_pairs};
use diesel::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Coins registry repository trait
///
/// Owns coin rows and the lookups the validator needs (duplicate detection,
/// missing-id detection).
pub trait CoinsRepository: Send + Sync {
    /// Get all coins ordered by symbol
    fn get_all_coins(&self) -> Result<Vec<Coin>, DatabaseError>;

    /// Get coins matching the given IDs
    fn get_coins_by_ids(&self, ids: &[i32]) -> Result<Vec<Coin>, DatabaseError>;

    /// Get existing coins matching any of the given (symbol, name) pairs
    fn get_coins_by_symbol_name_pairs(
        &self,
        pairs: &[CoinSymbolNamePair],
    ) -> Result<Vec<Coin>, DatabaseError>;

    /// From the given IDs, return the subset that does not exist
    fn get_missing_coin_ids(&self, ids: &HashSet<i32>) -> Result<HashSet<i32>, DatabaseError>;

    /// Check whether a coin with the given ID exists
    fn coin_exists(&self, id: i32) -> Result<bool, DatabaseError>;

    /// Insert new coins, returning them with assigned IDs
    fn insert_coins(&self, new_coins: Vec<NewCoin>) -> Result<Vec<Coin>, DatabaseError>;

    /// Create a coin together with its trading pairs in one transaction.
    /// The main side may reference an existing coin by ID instead of
    /// inserting a new row; quote sides likewise, with inline quotes reusing
    /// an existing (symbol, name) match. A failure on any step rolls back
    /// every row written for the request. Returns the main coin ID.
    fn insert_coin_with_pairs(
        &self,
        coin_main: CoinRef,
        pairs: Vec<TradingPairSpec>,
    ) -> Result<i32, DatabaseError>;

    /// Apply market data values per coin ID; returns the number of rows updated
    fn update_market_data(
        &self,
        updates: Vec<CoinMarketDataUpdate>,
    ) -> Result<usize, DatabaseError>;

    /// Get coins usable as quote assets, ascending by priority value
    fn get_quote_coins_prioritized(&self) -> Result<Vec<Coin>, DatabaseError>;

    /// Delete a coin and the trading pairs referencing it.
    /// Returns false when no such coin exists.
    fn delete_coin(&self, id: i32) -> Result<bool, DatabaseError>;

    /// Sweep: delete every coin that no trading pair references as main or
    /// quote. Returns the number of coins removed.
    fn delete_coins_not_referenced_by_trading_pairs(&self) -> Result<usize, DatabaseError>;
}

/// Concrete implementation of CoinsRepository over a PostgreSQL pool
pub struct CoinsRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl CoinsRepositoryImpl {
    /// Create new coins repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl CoinsRepository for CoinsRepositoryImpl {
    fn get_all_coins(&self) -> Result<Vec<Coin>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        coins::table
            .order(coins::symbol.asc())
            .load::<Coin>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn get_coins_by_ids(&self, ids: &[i32]) -> Result<Vec<Coin>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        coins::table
            .filter(coins::id.eq_any(ids))
            .load::<Coin>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn get_coins_by_symbol_name_pairs(
        &self,
        pairs: &[CoinSymbolNamePair],
    ) -> Result<Vec<Coin>, DatabaseError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = (self.get_conn)()?;

        // One query on the symbol column, then exact pair matching in memory
        let symbols: Vec<&str> = pairs.iter().map(|p| p.symbol.as_str()).collect();
        let candidates = coins::table
            .filter(coins::symbol.eq_any(symbols))
            .load::<Coin>(&mut conn)?;

        Ok(candidates
            .into_iter()
            .filter(|coin| pairs.iter().any(|pair| pair.matches(coin)))
            .collect())
    }

    fn get_missing_coin_ids(&self, ids: &HashSet<i32>) -> Result<HashSet<i32>, DatabaseError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = (self.get_conn)()?;

        let existing: Vec<i32> = coins::table
            .filter(coins::id.eq_any(ids))
            .select(coins::id)
            .load::<i32>(&mut conn)?;

        let mut missing = ids.clone();
        for id in existing {
            missing.remove(&id);
        }
        Ok(missing)
    }

    fn coin_exists(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let count: i64 = coins::table
            .filter(coins::id.eq(id))
            .count()
            .get_result(&mut conn)?;
        Ok(count > 0)
    }

    fn insert_coins(&self, new_coins: Vec<NewCoin>) -> Result<Vec<Coin>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(coins::table)
            .values(&new_coins)
            .get_results::<Coin>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn insert_coin_with_pairs(
        &self,
        coin_main: CoinRef,
        pairs: Vec<TradingPairSpec>,
    ) -> Result<i32, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            let id_coin_main = resolve_coin_ref(conn, coin_main)?;

            for spec in pairs {
                let id_coin_quote = resolve_coin_ref(conn, spec.coin_quote)?;

                let pair: TradingPair = diesel::insert_into(trading_pairs::table)
                    .values(NewTradingPair {
                        id_coin_main,
                        id_coin_quote,
                    })
                    .get_result(conn)?;

                let exchange_rows: Vec<TradingPairExchange> = spec
                    .exchanges
                    .into_iter()
                    .map(|exchange| TradingPairExchange {
                        id_trading_pair: pair.id,
                        exchange,
                    })
                    .collect();
                diesel::insert_into(trading_pair_exchanges::table)
                    .values(&exchange_rows)
                    .execute(conn)?;
            }

            Ok(id_coin_main)
        })
    }

    fn update_market_data(
        &self,
        updates: Vec<CoinMarketDataUpdate>,
    ) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;
        let mut count = 0;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            for update in updates {
                count += diesel::update(coins::table.filter(coins::id.eq(update.id)))
                    .set((
                        coins::price_usd.eq(update.price_usd),
                        coins::market_cap_usd.eq(update.market_cap_usd),
                    ))
                    .execute(conn)?;
            }
            Ok(count)
        })
    }

    fn get_quote_coins_prioritized(&self) -> Result<Vec<Coin>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        coins::table
            .filter(coins::quote_coin_priority.is_not_null())
            .order(coins::quote_coin_priority.asc())
            .load::<Coin>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn delete_coin(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            // Pairs referencing the coin go first, then their exchange rows
            let pair_ids: Vec<i32> = trading_pairs::table
                .filter(
                    trading_pairs::id_coin_main
                        .eq(id)
                        .or(trading_pairs::id_coin_quote.eq(id)),
                )
                .select(trading_pairs::id)
                .load::<i32>(conn)?;

            diesel::delete(
                trading_pair_exchanges::table
                    .filter(trading_pair_exchanges::id_trading_pair.eq_any(&pair_ids)),
            )
            .execute(conn)?;

            diesel::delete(trading_pairs::table.filter(trading_pairs::id.eq_any(&pair_ids)))
                .execute(conn)?;

            let deleted = diesel::delete(coins::table.filter(coins::id.eq(id))).execute(conn)?;
            Ok(deleted > 0)
        })
    }

    fn delete_coins_not_referenced_by_trading_pairs(&self) -> Result<usize, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            let main_ids: Vec<i32> = trading_pairs::table
                .select(trading_pairs::id_coin_main)
                .load::<i32>(conn)?;
            let quote_ids: Vec<i32> = trading_pairs::table
                .select(trading_pairs::id_coin_quote)
                .load::<i32>(conn)?;

            let referenced: HashSet<i32> = main_ids.into_iter().chain(quote_ids).collect();
            let referenced: Vec<i32> = referenced.into_iter().collect();

            let deleted =
                diesel::delete(coins::table.filter(coins::id.ne_all(&referenced))).execute(conn)?;
            Ok(deleted)
        })
    }
}

/// Turn a coin reference into a row ID inside the surrounding transaction.
/// A new coin matching an existing (symbol, name) reuses that row, so two
/// pairs naming the same inline quote share one coin.
fn resolve_coin_ref(conn: &mut PgConnection, coin: CoinRef) -> Result<i32, DatabaseError> {
    match coin {
        CoinRef::Existing(id) => Ok(id),
        CoinRef::New(new_coin) => {
            let existing = coins::table
                .filter(coins::symbol.eq(&new_coin.symbol))
                .filter(coins::name.eq(&new_coin.name))
                .select(coins::id)
                .first::<i32>(conn)
                .optional()?;
            match existing {
                Some(id) => Ok(id),
                None => {
                    let inserted: Coin = diesel::insert_into(coins::table)
                        .values(&new_coin)
                        .get_result(conn)?;
                    Ok(inserted.id)
                }
            }
        }
    }
}
