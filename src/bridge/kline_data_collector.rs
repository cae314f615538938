use crate::database::connection::DatabaseError;
use crate::database::enums::KlineInterval;
use crate::database::models::{Coin, KlineData, NewTradingPair};
use crate::database::repositories::{CoinsRepository, KlineRepository, TradingPairsRepository};
use crate::exchanges::{ExchangesDataCollector, KlineDataRequest};
use std::sync::Arc;

/// Interval used for the full-store sweeps
const COLLECTION_INTERVAL: KlineInterval = KlineInterval::OneDay;

/// Candles requested per pair
const COLLECTION_LIMIT: u16 = 1000;

/// Collection window reaching back from now
const COLLECTION_WINDOW_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Cross-service kline orchestrator
///
/// Walks every (main, quote) combination the registry can form, fetches
/// candles through the exchange aggregator and lands them in the kline
/// store. Pairs without data anywhere are skipped rather than failing the
/// sweep.
pub struct KlineDataCollector {
    coins_repository: Arc<dyn CoinsRepository>,
    trading_pairs_repository: Arc<dyn TradingPairsRepository>,
    kline_repository: Arc<dyn KlineRepository>,
    exchanges: Arc<ExchangesDataCollector>,
}

impl KlineDataCollector {
    pub fn new(
        coins_repository: Arc<dyn CoinsRepository>,
        trading_pairs_repository: Arc<dyn TradingPairsRepository>,
        kline_repository: Arc<dyn KlineRepository>,
        exchanges: Arc<ExchangesDataCollector>,
    ) -> Self {
        Self {
            coins_repository,
            trading_pairs_repository,
            kline_repository,
            exchanges,
        }
    }

    /// Collect candles for every pair and append them to the store.
    /// Returns the number of candles inserted.
    pub async fn collect_entire_kline_data(&self) -> Result<usize, DatabaseError> {
        let collected = self.gather().await?;
        if collected.is_empty() {
            return Ok(0);
        }
        self.kline_repository.insert_klines(collected)
    }

    /// Collect candles for every pair and atomically replace the store with
    /// them. Returns the number of candles the store now holds.
    pub async fn update_entire_kline_data(&self) -> Result<usize, DatabaseError> {
        let collected = self.gather().await?;
        self.kline_repository.replace_all_klines(collected)
    }

    async fn gather(&self) -> Result<Vec<KlineData>, DatabaseError> {
        let coins = self.coins_repository.get_all_coins()?;
        let quote_coins = self.coins_repository.get_quote_coins_prioritized()?;

        let end_time = chrono::Utc::now().timestamp_millis();
        let start_time = end_time - COLLECTION_WINDOW_MS;

        let mut collected = Vec::new();
        for coin_main in &coins {
            for coin_quote in &quote_coins {
                if coin_main.id == coin_quote.id {
                    continue;
                }

                let request = KlineDataRequest {
                    coin_main: coin_main.clone(),
                    coin_quote: coin_quote.clone(),
                    interval: COLLECTION_INTERVAL,
                    start_time,
                    end_time,
                    limit: COLLECTION_LIMIT,
                };

                let klines = self.exchanges.get_kline_data(&request.formatted()).await;
                if klines.is_empty() {
                    continue;
                }

                let id_trade_pair = self.find_or_create_pair(coin_main, coin_quote)?;
                collected.extend(
                    klines
                        .into_iter()
                        .map(|kline| kline.into_kline_data(id_trade_pair)),
                );
            }
        }

        if collected.is_empty() {
            tracing::warn!("No kline data could be fetched for any trading pair");
        } else {
            tracing::info!("Collected {} klines across all pairs", collected.len());
        }
        Ok(collected)
    }

    /// Pairs are created lazily, the first time an exchange has data for the
    /// combination
    fn find_or_create_pair(
        &self,
        coin_main: &Coin,
        coin_quote: &Coin,
    ) -> Result<i32, DatabaseError> {
        if let Some(pair) = self
            .trading_pairs_repository
            .find_trading_pair(coin_main.id, coin_quote.id)?
        {
            return Ok(pair.id);
        }

        self.trading_pairs_repository.insert_trading_pair(
            NewTradingPair {
                id_coin_main: coin_main.id,
                id_coin_quote: coin_quote.id,
            },
            &[],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::enums::Exchange;
    use crate::database::models::{
        CoinMarketDataUpdate, CoinRef, CoinSymbolNamePair, NewCoin, TradingPair, TradingPairSpec,
        TradingPairWithExchanges,
    };
    use crate::exchanges::client::{ExchangeClient, Kline, KlineDataRequestFormatted, ListedCoins};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    struct StubCoinsRepository {
        coins: Vec<Coin>,
        quotes: Vec<Coin>,
    }

    impl CoinsRepository for StubCoinsRepository {
        fn get_all_coins(&self) -> Result<Vec<Coin>, DatabaseError> {
            Ok(self.coins.clone())
        }

        fn get_coins_by_ids(&self, ids: &[i32]) -> Result<Vec<Coin>, DatabaseError> {
            Ok(self
                .coins
                .iter()
                .filter(|c| ids.contains(&c.id))
                .cloned()
                .collect())
        }

        fn get_coins_by_symbol_name_pairs(
            &self,
            _pairs: &[CoinSymbolNamePair],
        ) -> Result<Vec<Coin>, DatabaseError> {
            Ok(Vec::new())
        }

        fn get_missing_coin_ids(
            &self,
            _ids: &HashSet<i32>,
        ) -> Result<HashSet<i32>, DatabaseError> {
            Ok(HashSet::new())
        }

        fn coin_exists(&self, id: i32) -> Result<bool, DatabaseError> {
            Ok(self.coins.iter().any(|c| c.id == id))
        }

        fn insert_coins(&self, _new_coins: Vec<NewCoin>) -> Result<Vec<Coin>, DatabaseError> {
            unimplemented!()
        }

        fn insert_coin_with_pairs(
            &self,
            _coin_main: CoinRef,
            _pairs: Vec<TradingPairSpec>,
        ) -> Result<i32, DatabaseError> {
            unimplemented!()
        }

        fn update_market_data(
            &self,
            _updates: Vec<CoinMarketDataUpdate>,
        ) -> Result<usize, DatabaseError> {
            unimplemented!()
        }

        fn get_quote_coins_prioritized(&self) -> Result<Vec<Coin>, DatabaseError> {
            Ok(self.quotes.clone())
        }

        fn delete_coin(&self, _id: i32) -> Result<bool, DatabaseError> {
            unimplemented!()
        }

        fn delete_coins_not_referenced_by_trading_pairs(&self) -> Result<usize, DatabaseError> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct StubTradingPairsRepository {
        pairs: Mutex<Vec<TradingPair>>,
    }

    impl TradingPairsRepository for StubTradingPairsRepository {
        fn get_all_trading_pairs(
            &self,
        ) -> Result<Vec<TradingPairWithExchanges>, DatabaseError> {
            Ok(Vec::new())
        }

        fn find_trading_pair(
            &self,
            id_coin_main: i32,
            id_coin_quote: i32,
        ) -> Result<Option<TradingPair>, DatabaseError> {
            Ok(self
                .pairs
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id_coin_main == id_coin_main && p.id_coin_quote == id_coin_quote)
                .cloned())
        }

        fn insert_trading_pair(
            &self,
            new_pair: NewTradingPair,
            _exchanges: &[Exchange],
        ) -> Result<i32, DatabaseError> {
            let mut pairs = self.pairs.lock().unwrap();
            let id = pairs.len() as i32 + 1;
            pairs.push(TradingPair {
                id,
                id_coin_main: new_pair.id_coin_main,
                id_coin_quote: new_pair.id_coin_quote,
            });
            Ok(id)
        }
    }

    #[derive(Default)]
    struct StubKlineRepository {
        store: Mutex<Vec<KlineData>>,
    }

    impl KlineRepository for StubKlineRepository {
        fn insert_kline(&self, kline: KlineData) -> Result<(), DatabaseError> {
            self.store.lock().unwrap().push(kline);
            Ok(())
        }

        fn insert_klines(&self, klines: Vec<KlineData>) -> Result<usize, DatabaseError> {
            let count = klines.len();
            self.store.lock().unwrap().extend(klines);
            Ok(count)
        }

        fn get_all_klines(&self) -> Result<HashMap<i32, Vec<KlineData>>, DatabaseError> {
            let mut grouped: HashMap<i32, Vec<KlineData>> = HashMap::new();
            for row in self.store.lock().unwrap().iter().cloned() {
                grouped.entry(row.id_trade_pair).or_default().push(row);
            }
            Ok(grouped)
        }

        fn get_klines_for_trading_pair(
            &self,
            id_trade_pair: i32,
        ) -> Result<Vec<KlineData>, DatabaseError> {
            Ok(self
                .store
                .lock()
                .unwrap()
                .iter()
                .filter(|k| k.id_trade_pair == id_trade_pair)
                .cloned()
                .collect())
        }

        fn delete_klines_for_trading_pair(
            &self,
            id_trade_pair: i32,
        ) -> Result<usize, DatabaseError> {
            let mut store = self.store.lock().unwrap();
            let before = store.len();
            store.retain(|k| k.id_trade_pair != id_trade_pair);
            Ok(before - store.len())
        }

        fn replace_all_klines(&self, klines: Vec<KlineData>) -> Result<usize, DatabaseError> {
            let mut store = self.store.lock().unwrap();
            let count = klines.len();
            *store = klines;
            Ok(count)
        }
    }

    /// Serves candles only for the symbols it was given
    struct StubExchangeClient {
        symbols: Vec<String>,
    }

    #[async_trait]
    impl ExchangeClient for StubExchangeClient {
        fn exchange(&self) -> Exchange {
            Exchange::Binance
        }

        async fn get_kline_data(&self, request: &KlineDataRequestFormatted) -> Vec<Kline> {
            if !self.symbols.contains(&request.symbol) {
                return Vec::new();
            }
            vec![Kline {
                open_time: request.start_time,
                open_price: dec!(1),
                high_price: dec!(2),
                low_price: dec!(0.5),
                close_price: dec!(1.5),
                volume: dec!(100),
                close_time: request.start_time + request.interval.duration_ms() - 1,
            }]
        }

        async fn get_all_listed_coins(&self, _listed_coins: &mut ListedCoins) {}
    }

    fn coin(id: i32, symbol: &str, name: &str) -> Coin {
        Coin {
            id,
            symbol: symbol.to_string(),
            name: name.to_string(),
            is_fiat: false,
            is_stablecoin: false,
            id_coin_gecko: None,
            category: None,
            quote_coin_priority: None,
            price_usd: None,
            market_cap_usd: None,
        }
    }

    fn collector_with(
        coins: Vec<Coin>,
        quotes: Vec<Coin>,
        served_symbols: Vec<&str>,
    ) -> (
        KlineDataCollector,
        Arc<StubTradingPairsRepository>,
        Arc<StubKlineRepository>,
    ) {
        let pairs_repo = Arc::new(StubTradingPairsRepository::default());
        let kline_repo = Arc::new(StubKlineRepository::default());
        let exchange: Arc<dyn ExchangeClient> = Arc::new(StubExchangeClient {
            symbols: served_symbols.iter().map(|s| s.to_string()).collect(),
        });
        let collector = KlineDataCollector::new(
            Arc::new(StubCoinsRepository { coins, quotes }),
            pairs_repo.clone(),
            kline_repo.clone(),
            Arc::new(ExchangesDataCollector::new(vec![exchange])),
        );
        (collector, pairs_repo, kline_repo)
    }

    #[tokio::test]
    async fn test_collect_creates_pairs_and_inserts_klines() {
        let usdt = coin(2, "USDT", "Tether");
        let (collector, pairs_repo, kline_repo) = collector_with(
            vec![coin(1, "BTC", "Bitcoin"), usdt.clone()],
            vec![usdt],
            vec!["BTCUSDT"],
        );

        let inserted = collector.collect_entire_kline_data().await.unwrap();

        assert_eq!(inserted, 1);
        // Only BTC/USDT got a pair; USDT/USDT was skipped as self-pairing
        assert_eq!(pairs_repo.pairs.lock().unwrap().len(), 1);
        let stored = kline_repo.store.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id_trade_pair, 1);
    }

    #[tokio::test]
    async fn test_collect_skips_pairs_without_data() {
        let usdt = coin(2, "USDT", "Tether");
        let (collector, pairs_repo, _) = collector_with(
            vec![coin(1, "BTC", "Bitcoin"), coin(3, "ETH", "Ethereum"), usdt.clone()],
            vec![usdt],
            vec!["BTCUSDT"],
        );

        let inserted = collector.collect_entire_kline_data().await.unwrap();

        assert_eq!(inserted, 1);
        // No pair row for ETH/USDT since no exchange had data
        assert_eq!(pairs_repo.pairs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_collect_with_no_data_anywhere_inserts_nothing() {
        let usdt = coin(2, "USDT", "Tether");
        let (collector, _, kline_repo) = collector_with(
            vec![coin(1, "BTC", "Bitcoin"), usdt.clone()],
            vec![usdt],
            Vec::new(),
        );

        let inserted = collector.collect_entire_kline_data().await.unwrap();

        assert_eq!(inserted, 0);
        assert!(kline_repo.store.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_existing_store() {
        let usdt = coin(2, "USDT", "Tether");
        let (collector, _, kline_repo) = collector_with(
            vec![coin(1, "BTC", "Bitcoin"), usdt.clone()],
            vec![usdt],
            vec!["BTCUSDT"],
        );

        // Pre-existing stale candle for an unrelated pair
        kline_repo
            .insert_kline(KlineData {
                id_trade_pair: 99,
                open_time: 1,
                open_price: dec!(1),
                high_price: dec!(1),
                low_price: dec!(1),
                close_price: dec!(1),
                volume: dec!(1),
                close_time: 2,
            })
            .unwrap();

        let count = collector.update_entire_kline_data().await.unwrap();

        assert_eq!(count, 1);
        let stored = kline_repo.store.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_ne!(stored[0].id_trade_pair, 99);
    }

    #[tokio::test]
    async fn test_existing_pair_is_reused() {
        let usdt = coin(2, "USDT", "Tether");
        let (collector, pairs_repo, _) = collector_with(
            vec![coin(1, "BTC", "Bitcoin"), usdt.clone()],
            vec![usdt],
            vec!["BTCUSDT"],
        );

        collector.collect_entire_kline_data().await.unwrap();
        collector.collect_entire_kline_data().await.unwrap();

        assert_eq!(pairs_repo.pairs.lock().unwrap().len(), 1);
    }
}
