use crate::exchanges::client::{ExchangeClient, Kline, KlineDataRequestFormatted, ListedCoins};
use std::sync::Arc;

/// Multi-exchange aggregator with ordered fallback
///
/// Clients are consulted in construction order. For klines the first
/// exchange that yields any candles wins and later clients are not called;
/// for coin listings every exchange is consulted and fills its own slot.
pub struct ExchangesDataCollector {
    clients: Vec<Arc<dyn ExchangeClient>>,
}

impl ExchangesDataCollector {
    pub fn new(clients: Vec<Arc<dyn ExchangeClient>>) -> Self {
        Self { clients }
    }

    /// Fetch candles for a pair, falling back across exchanges in priority
    /// order. Empty when no exchange has data for the pair.
    pub async fn get_kline_data(&self, request: &KlineDataRequestFormatted) -> Vec<Kline> {
        for client in &self.clients {
            let klines = client.get_kline_data(request).await;
            if !klines.is_empty() {
                tracing::debug!(
                    "{} served {} klines for {}",
                    client.exchange(),
                    klines.len(),
                    request.symbol
                );
                return klines;
            }
        }

        tracing::debug!("No exchange had kline data for {}", request.symbol);
        Vec::new()
    }

    /// Collect the listed base coins from every exchange. An exchange that
    /// fails simply leaves its slot empty.
    pub async fn get_all_listed_coins(&self) -> ListedCoins {
        let mut listed_coins = ListedCoins::default();
        for client in &self.clients {
            client.get_all_listed_coins(&mut listed_coins).await;
        }
        listed_coins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::enums::{Exchange, KlineInterval};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClient {
        exchange: Exchange,
        klines: Vec<Kline>,
        coins: Vec<String>,
        kline_calls: AtomicUsize,
    }

    impl StubClient {
        fn new(exchange: Exchange, klines: Vec<Kline>, coins: Vec<String>) -> Arc<Self> {
            Arc::new(Self {
                exchange,
                klines,
                coins,
                kline_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ExchangeClient for StubClient {
        fn exchange(&self) -> Exchange {
            self.exchange
        }

        async fn get_kline_data(&self, _request: &KlineDataRequestFormatted) -> Vec<Kline> {
            self.kline_calls.fetch_add(1, Ordering::SeqCst);
            self.klines.clone()
        }

        async fn get_all_listed_coins(&self, listed_coins: &mut ListedCoins) {
            listed_coins.set_for(self.exchange, self.coins.clone());
        }
    }

    fn request() -> KlineDataRequestFormatted {
        KlineDataRequestFormatted {
            symbol: "BTCUSDT".to_string(),
            interval: KlineInterval::OneDay,
            start_time: 0,
            end_time: 86_400_000,
            limit: 1000,
        }
    }

    fn sample_kline() -> Kline {
        Kline {
            open_time: 0,
            open_price: dec!(1),
            high_price: dec!(2),
            low_price: dec!(0.5),
            close_price: dec!(1.5),
            volume: dec!(10),
            close_time: 86_399_999,
        }
    }

    #[tokio::test]
    async fn test_first_exchange_with_data_wins() {
        let binance = StubClient::new(Exchange::Binance, vec![sample_kline()], Vec::new());
        let bybit = StubClient::new(Exchange::Bybit, vec![sample_kline()], Vec::new());
        let collector = ExchangesDataCollector::new(vec![
            binance.clone() as Arc<dyn ExchangeClient>,
            bybit.clone(),
        ]);

        let klines = collector.get_kline_data(&request()).await;

        assert_eq!(klines.len(), 1);
        assert_eq!(binance.kline_calls.load(Ordering::SeqCst), 1);
        // Short-circuit: later clients are never consulted
        assert_eq!(bybit.kline_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_skips_empty_exchanges() {
        let binance = StubClient::new(Exchange::Binance, Vec::new(), Vec::new());
        let bybit = StubClient::new(Exchange::Bybit, Vec::new(), Vec::new());
        let mexc = StubClient::new(Exchange::Mexc, vec![sample_kline()], Vec::new());
        let collector = ExchangesDataCollector::new(vec![
            binance.clone() as Arc<dyn ExchangeClient>,
            bybit.clone(),
            mexc.clone(),
        ]);

        let klines = collector.get_kline_data(&request()).await;

        assert_eq!(klines.len(), 1);
        assert_eq!(binance.kline_calls.load(Ordering::SeqCst), 1);
        assert_eq!(bybit.kline_calls.load(Ordering::SeqCst), 1);
        assert_eq!(mexc.kline_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_exchange_has_data_yields_empty() {
        let binance = StubClient::new(Exchange::Binance, Vec::new(), Vec::new());
        let collector = ExchangesDataCollector::new(vec![binance as Arc<dyn ExchangeClient>]);

        assert!(collector.get_kline_data(&request()).await.is_empty());
    }

    #[tokio::test]
    async fn test_listed_coins_fan_out_fills_every_slot() {
        let binance = StubClient::new(
            Exchange::Binance,
            Vec::new(),
            vec!["BTC".to_string(), "ETH".to_string()],
        );
        let bybit = StubClient::new(Exchange::Bybit, Vec::new(), vec!["SOL".to_string()]);
        let collector =
            ExchangesDataCollector::new(vec![binance as Arc<dyn ExchangeClient>, bybit]);

        let listed = collector.get_all_listed_coins().await;

        assert_eq!(listed.binance_coins, ["BTC", "ETH"]);
        assert_eq!(listed.bybit_coins, ["SOL"]);
        assert!(listed.mexc_coins.is_empty());
    }
}
