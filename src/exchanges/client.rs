use crate::database::enums::{Exchange, KlineInterval};
use crate::database::models::{Coin, KlineData};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kline request in registry terms: which pair, which interval, which window
#[derive(Debug, Clone)]
pub struct KlineDataRequest {
    pub coin_main: Coin,
    pub coin_quote: Coin,
    pub interval: KlineInterval,

    /// Window start (Unix milliseconds, inclusive)
    pub start_time: i64,

    /// Window end (Unix milliseconds, inclusive)
    pub end_time: i64,

    /// Maximum number of candles to request
    pub limit: u16,
}

impl KlineDataRequest {
    /// Collapse the coin pair into the concatenated uppercase symbol the
    /// exchange APIs expect (e.g., "BTCUSDT")
    pub fn formatted(&self) -> KlineDataRequestFormatted {
        KlineDataRequestFormatted {
            symbol: format!(
                "{}{}",
                self.coin_main.symbol.to_uppercase(),
                self.coin_quote.symbol.to_uppercase()
            ),
            interval: self.interval,
            start_time: self.start_time,
            end_time: self.end_time,
            limit: self.limit,
        }
    }
}

/// Kline request in exchange terms: the pair reduced to one symbol string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineDataRequestFormatted {
    pub symbol: String,
    pub interval: KlineInterval,
    pub start_time: i64,
    pub end_time: i64,
    pub limit: u16,
}

/// One candle as fetched from an exchange, not yet tied to a trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Kline {
    pub open_time: i64,

    #[schema(value_type = String)]
    pub open_price: Decimal,

    #[schema(value_type = String)]
    pub high_price: Decimal,

    #[schema(value_type = String)]
    pub low_price: Decimal,

    #[schema(value_type = String)]
    pub close_price: Decimal,

    #[schema(value_type = String)]
    pub volume: Decimal,

    pub close_time: i64,
}

impl Kline {
    /// Attach the candle to a trading pair for persistence
    pub fn into_kline_data(self, id_trade_pair: i32) -> KlineData {
        KlineData {
            id_trade_pair,
            open_time: self.open_time,
            open_price: self.open_price,
            high_price: self.high_price,
            low_price: self.low_price,
            close_price: self.close_price,
            volume: self.volume,
            close_time: self.close_time,
        }
    }
}

/// Listed coins accumulated across exchanges, one slot per exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListedCoins {
    pub binance_coins: Vec<String>,
    pub bybit_coins: Vec<String>,
    pub mexc_coins: Vec<String>,
}

impl ListedCoins {
    /// Fill the slot for one exchange
    pub fn set_for(&mut self, exchange: Exchange, coins: Vec<String>) {
        match exchange {
            Exchange::Binance => self.binance_coins = coins,
            Exchange::Bybit => self.bybit_coins = coins,
            Exchange::Mexc => self.mexc_coins = coins,
        }
    }

    /// Read the slot for one exchange
    pub fn get_for(&self, exchange: Exchange) -> &[String] {
        match exchange {
            Exchange::Binance => &self.binance_coins,
            Exchange::Bybit => &self.bybit_coins,
            Exchange::Mexc => &self.mexc_coins,
        }
    }
}

/// A single exchange's market data API
///
/// Implementations are fail-soft: any transport error, non-success status or
/// unparseable payload is logged and surfaced as an empty result, never as an
/// error. Cross-exchange fallback lives in the collector, not here.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Which exchange this client talks to
    fn exchange(&self) -> Exchange;

    /// Fetch candles for the given symbol and window. Empty on any failure
    /// or when the exchange does not list the symbol.
    async fn get_kline_data(&self, request: &KlineDataRequestFormatted) -> Vec<Kline>;

    /// Fetch the base coins listed for spot trading and record them in the
    /// accumulator slot for this exchange
    async fn get_all_listed_coins(&self, listed_coins: &mut ListedCoins);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

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

    #[test]
    fn test_formatted_concatenates_uppercase_symbols() {
        let request = KlineDataRequest {
            coin_main: coin(1, "btc", "Bitcoin"),
            coin_quote: coin(2, "usdt", "Tether"),
            interval: KlineInterval::OneDay,
            start_time: 0,
            end_time: 1,
            limit: 1000,
        };

        assert_eq!(request.formatted().symbol, "BTCUSDT");
    }

    #[test]
    fn test_into_kline_data_carries_all_fields() {
        let kline = Kline {
            open_time: 100,
            open_price: dec!(1),
            high_price: dec!(2),
            low_price: dec!(0.5),
            close_price: dec!(1.5),
            volume: dec!(10),
            close_time: 200,
        };

        let data = kline.into_kline_data(7);
        assert_eq!(data.id_trade_pair, 7);
        assert_eq!(data.open_time, 100);
        assert_eq!(data.close_time, 200);
        assert_eq!(data.high_price, dec!(2));
    }

    #[test]
    fn test_listed_coins_slots_are_independent() {
        let mut listed = ListedCoins::default();
        listed.set_for(Exchange::Binance, vec!["BTC".to_string()]);
        listed.set_for(Exchange::Bybit, vec!["ETH".to_string()]);

        assert_eq!(listed.get_for(Exchange::Binance), ["BTC".to_string()]);
        assert_eq!(listed.get_for(Exchange::Bybit), ["ETH".to_string()]);
        assert!(listed.get_for(Exchange::Mexc).is_empty());
    }
}
