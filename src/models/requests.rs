use crate::database::enums::Exchange;
use crate::database::models::{CoinSymbolNamePair, NewCoin};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Coin creation request: the coin itself plus the trading pairs it should
/// be the main side of
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoinCreationRequest {
    /// ID of an existing coin to attach the trading pairs to; must exist
    /// when given. Absent means a new coin is created from the fields below.
    pub id: Option<i32>,

    pub symbol: String,

    pub name: String,

    #[serde(default)]
    pub is_fiat: bool,

    #[serde(default)]
    pub is_stablecoin: bool,

    pub id_coin_gecko: Option<String>,

    pub category: Option<String>,

    pub quote_coin_priority: Option<i32>,

    #[serde(default)]
    pub trading_pairs: Vec<TradingPairRequest>,
}

impl CoinCreationRequest {
    pub fn symbol_name_pair(&self) -> CoinSymbolNamePair {
        CoinSymbolNamePair::new(self.symbol.clone(), self.name.clone())
    }

    pub fn to_new_coin(&self) -> NewCoin {
        NewCoin {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            is_fiat: self.is_fiat,
            is_stablecoin: self.is_stablecoin,
            id_coin_gecko: self.id_coin_gecko.clone(),
            category: self.category.clone(),
            quote_coin_priority: self.quote_coin_priority,
        }
    }

    /// Every exchange name mentioned across this request's trading pairs
    pub fn exchange_names(&self) -> impl Iterator<Item = &str> {
        self.trading_pairs
            .iter()
            .flat_map(|pair| pair.exchanges.iter().map(String::as_str))
    }
}

/// Trading pair element of a coin creation request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradingPairRequest {
    pub coin_quote: QuoteCoinRequest,

    /// Exchange names; validated against the known exchange set
    pub exchanges: Vec<String>,
}

impl TradingPairRequest {
    /// Parse the exchange names, assuming validation already passed
    pub fn parsed_exchanges(&self) -> Vec<Exchange> {
        self.exchanges
            .iter()
            .filter_map(|name| Exchange::from_str(name))
            .collect()
    }
}

/// Quote side of a requested trading pair. Referenced by ID when the coin
/// already exists, by (symbol, name) when it should be created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCoinRequest {
    pub id: Option<i32>,
    pub symbol: String,
    pub name: String,
}

impl QuoteCoinRequest {
    pub fn symbol_name_pair(&self) -> CoinSymbolNamePair {
        CoinSymbolNamePair::new(self.symbol.clone(), self.name.clone())
    }
}

/// Standalone quote coin creation request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCoinCreationRequest {
    pub symbol: String,
    pub name: String,
    pub quote_coin_priority: Option<i32>,
}

impl QuoteCoinCreationRequest {
    pub fn symbol_name_pair(&self) -> CoinSymbolNamePair {
        CoinSymbolNamePair::new(self.symbol.clone(), self.name.clone())
    }

    pub fn to_new_coin(&self) -> NewCoin {
        let mut coin = NewCoin::new(self.symbol.clone(), self.name.clone());
        coin.quote_coin_priority = self.quote_coin_priority;
        coin
    }
}

/// Market data refresh request for one coin, applied by ID
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoinMarketDataUpdateRequest {
    pub id: i32,

    #[schema(value_type = Option<String>, example = "64123.50")]
    pub price_usd: Option<Decimal>,

    #[schema(value_type = Option<String>, example = "1260000000000")]
    pub market_cap_usd: Option<Decimal>,
}

/// Direct trading pair creation request between two existing coins
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradingPairCreationRequest {
    pub id_coin_main: i32,
    pub id_coin_quote: i32,

    /// Exchange names; validated against the known exchange set
    pub exchanges: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_creation_request_deserializes_camel_case() {
        let json = r#"{
            "symbol": "BTC",
            "name": "Bitcoin",
            "idCoinGecko": "bitcoin",
            "tradingPairs": [
                {
                    "coinQuote": {"id": 2, "symbol": "USDT", "name": "Tether"},
                    "exchanges": ["Binance", "Bybit"]
                }
            ]
        }"#;

        let request: CoinCreationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.symbol, "BTC");
        assert_eq!(request.id_coin_gecko.as_deref(), Some("bitcoin"));
        assert_eq!(request.trading_pairs.len(), 1);
        assert_eq!(
            request.exchange_names().collect::<Vec<_>>(),
            ["Binance", "Bybit"]
        );
    }

    #[test]
    fn test_parsed_exchanges_skips_nothing_when_valid() {
        let pair = TradingPairRequest {
            coin_quote: QuoteCoinRequest {
                id: None,
                symbol: "USDT".to_string(),
                name: "Tether".to_string(),
            },
            exchanges: vec!["binance".to_string(), "MEXC".to_string()],
        };

        assert_eq!(
            pair.parsed_exchanges(),
            [Exchange::Binance, Exchange::Mexc]
        );
    }
}
