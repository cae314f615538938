use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Coin entity - a currency known to the registry
///
/// Unique on (symbol, name). A coin may serve as the main or the quote side
/// of any number of trading pairs.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::coins)]
pub struct Coin {
    /// Registry-assigned ID
    pub id: i32,

    /// Ticker symbol (e.g., "BTC")
    pub symbol: String,

    /// Full name (e.g., "Bitcoin")
    pub name: String,

    pub is_fiat: bool,

    pub is_stablecoin: bool,

    /// External reference ID (CoinGecko), if known
    pub id_coin_gecko: Option<String>,

    pub category: Option<String>,

    /// Ranking used when this coin acts as a quote asset; lower = preferred
    pub quote_coin_priority: Option<i32>,

    #[schema(value_type = Option<String>, example = "64123.50")]
    pub price_usd: Option<Decimal>,

    #[schema(value_type = Option<String>, example = "1260000000000")]
    pub market_cap_usd: Option<Decimal>,
}

/// New coin for insertion
#[derive(Debug, Clone, Insertable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::coins)]
pub struct NewCoin {
    pub symbol: String,
    pub name: String,
    pub is_fiat: bool,
    pub is_stablecoin: bool,
    pub id_coin_gecko: Option<String>,
    pub category: Option<String>,
    pub quote_coin_priority: Option<i32>,
}

impl NewCoin {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            is_fiat: false,
            is_stablecoin: false,
            id_coin_gecko: None,
            category: None,
            quote_coin_priority: None,
        }
    }

    pub fn with_id_coin_gecko(mut self, id: impl Into<String>) -> Self {
        self.id_coin_gecko = Some(id.into());
        self
    }

    pub fn with_quote_coin_priority(mut self, priority: i32) -> Self {
        self.quote_coin_priority = Some(priority);
        self
    }
}

/// Reference to a coin in a write request: an existing row by ID, or a new
/// row to insert as part of the same operation
#[derive(Debug, Clone)]
pub enum CoinRef {
    Existing(i32),
    New(NewCoin),
}

/// Lookup key used for duplicate detection before coin insertion.
/// Not a persisted entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoinSymbolNamePair {
    pub symbol: String,
    pub name: String,
}

impl CoinSymbolNamePair {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// Whether an existing coin matches this pair
    pub fn matches(&self, coin: &Coin) -> bool {
        coin.symbol == self.symbol && coin.name == self.name
    }
}

/// Per-coin market data refresh values, applied by ID
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoinMarketDataUpdate {
    pub id: i32,

    #[schema(value_type = Option<String>, example = "64123.50")]
    pub price_usd: Option<Decimal>,

    #[schema(value_type = Option<String>, example = "1260000000000")]
    pub market_cap_usd: Option<Decimal>,
}
