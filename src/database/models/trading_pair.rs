use crate::database::enums::Exchange;
use crate::database::models::coin::CoinRef;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Trading pair entity - an ordered (main, quote) coin combination
///
/// Both coins must exist in the registry when the pair is created. Deleting
/// either coin deletes the pair.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::trading_pairs)]
pub struct TradingPair {
    pub id: i32,
    pub id_coin_main: i32,
    pub id_coin_quote: i32,
}

/// New trading pair for insertion
#[derive(Debug, Clone, Insertable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::trading_pairs)]
pub struct NewTradingPair {
    pub id_coin_main: i32,
    pub id_coin_quote: i32,
}

/// Exchange association row for a trading pair
#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::trading_pair_exchanges)]
pub struct TradingPairExchange {
    pub id_trading_pair: i32,
    pub exchange: Exchange,
}

/// One trading pair to create alongside a main coin: the quote side plus
/// the exchange associations. The quote may be an existing coin or one
/// created in the same write.
#[derive(Debug, Clone)]
pub struct TradingPairSpec {
    pub coin_quote: CoinRef,
    pub exchanges: Vec<Exchange>,
}

/// Trading pair with its exchange association set, as returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TradingPairWithExchanges {
    pub id: i32,
    pub id_coin_main: i32,
    pub id_coin_quote: i32,
    pub exchanges: Vec<Exchange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trading_pair_ordering_is_significant() {
        let btc_usdt = TradingPair {
            id: 1,
            id_coin_main: 1,
            id_coin_quote: 2,
        };
        let usdt_btc = TradingPair {
            id: 1,
            id_coin_main: 2,
            id_coin_quote: 1,
        };
        assert_ne!(btc_usdt, usdt_btc);
    }
}
