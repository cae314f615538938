pub mod coin;
pub mod kline;
pub mod trading_pair;

pub use coin::{Coin, CoinMarketDataUpdate, CoinRef, CoinSymbolNamePair, NewCoin};
pub use kline::KlineData;
pub use trading_pair::{
    NewTradingPair, TradingPair, TradingPairExchange, TradingPairSpec, TradingPairWithExchanges,
};
