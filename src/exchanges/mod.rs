pub mod binance;
pub mod bybit;
pub mod client;
pub mod collector;
pub mod mexc;

pub use binance::BinanceClient;
pub use bybit::BybitClient;
pub use client::{
    ExchangeClient, Kline, KlineDataRequest, KlineDataRequestFormatted, ListedCoins,
};
pub use collector::ExchangesDataCollector;
pub use mexc::MexcClient;
