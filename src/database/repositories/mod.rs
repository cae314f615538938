pub mod coins_repository;
pub mod kline_repository;
pub mod trading_pairs_repository;

pub use coins_repository::{CoinsRepository, CoinsRepositoryImpl};
pub use kline_repository::{KlineRepository, KlineRepositoryImpl};
pub use trading_pairs_repository::{TradingPairsRepository, TradingPairsRepositoryImpl};
