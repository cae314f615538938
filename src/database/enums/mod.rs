pub mod exchange;
pub mod kline_interval;

pub use exchange::Exchange;
pub use kline_interval::KlineInterval;
