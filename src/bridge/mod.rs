pub mod kline_data_collector;

pub use kline_data_collector::KlineDataCollector;
