pub mod api;
pub mod bridge;
pub mod config;
pub mod database;
pub mod exchanges;
pub mod jobs;
pub mod models;
pub mod validators;

pub use api::create_router;
pub use bridge::KlineDataCollector;
pub use config::Config;
pub use database::{establish_connection_pools, DatabaseError, DatabasePools};
pub use exchanges::ExchangesDataCollector;
pub use validators::CoinsValidator;
