pub mod bridge_handlers;
pub mod coin_handlers;
pub mod exchange_handlers;
pub mod kline_handlers;
pub mod openapi;
pub mod responses;
pub mod routes;

pub use bridge_handlers::BridgeState;
pub use coin_handlers::CoinsState;
pub use exchange_handlers::ExchangesState;
pub use kline_handlers::KlineState;
pub use routes::create_router;
