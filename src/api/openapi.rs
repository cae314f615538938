use utoipa::OpenApi;

use crate::api::responses::{
    CountResponse, ErrorResponse, HealthResponse, TradingPairCreatedResponse,
};
use crate::api::{bridge_handlers, coin_handlers, exchange_handlers, kline_handlers, routes};
use crate::database::enums::{Exchange, KlineInterval};
use crate::database::models::{Coin, KlineData, TradingPair, TradingPairWithExchanges};
use crate::exchanges::{Kline, ListedCoins};
use crate::models::{
    CoinCreationRequest, CoinMarketDataUpdateRequest, QuoteCoinCreationRequest, QuoteCoinRequest,
    TradingPairCreationRequest, TradingPairRequest,
};

/// OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Crypto Market API",
        version = "1.0.0",
        description = "Coin registry, kline store and multi-exchange market data aggregation"
    ),
    paths(
        routes::health_check,
        coin_handlers::insert_coin,
        coin_handlers::insert_quote_coins,
        coin_handlers::get_all_coins,
        coin_handlers::get_quote_coins_prioritized,
        coin_handlers::delete_coin,
        coin_handlers::delete_unreferenced_coins,
        coin_handlers::update_market_data,
        coin_handlers::insert_trading_pair,
        coin_handlers::get_all_trading_pairs,
        kline_handlers::insert_kline,
        kline_handlers::insert_klines,
        kline_handlers::get_all_klines,
        kline_handlers::get_klines_for_trading_pair,
        kline_handlers::delete_klines_for_trading_pair,
        kline_handlers::replace_all_klines,
        exchange_handlers::get_kline_data,
        exchange_handlers::get_all_listed_coins,
        bridge_handlers::collect_kline_data,
        bridge_handlers::update_kline_data,
    ),
    components(
        schemas(
            Coin,
            TradingPair,
            TradingPairWithExchanges,
            KlineData,
            Exchange,
            KlineInterval,
            Kline,
            ListedCoins,
            CoinCreationRequest,
            TradingPairRequest,
            QuoteCoinRequest,
            QuoteCoinCreationRequest,
            CoinMarketDataUpdateRequest,
            TradingPairCreationRequest,
            CountResponse,
            TradingPairCreatedResponse,
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "coins", description = "Coin registry and trading pair endpoints"),
        (name = "kline", description = "Kline store endpoints"),
        (name = "exchanges", description = "Multi-exchange aggregation endpoints"),
        (name = "bridge", description = "Cross-service orchestration endpoints"),
    )
)]
pub struct ApiDoc;
