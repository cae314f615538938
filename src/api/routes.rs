use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::bridge_handlers::{self, BridgeState};
use super::coin_handlers::{self, CoinsState};
use super::exchange_handlers::{self, ExchangesState};
use super::kline_handlers::{self, KlineState};
use super::openapi::ApiDoc;
use super::responses::HealthResponse;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the API router with Swagger UI
pub fn create_router(
    coins_state: CoinsState,
    kline_state: KlineState,
    exchanges_state: ExchangesState,
    bridge_state: BridgeState,
) -> Router {
    Router::new()
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .route("/health", get(health_check))
        // Coin registry endpoints
        .route("/coins/insert", post(coin_handlers::insert_coin))
        .route(
            "/coins/quoteCoins/insert",
            post(coin_handlers::insert_quote_coins),
        )
        .route("/coins/all", get(coin_handlers::get_all_coins))
        .route(
            "/coins/quoteCoinsPrioritized",
            get(coin_handlers::get_quote_coins_prioritized),
        )
        .route(
            "/coins/unreferenced",
            delete(coin_handlers::delete_unreferenced_coins),
        )
        .route("/coins/marketData", put(coin_handlers::update_market_data))
        .route(
            "/coins/tradingPairs/insert",
            post(coin_handlers::insert_trading_pair),
        )
        .route(
            "/coins/tradingPairs/all",
            get(coin_handlers::get_all_trading_pairs),
        )
        .route("/coins/:id", delete(coin_handlers::delete_coin))
        .with_state(coins_state)
        // Kline store endpoints
        .route("/kline/insert", post(kline_handlers::insert_kline))
        .route("/kline/insertMany", post(kline_handlers::insert_klines))
        .route("/kline/all", get(kline_handlers::get_all_klines))
        .route(
            "/kline/replaceAll",
            put(kline_handlers::replace_all_klines),
        )
        .route(
            "/kline/:idTradePair",
            get(kline_handlers::get_klines_for_trading_pair)
                .delete(kline_handlers::delete_klines_for_trading_pair),
        )
        .with_state(kline_state)
        // Exchange aggregation endpoints
        .route(
            "/exchanges/klineData",
            get(exchange_handlers::get_kline_data),
        )
        .route(
            "/exchanges/allListedCoins",
            get(exchange_handlers::get_all_listed_coins),
        )
        .with_state(exchanges_state)
        // Orchestration endpoints
        .route(
            "/bridge/kline",
            post(bridge_handlers::collect_kline_data).put(bridge_handlers::update_kline_data),
        )
        .with_state(bridge_state)
}
